//! Parameter smoothing for avoiding zipper noise when a gain changes.
//!
//! [`Smoother`] ramps a value toward its target one sample at a time. The
//! gain stages feed it linear multipliers so a trim move between blocks
//! becomes a short ramp instead of a step.
//!
//! ```
//! use squeeze::dsp::{Smoother, SmoothingStyle};
//!
//! let mut smoother = Smoother::new(SmoothingStyle::Linear(10.0));
//! smoother.set_sample_rate(48000.0);
//! smoother.reset(1.0);
//! smoother.set_target(0.5);
//! let first = smoother.next();
//! assert!(first < 1.0 && first > 0.5);
//! ```

/// Distance under which the exponential ramp snaps onto its target
const SNAP_THRESHOLD: f32 = 1.0e-6;

/// Smoothing algorithm selection.
///
/// The `f32` parameter is the smoothing time in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmoothingStyle {
    /// No smoothing - value changes instantly.
    None,

    /// Linear interpolation, reaching the target exactly after the given time.
    Linear(f32),

    /// One-pole smoothing; reaches ~63% of the distance in the given time.
    Exponential(f32),
}

impl Default for SmoothingStyle {
    fn default() -> Self {
        Self::None
    }
}

/// A per-sample value smoother.
///
/// Requires `&mut self` to advance, so it lives inside the stage that owns
/// it on the audio thread.
#[derive(Debug, Clone)]
pub struct Smoother {
    style: SmoothingStyle,
    sample_rate: f64,

    current: f32,
    target: f32,

    // Exponential: pole coefficient
    coefficient: f32,
    // Linear: increment per sample and samples left
    step_size: f32,
    steps_remaining: u32,
}

impl Smoother {
    /// Create a new smoother with the given style.
    ///
    /// Until [`set_sample_rate`](Self::set_sample_rate) is called every ramp
    /// completes in a single sample.
    pub fn new(style: SmoothingStyle) -> Self {
        Self {
            style,
            sample_rate: 0.0,
            current: 0.0,
            target: 0.0,
            coefficient: 1.0,
            step_size: 0.0,
            steps_remaining: 0,
        }
    }

    /// Get the smoothing style.
    pub fn style(&self) -> SmoothingStyle {
        self.style
    }

    /// Set the sample rate and recompute coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.coefficient = match self.style {
            SmoothingStyle::Exponential(ms) => {
                let samples = ms as f64 * sample_rate / 1000.0;
                if samples > 0.0 {
                    (1.0 - (-1.0 / samples).exp()) as f32
                } else {
                    1.0
                }
            }
            _ => 1.0,
        };
    }

    /// Set a new target value.
    ///
    /// Non-finite targets are ignored.
    pub fn set_target(&mut self, target: f32) {
        if !target.is_finite() || target == self.target {
            return;
        }
        self.target = target;

        match self.style {
            SmoothingStyle::None => {
                self.current = target;
            }
            SmoothingStyle::Linear(ms) => {
                let samples = (ms as f64 * self.sample_rate / 1000.0) as u32;
                self.steps_remaining = samples.max(1);
                self.step_size = (target - self.current) / self.steps_remaining as f32;
            }
            SmoothingStyle::Exponential(_) => {}
        }
    }

    /// Jump to a value with no ramp.
    pub fn reset(&mut self, value: f32) {
        let value = if value.is_finite() { value } else { self.target };
        self.current = value;
        self.target = value;
        self.steps_remaining = 0;
        self.step_size = 0.0;
    }

    /// Advance one sample and return the smoothed value.
    #[inline]
    pub fn next(&mut self) -> f32 {
        match self.style {
            SmoothingStyle::None => self.current = self.target,
            SmoothingStyle::Linear(_) => {
                if self.steps_remaining > 0 {
                    self.steps_remaining -= 1;
                    self.current = if self.steps_remaining == 0 {
                        self.target
                    } else {
                        self.current + self.step_size
                    };
                }
            }
            SmoothingStyle::Exponential(_) => {
                self.current += self.coefficient * (self.target - self.current);
                if (self.current - self.target).abs() < SNAP_THRESHOLD {
                    self.current = self.target;
                }
            }
        }
        self.current
    }

    /// Value returned by the most recent [`next`](Self::next)
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Value the smoother is heading toward
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True while a ramp is still in progress
    pub fn is_smoothing(&self) -> bool {
        self.current != self.target
    }
}
