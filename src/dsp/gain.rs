//! Gain Stage
//!
//! Trim gain with a dB interface, used before and after the compressor.
//! Gain changes ramp over a short window so automation does not click.

use crate::dsp::effect::Effect;
use crate::dsp::smoothing::{Smoother, SmoothingStyle};
use crate::engine::{db_to_linear, AudioBuffer, ProcessSpec};

// ============================================================================
// Constants
// ============================================================================

/// Default ramp length for gain changes
pub const DEFAULT_RAMP_MS: f32 = 20.0;

// ============================================================================
// Gain Stage
// ============================================================================

/// Smoothed trim gain
///
/// The target is set in decibels and converted with `10^(db/20)`. Every frame
/// advances the smoother once and multiplies all channels by the same value,
/// so the ramp length does not depend on the channel count.
///
/// # Example
/// ```
/// use squeeze::dsp::{Effect, GainStage};
/// use squeeze::engine::{AudioBuffer, ProcessSpec};
///
/// let mut gain = GainStage::new(-6.0);
/// gain.prepare(&ProcessSpec::new(48000.0, 256, 2).unwrap());
///
/// let mut buffer = AudioBuffer::new(256, 2);
/// buffer.fill(1.0);
/// gain.process(&mut buffer);
/// assert!((buffer.get_sample(0, 0).unwrap() - 0.501187).abs() < 1e-4);
/// ```
#[derive(Debug, Clone)]
pub struct GainStage {
    name: &'static str,
    gain_db: f32,
    smoother: Smoother,
}

impl GainStage {
    /// Create a gain stage with the default linear ramp
    pub fn new(gain_db: f32) -> Self {
        Self::with_smoothing(gain_db, SmoothingStyle::Linear(DEFAULT_RAMP_MS))
    }

    /// Create a gain stage with an explicit smoothing style
    pub fn with_smoothing(gain_db: f32, style: SmoothingStyle) -> Self {
        let gain_db = if gain_db.is_finite() { gain_db } else { 0.0 };
        let mut smoother = Smoother::new(style);
        smoother.reset(db_to_linear(gain_db));
        Self {
            name: "Gain",
            gain_db,
            smoother,
        }
    }

    /// Label the stage ("Input", "Trim") for display
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Set the target gain in decibels
    ///
    /// Non-finite values are ignored; the stage keeps its previous target.
    pub fn set_gain_decibels(&mut self, db: f32) {
        if !db.is_finite() {
            return;
        }
        self.gain_db = db;
        self.smoother.set_target(db_to_linear(db));
    }

    /// Target gain in decibels
    pub fn gain_decibels(&self) -> f32 {
        self.gain_db
    }

    /// Target linear multiplier
    pub fn target_linear(&self) -> f32 {
        self.smoother.target()
    }

    /// Multiplier applied to the most recent frame
    pub fn current_linear(&self) -> f32 {
        self.smoother.current()
    }

    /// True while a gain change is still ramping
    pub fn is_smoothing(&self) -> bool {
        self.smoother.is_smoothing()
    }
}

impl Default for GainStage {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Effect for GainStage {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.smoother.set_sample_rate(spec.sample_rate());
        self.reset();
    }

    fn reset(&mut self) {
        self.smoother.reset(db_to_linear(self.gain_db));
    }

    fn process(&mut self, buffer: &mut AudioBuffer) {
        // Settled at unity: nothing to do
        if !self.smoother.is_smoothing() && self.smoother.current() == 1.0 {
            return;
        }

        let channels = buffer.channels_mut();
        let num_samples = channels.first().map(|ch| ch.len()).unwrap_or(0);

        if !self.smoother.is_smoothing() {
            let gain = self.smoother.current();
            for channel in channels.iter_mut() {
                for sample in channel.iter_mut() {
                    *sample *= gain;
                }
            }
            return;
        }

        for frame in 0..num_samples {
            let gain = self.smoother.next();
            for channel in channels.iter_mut() {
                if let Some(sample) = channel.get_mut(frame) {
                    *sample *= gain;
                }
            }
        }
    }

    fn effect_type(&self) -> &'static str {
        "gain"
    }

    fn display_name(&self) -> &str {
        self.name
    }
}

// ============================================================================
// Tests
// ============================================================================
