//! Compressor engine
//!
//! A feed-forward downward compressor:
//! - Peak envelope follower with separate attack/release time constants
//! - Hard-knee gain computer working in dB
//! - Stereo-linked (default) or independent per-channel detection

use serde::{Deserialize, Serialize};

use crate::dsp::effect::Effect;
use crate::engine::{db_to_linear, linear_to_db, AudioBuffer, ProcessSpec};

// ============================================================================
// Constants
// ============================================================================

/// Sample rate assumed before the first `prepare`
const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Envelope values below this are flushed to zero
const DENORMAL_FLOOR: f32 = 1.0e-20;

// ============================================================================
// Helper Functions
// ============================================================================

/// One-pole coefficient for a time constant: `exp(-1 / (sample_rate * ms / 1000))`
///
/// A zero or negative time yields 0.0, i.e. the envelope follows the input
/// instantly.
#[inline]
pub fn time_to_coeff(time_ms: f32, sample_rate: f64) -> f32 {
    let samples = sample_rate * time_ms as f64 / 1000.0;
    if samples > 0.0 {
        (-1.0 / samples).exp() as f32
    } else {
        0.0
    }
}

/// Hard-knee gain computer: dB of reduction (>= 0) for a detector level in dB
#[inline]
pub fn gain_computer(params: &CompressorParams, level_db: f32) -> f32 {
    let excess = level_db - params.threshold_db;
    if excess <= 0.0 || params.ratio <= 1.0 {
        0.0
    } else {
        excess * (1.0 - 1.0 / params.ratio)
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// How the detector combines channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelLinking {
    /// One envelope fed by the loudest channel; every channel gets the same
    /// gain so the stereo image holds still
    #[default]
    Linked,
    /// One envelope per channel
    Independent,
}

/// Engine-domain compressor settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressorParams {
    /// Threshold in dBFS, as seen by the gain computer
    pub threshold_db: f32,
    /// Compression ratio, 1.0 = no compression
    pub ratio: f32,
    /// Attack time constant in milliseconds
    pub attack_ms: f32,
    /// Release time constant in milliseconds
    pub release_ms: f32,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            threshold_db: 0.0,
            ratio: 1.0,
            attack_ms: 500.0,
            release_ms: 100.0,
        }
    }
}

// ============================================================================
// Compressor
// ============================================================================

/// Compressor dynamics processor
///
/// For each sample the detector level (`|x|`, or the max across channels
/// when linked) drives the envelope:
///
/// ```text
/// coeff = level > env ? attack_coeff : release_coeff
/// env   = level + coeff * (env - level)
/// ```
///
/// The gain computer then reduces by `(env_db - threshold_db) * (1 - 1/ratio)`
/// dB whenever the envelope is above threshold.
#[derive(Debug, Clone)]
pub struct Compressor {
    params: CompressorParams,
    linking: ChannelLinking,
    sample_rate: f64,
    attack_coeff: f32,
    release_coeff: f32,
    /// Linked: one entry. Independent: one entry per prepared channel.
    envelope: Vec<f32>,
    /// Largest reduction applied in the last processed block, in dB
    gain_reduction_db: f32,
}

impl Compressor {
    /// Create a linked compressor with default parameters
    pub fn new() -> Self {
        Self::with_params(CompressorParams::default())
    }

    /// Create a linked compressor with custom parameters
    pub fn with_params(params: CompressorParams) -> Self {
        let mut comp = Self {
            params: CompressorParams::default(),
            linking: ChannelLinking::Linked,
            sample_rate: DEFAULT_SAMPLE_RATE,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            envelope: vec![0.0],
            gain_reduction_db: 0.0,
        };
        comp.set_params(params);
        comp.update_coefficients();
        comp
    }

    /// Choose the channel linking policy
    ///
    /// Takes effect at the next `prepare`, which sizes the envelope storage.
    pub fn with_linking(mut self, linking: ChannelLinking) -> Self {
        self.linking = linking;
        self
    }

    /// Get the current parameters
    pub fn params(&self) -> &CompressorParams {
        &self.params
    }

    /// Channel linking policy
    pub fn linking(&self) -> ChannelLinking {
        self.linking
    }

    /// Set all parameters at once
    pub fn set_params(&mut self, params: CompressorParams) {
        self.set_threshold(params.threshold_db);
        self.set_ratio(params.ratio);
        self.set_attack(params.attack_ms);
        self.set_release(params.release_ms);
    }

    /// Set threshold in dB
    pub fn set_threshold(&mut self, threshold_db: f32) {
        if threshold_db.is_finite() {
            self.params.threshold_db = threshold_db;
        }
    }

    /// Set compression ratio; values below 1:1 are raised to 1:1
    pub fn set_ratio(&mut self, ratio: f32) {
        if !ratio.is_nan() {
            self.params.ratio = ratio.max(1.0);
        }
    }

    /// Set attack time in milliseconds
    pub fn set_attack(&mut self, attack_ms: f32) {
        if attack_ms.is_finite() && attack_ms != self.params.attack_ms {
            self.params.attack_ms = attack_ms.max(0.0);
            self.attack_coeff = time_to_coeff(self.params.attack_ms, self.sample_rate);
        }
    }

    /// Set release time in milliseconds
    pub fn set_release(&mut self, release_ms: f32) {
        if release_ms.is_finite() && release_ms != self.params.release_ms {
            self.params.release_ms = release_ms.max(0.0);
            self.release_coeff = time_to_coeff(self.params.release_ms, self.sample_rate);
        }
    }

    /// Largest gain reduction applied during the last block, in dB (>= 0)
    pub fn gain_reduction_db(&self) -> f32 {
        self.gain_reduction_db
    }

    /// Current envelope level(s), linear
    pub fn envelope(&self) -> &[f32] {
        &self.envelope
    }

    /// Gain reduction in dB for a detector level in dB (>= 0)
    #[inline]
    pub fn compute_gain_reduction_db(&self, level_db: f32) -> f32 {
        gain_computer(&self.params, level_db)
    }

    fn update_coefficients(&mut self) {
        self.attack_coeff = time_to_coeff(self.params.attack_ms, self.sample_rate);
        self.release_coeff = time_to_coeff(self.params.release_ms, self.sample_rate);
    }

    /// Advance one envelope toward `level` and return the new value
    #[inline]
    fn follow(env: &mut f32, level: f32, attack_coeff: f32, release_coeff: f32) -> f32 {
        let coeff = if level > *env {
            attack_coeff
        } else {
            release_coeff
        };
        let mut next = level + coeff * (*env - level);
        if !next.is_finite() || next < DENORMAL_FLOOR {
            next = 0.0;
        }
        *env = next;
        next
    }

    fn process_linked(&mut self, channels: &mut [Vec<f32>]) {
        let num_samples = channels.first().map(|ch| ch.len()).unwrap_or(0);
        let (attack, release) = (self.attack_coeff, self.release_coeff);
        let mut max_reduction = 0.0_f32;

        for frame in 0..num_samples {
            let level = channels
                .iter()
                .filter_map(|ch| ch.get(frame))
                .map(|s| s.abs())
                .fold(0.0_f32, f32::max);

            let env = Self::follow(&mut self.envelope[0], level, attack, release);
            let reduction = self.compute_gain_reduction_db(linear_to_db(env));
            if reduction <= 0.0 {
                continue;
            }

            max_reduction = max_reduction.max(reduction);
            let gain = db_to_linear(-reduction);
            for channel in channels.iter_mut() {
                if let Some(sample) = channel.get_mut(frame) {
                    *sample *= gain;
                }
            }
        }

        self.gain_reduction_db = max_reduction;
    }

    fn process_independent(&mut self, channels: &mut [Vec<f32>]) {
        let (attack, release) = (self.attack_coeff, self.release_coeff);
        let params = self.params;
        let mut max_reduction = 0.0_f32;

        // Channels beyond the prepared count have no envelope and pass through
        for (channel, env) in channels.iter_mut().zip(self.envelope.iter_mut()) {
            for sample in channel.iter_mut() {
                let level = Self::follow(env, sample.abs(), attack, release);
                let reduction = gain_computer(&params, linear_to_db(level));
                if reduction <= 0.0 {
                    continue;
                }
                max_reduction = max_reduction.max(reduction);
                *sample *= db_to_linear(-reduction);
            }
        }

        self.gain_reduction_db = max_reduction;
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Compressor {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.sample_rate();
        self.update_coefficients();

        let slots = match self.linking {
            ChannelLinking::Linked => 1,
            ChannelLinking::Independent => spec.num_channels(),
        };
        self.envelope.clear();
        self.envelope.resize(slots, 0.0);
        self.gain_reduction_db = 0.0;
    }

    fn reset(&mut self) {
        self.envelope.fill(0.0);
        self.gain_reduction_db = 0.0;
    }

    fn process(&mut self, buffer: &mut AudioBuffer) {
        if self.envelope.is_empty() {
            return;
        }
        match self.linking {
            ChannelLinking::Linked => self.process_linked(buffer.channels_mut()),
            ChannelLinking::Independent => self.process_independent(buffer.channels_mut()),
        }
    }

    fn effect_type(&self) -> &'static str {
        "compressor"
    }

    fn display_name(&self) -> &str {
        "Compressor"
    }
}
