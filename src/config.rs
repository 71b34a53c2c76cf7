//! Processor configuration
//!
//! Static settings fixed when the processor is built. Unlike the six control
//! parameters these never change while audio is running.

use serde::{Deserialize, Serialize};

use crate::dsp::gain::DEFAULT_RAMP_MS;
use crate::dsp::{ChannelLinking, SmoothingStyle};

/// Offset added to the threshold control before it reaches the compressor.
///
/// Maps the [-30, 0] dB control onto a [-60, -30] dB engine threshold.
pub const DEFAULT_THRESHOLD_OFFSET_DB: f32 = -30.0;

/// Curve followed by input and output gain changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RampShape {
    /// Constant slope, lands on the target after `gain_ramp_ms`
    #[default]
    Linear,
    /// One-pole curve with `gain_ramp_ms` as its time constant
    Exponential,
    /// Gain changes apply at the next sample
    Instant,
}

/// Settings shared by the pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Ramp length for input and output gain changes, in milliseconds
    pub gain_ramp_ms: f32,
    /// Shape of the gain ramp
    pub gain_ramp_shape: RampShape,
    /// Added to the threshold control value, in dB
    pub threshold_offset_db: f32,
    /// Detector channel policy
    pub channel_linking: ChannelLinking,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            gain_ramp_ms: DEFAULT_RAMP_MS,
            gain_ramp_shape: RampShape::Linear,
            threshold_offset_db: DEFAULT_THRESHOLD_OFFSET_DB,
            channel_linking: ChannelLinking::Linked,
        }
    }
}

impl ProcessorConfig {
    /// Replace out-of-range fields with their defaults
    pub fn sanitized(mut self) -> Self {
        if !self.gain_ramp_ms.is_finite() || self.gain_ramp_ms < 0.0 {
            self.gain_ramp_ms = DEFAULT_RAMP_MS;
        }
        if !self.threshold_offset_db.is_finite() {
            self.threshold_offset_db = DEFAULT_THRESHOLD_OFFSET_DB;
        }
        self
    }

    /// Smoother setup for the gain stages
    pub fn gain_smoothing(&self) -> SmoothingStyle {
        match self.gain_ramp_shape {
            RampShape::Linear => SmoothingStyle::Linear(self.gain_ramp_ms),
            RampShape::Exponential => SmoothingStyle::Exponential(self.gain_ramp_ms),
            RampShape::Instant => SmoothingStyle::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ProcessorConfig::default();
        assert_eq!(config.gain_ramp_ms, 20.0);
        assert_eq!(config.threshold_offset_db, -30.0);
        assert_eq!(config.channel_linking, ChannelLinking::Linked);
        assert_eq!(config.gain_smoothing(), SmoothingStyle::Linear(20.0));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ProcessorConfig =
            serde_json::from_str(r#"{ "channel_linking": "independent" }"#).unwrap();
        assert_eq!(
            config,
            ProcessorConfig {
                channel_linking: ChannelLinking::Independent,
                ..ProcessorConfig::default()
            }
        );
    }

    #[test]
    fn test_sanitized() {
        let config = ProcessorConfig {
            gain_ramp_ms: -5.0,
            gain_ramp_shape: RampShape::Linear,
            threshold_offset_db: f32::NAN,
            channel_linking: ChannelLinking::Linked,
        }
        .sanitized();
        assert_eq!(config, ProcessorConfig::default());
    }

    #[test]
    fn test_ramp_shape_selects_smoothing() {
        let config: ProcessorConfig =
            serde_json::from_str(r#"{ "gain_ramp_ms": 5.0, "gain_ramp_shape": "exponential" }"#)
                .unwrap();
        assert_eq!(config.gain_smoothing(), SmoothingStyle::Exponential(5.0));

        let config = ProcessorConfig {
            gain_ramp_shape: RampShape::Instant,
            ..ProcessorConfig::default()
        };
        assert_eq!(config.gain_smoothing(), SmoothingStyle::None);
    }
}
