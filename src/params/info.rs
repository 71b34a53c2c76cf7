//! Parameter identifiers and metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The six control parameters, in host order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParamId {
    #[serde(rename = "inputGain")]
    InputGain,
    #[serde(rename = "ratio")]
    Ratio,
    #[serde(rename = "threshold")]
    Threshold,
    #[serde(rename = "attack")]
    Attack,
    #[serde(rename = "release")]
    Release,
    #[serde(rename = "outputGain")]
    OutputGain,
}

impl ParamId {
    /// Every parameter, in host order
    pub const ALL: [ParamId; 6] = [
        ParamId::InputGain,
        ParamId::Ratio,
        ParamId::Threshold,
        ParamId::Attack,
        ParamId::Release,
        ParamId::OutputGain,
    ];

    /// Number of parameters
    pub const COUNT: usize = Self::ALL.len();

    /// Position in [`ParamId::ALL`]
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parameter at a host index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stable identifier used by hosts and saved state
    pub fn as_str(self) -> &'static str {
        match self {
            ParamId::InputGain => "inputGain",
            ParamId::Ratio => "ratio",
            ParamId::Threshold => "threshold",
            ParamId::Attack => "attack",
            ParamId::Release => "release",
            ParamId::OutputGain => "outputGain",
        }
    }

    /// Static metadata for this parameter
    pub fn info(self) -> &'static ParameterInfo {
        &PARAMETERS[self.index()]
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an identifier that names no parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownParam(pub String);

impl fmt::Display for UnknownParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown parameter: {}", self.0)
    }
}

impl std::error::Error for UnknownParam {}

impl FromStr for ParamId {
    type Err = UnknownParam;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownParam(s.to_string()))
    }
}

/// Metadata the editor and host need to present one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterInfo {
    pub id: ParamId,
    /// Short label shown under the control
    pub name: &'static str,
    pub unit: &'static str,
    pub min: f32,
    pub max: f32,
    /// Quantization step; `None` means continuous
    pub step: Option<f32>,
    pub default: f32,
}

impl ParameterInfo {
    /// Clamp to range and snap to the step grid
    ///
    /// Returns `None` for NaN so callers can keep the previous value.
    pub fn constrain(&self, value: f32) -> Option<f32> {
        if value.is_nan() {
            return None;
        }
        let clamped = value.clamp(self.min, self.max);
        let snapped = match self.step {
            Some(step) if step > 0.0 => {
                let steps = ((clamped - self.min) / step).round();
                (self.min + steps * step).clamp(self.min, self.max)
            }
            _ => clamped,
        };
        Some(snapped)
    }

    /// Map a plain value to 0..1
    pub fn normalize(&self, value: f32) -> f32 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Map 0..1 to a plain value (not yet quantized)
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min)
    }

    /// Number of discrete steps across the range, 0 when continuous
    pub fn step_count(&self) -> u32 {
        match self.step {
            Some(step) if step > 0.0 => ((self.max - self.min) / step).round() as u32,
            _ => 0,
        }
    }
}

/// Parameter layout, indexed by [`ParamId::index`].
pub static PARAMETERS: [ParameterInfo; ParamId::COUNT] = [
    ParameterInfo {
        id: ParamId::InputGain,
        name: "Input",
        unit: "dB",
        min: -36.0,
        max: 36.0,
        step: Some(0.5),
        default: 0.0,
    },
    ParameterInfo {
        id: ParamId::Ratio,
        name: "Ratio",
        unit: ":1",
        min: 1.0,
        max: 10.0,
        step: Some(1.0),
        default: 1.0,
    },
    ParameterInfo {
        id: ParamId::Threshold,
        name: "Thresh",
        unit: "dB",
        min: -30.0,
        max: 0.0,
        step: Some(0.5),
        default: 0.0,
    },
    ParameterInfo {
        id: ParamId::Attack,
        name: "Attack",
        unit: "ms",
        min: 1.0,
        max: 1000.0,
        step: Some(1.0),
        default: 500.0,
    },
    ParameterInfo {
        id: ParamId::Release,
        name: "Release",
        unit: "ms",
        min: 10.0,
        max: 430.0,
        step: None,
        default: 100.0,
    },
    ParameterInfo {
        id: ParamId::OutputGain,
        name: "Trim",
        unit: "dB",
        min: -36.0,
        max: 36.0,
        step: Some(0.5),
        default: 0.0,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_layout_matches_ids() {
        for (index, id) in ParamId::ALL.iter().enumerate() {
            assert_eq!(id.index(), index);
            assert_eq!(id.info().id, *id);
            assert_eq!(ParamId::from_index(index), Some(*id));
        }
        assert_eq!(ParamId::from_index(6), None);
    }

    #[test]
    fn test_defaults_are_in_range_and_on_grid() {
        for info in PARAMETERS.iter() {
            assert_eq!(info.constrain(info.default), Some(info.default));
        }
    }

    #[test]
    fn test_string_ids_roundtrip() {
        for id in ParamId::ALL {
            assert_eq!(id.as_str().parse::<ParamId>(), Ok(id));
            assert_eq!(id.to_string(), id.as_str());
        }
        assert!("makeup".parse::<ParamId>().is_err());
    }

    #[test]
    fn test_serde_uses_string_ids() {
        let json = serde_json::to_string(&ParamId::OutputGain).unwrap();
        assert_eq!(json, "\"outputGain\"");
    }

    #[test_case(ParamId::InputGain, 50.0, 36.0 ; "input gain clamps high")]
    #[test_case(ParamId::InputGain, 3.3, 3.5 ; "input gain snaps to half dB")]
    #[test_case(ParamId::Ratio, 4.4, 4.0 ; "ratio rounds to integer")]
    #[test_case(ParamId::Ratio, 0.0, 1.0 ; "ratio clamps low")]
    #[test_case(ParamId::Threshold, -40.0, -30.0 ; "threshold clamps low")]
    #[test_case(ParamId::Attack, 12.6, 13.0 ; "attack rounds to integer")]
    #[test_case(ParamId::Release, 123.45, 123.45 ; "release is continuous")]
    #[test_case(ParamId::Release, f32::INFINITY, 430.0 ; "release clamps infinity")]
    #[test_case(ParamId::OutputGain, f32::NEG_INFINITY, -36.0 ; "output clamps neg infinity")]
    fn test_constrain(id: ParamId, input: f32, expected: f32) {
        assert_eq!(id.info().constrain(input), Some(expected));
    }

    #[test]
    fn test_constrain_rejects_nan() {
        assert_eq!(ParamId::Ratio.info().constrain(f32::NAN), None);
    }

    #[test]
    fn test_normalized_mapping() {
        let info = ParamId::Threshold.info();
        assert_eq!(info.normalize(-30.0), 0.0);
        assert_eq!(info.normalize(0.0), 1.0);
        assert_eq!(info.denormalize(0.5), -15.0);
        assert_eq!(ParamId::Ratio.info().step_count(), 9);
        assert_eq!(ParamId::Release.info().step_count(), 0);
    }
}
