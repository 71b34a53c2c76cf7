//! Processing configuration handed to `prepare`.

use crate::error::{Result, SqueezeError};

/// Sample rate, block size and channel count for one prepared session.
///
/// Built through [`ProcessSpec::new`], which rejects values no stage can
/// work with. The spec is `Copy` and never mutated; a configuration change
/// means a new spec and another `prepare`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    sample_rate: f64,
    max_block_size: usize,
    num_channels: usize,
}

impl ProcessSpec {
    /// Validate and build a spec
    ///
    /// # Errors
    /// `InvalidProcessSpec` when the sample rate is not a positive finite
    /// number, or the block size or channel count is zero.
    pub fn new(sample_rate: f64, max_block_size: usize, num_channels: usize) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SqueezeError::InvalidProcessSpec {
                reason: format!("sample rate must be positive, got {}", sample_rate),
            });
        }
        if max_block_size == 0 {
            return Err(SqueezeError::InvalidProcessSpec {
                reason: "block size must be at least 1".to_string(),
            });
        }
        if num_channels == 0 {
            return Err(SqueezeError::InvalidProcessSpec {
                reason: "channel count must be at least 1".to_string(),
            });
        }
        Ok(Self {
            sample_rate,
            max_block_size,
            num_channels,
        })
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Largest block the host will pass to `process`
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Channel count negotiated with the host
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }
}
