//! Audio Buffer Management
//!
//! Provides the planar sample buffer handed to every processing stage, the
//! channel layouts the processor accepts, and the decibel helpers shared by
//! the DSP code.

use crate::error::{Result, SqueezeError};

// ============================================================================
// Constants
// ============================================================================

/// Lowest level the detectors report, in dB
pub const LEVEL_FLOOR_DB: f32 = -120.0;

/// Linear amplitude matching [`LEVEL_FLOOR_DB`]
pub const LEVEL_FLOOR: f32 = 1.0e-6;

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to linear amplitude
///
/// # Arguments
/// * `db` - Value in decibels
///
/// # Returns
/// Linear amplitude (0 dB maps to exactly 1.0)
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels, floored at [`LEVEL_FLOOR_DB`]
///
/// Zero, negative and NaN inputs all map to the floor so callers never see
/// `-inf` or NaN.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear > LEVEL_FLOOR {
        20.0 * linear.log10()
    } else {
        LEVEL_FLOOR_DB
    }
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single channel (mono)
    Mono,
    /// Two channels (stereo: left, right)
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Planar audio buffer processed in place by every stage
///
/// Each channel is a separate `Vec<f32>`; all channels have the same length.
/// The host allocates the buffer up front, processing never resizes it.
///
/// # Example
/// ```
/// use squeeze::engine::AudioBuffer;
///
/// let buffer = AudioBuffer::new(512, 2);
/// assert_eq!(buffer.num_channels(), 2);
/// assert_eq!(buffer.num_samples(), 512);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Create a silent buffer with `num_channels` channels of `num_samples` each
    pub fn new(num_samples: usize, num_channels: usize) -> Self {
        Self {
            samples: vec![vec![0.0_f32; num_samples]; num_channels],
        }
    }

    /// Create a silent buffer for a channel layout
    pub fn with_layout(num_samples: usize, layout: ChannelLayout) -> Self {
        Self::new(num_samples, layout.num_channels())
    }

    /// Wrap existing planar channel data
    ///
    /// # Errors
    /// Returns `InvalidProcessSpec` if the channels differ in length.
    pub fn from_channels(samples: Vec<Vec<f32>>) -> Result<Self> {
        if let Some(first) = samples.first() {
            let len = first.len();
            if let Some((ch, bad)) = samples.iter().enumerate().find(|(_, c)| c.len() != len) {
                return Err(SqueezeError::InvalidProcessSpec {
                    reason: format!(
                        "Channel {} has {} samples, expected {}",
                        ch,
                        bad.len(),
                        len
                    ),
                });
            }
        }
        Ok(Self { samples })
    }

    /// Create an audio buffer from interleaved sample data
    ///
    /// # Errors
    /// Returns `InvalidProcessSpec` when `num_channels` is zero or does not
    /// divide the data length.
    pub fn from_interleaved(interleaved: &[f32], num_channels: usize) -> Result<Self> {
        if num_channels == 0 || interleaved.len() % num_channels != 0 {
            return Err(SqueezeError::InvalidProcessSpec {
                reason: format!(
                    "Interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
            });
        }

        let num_samples = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(num_samples); num_channels];
        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Ok(Self { samples })
    }

    /// Convert the buffer to interleaved format
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut interleaved = Vec::with_capacity(self.num_channels() * self.num_samples());
        for frame in 0..self.num_samples() {
            interleaved.extend(self.samples.iter().filter_map(|ch| ch.get(frame)));
        }
        interleaved
    }

    /// Number of channels
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Number of samples per channel
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Check if the buffer holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }

    /// Immutable view of one channel, `None` when out of range
    pub fn channel(&self, channel: usize) -> Option<&[f32]> {
        self.samples.get(channel).map(Vec::as_slice)
    }

    /// Mutable view of one channel, `None` when out of range
    pub fn channel_mut(&mut self, channel: usize) -> Option<&mut [f32]> {
        self.samples.get_mut(channel).map(Vec::as_mut_slice)
    }

    /// All channels, for stages that walk the buffer frame by frame
    ///
    /// Crate-private: resizing a channel would break the equal-length
    /// invariant the public constructors enforce.
    #[inline]
    pub(crate) fn channels_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.samples
    }

    /// Get a single sample
    pub fn get_sample(&self, channel: usize, index: usize) -> Option<f32> {
        self.samples.get(channel)?.get(index).copied()
    }

    /// Set a single sample; out-of-range writes are ignored
    pub fn set_sample(&mut self, channel: usize, index: usize, value: f32) {
        if let Some(sample) = self.samples.get_mut(channel).and_then(|ch| ch.get_mut(index)) {
            *sample = value;
        }
    }

    /// Fill every channel with one value
    pub fn fill(&mut self, value: f32) {
        for channel in &mut self.samples {
            channel.fill(value);
        }
    }

    /// Zero one channel; out-of-range channels are ignored
    pub fn clear_channel(&mut self, channel: usize) {
        if let Some(ch) = self.samples.get_mut(channel) {
            ch.fill(0.0);
        }
    }

    /// True when every sample is finite
    pub fn is_finite(&self) -> bool {
        self.samples.iter().flatten().all(|s| s.is_finite())
    }

    /// Peak absolute sample value across all channels
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .flatten()
            .map(|s| s.abs())
            .fold(0.0_f32, f32::max)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_conversions() {
        assert_eq!(db_to_linear(0.0), 1.0);
        assert!((db_to_linear(-6.0) - 0.501187).abs() < 1e-4);
        assert!((linear_to_db(0.5) - (-6.0206)).abs() < 1e-3);
    }

    #[test]
    fn test_linear_to_db_floor() {
        assert_eq!(linear_to_db(0.0), LEVEL_FLOOR_DB);
        assert_eq!(linear_to_db(-1.0), LEVEL_FLOOR_DB);
        assert_eq!(linear_to_db(f32::NAN), LEVEL_FLOOR_DB);
        assert!(linear_to_db(f32::MIN_POSITIVE).is_finite());
    }

    #[test]
    fn test_channel_layout() {
        assert_eq!(ChannelLayout::from_count(1), Some(ChannelLayout::Mono));
        assert_eq!(ChannelLayout::from_count(2), Some(ChannelLayout::Stereo));
        assert_eq!(ChannelLayout::from_count(6), None);
        assert_eq!(ChannelLayout::default().num_channels(), 2);
    }

    #[test]
    fn test_interleave_roundtrip() {
        let data = [0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        let buffer = AudioBuffer::from_interleaved(&data, 2).unwrap();
        assert_eq!(buffer.num_samples(), 3);
        assert_eq!(buffer.channel(1).unwrap(), &[-0.1, -0.2, -0.3]);
        assert_eq!(buffer.to_interleaved(), data.to_vec());
    }

    #[test]
    fn test_from_interleaved_rejects_bad_length() {
        assert!(AudioBuffer::from_interleaved(&[0.0; 5], 2).is_err());
        assert!(AudioBuffer::from_interleaved(&[0.0; 4], 0).is_err());
    }

    #[test]
    fn test_from_channels_rejects_ragged() {
        let result = AudioBuffer::from_channels(vec![vec![0.0; 4], vec![0.0; 3]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_access() {
        let mut buffer = AudioBuffer::new(4, 1);
        buffer.set_sample(3, 0, 1.0);
        buffer.set_sample(0, 10, 1.0);
        assert_eq!(buffer.get_sample(3, 0), None);
        assert_eq!(buffer.peak(), 0.0);
        buffer.clear_channel(5);
    }

    #[test]
    fn test_peak_and_finite() {
        let mut buffer = AudioBuffer::new(4, 2);
        buffer.set_sample(1, 2, -0.75);
        assert_eq!(buffer.peak(), 0.75);
        assert!(buffer.is_finite());
        buffer.set_sample(0, 0, f32::NAN);
        assert!(!buffer.is_finite());
    }

    #[test]
    fn test_to_interleaved_tolerates_short_channel() {
        let mut buffer = AudioBuffer::from_channels(vec![vec![1.0, 2.0, 3.0], vec![-1.0, -2.0, -3.0]])
            .unwrap();
        buffer.channels_mut()[1].truncate(1);
        assert_eq!(buffer.to_interleaved(), vec![1.0, -1.0, 2.0, 3.0]);
    }
}
