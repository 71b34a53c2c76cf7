//! Effect trait definition
//!
//! Base trait for the processing stages in the pipeline.

use crate::engine::{AudioBuffer, ProcessSpec};

/// Base trait for all DSP stages
///
/// Stages process audio buffers in place. `process` runs on the real-time
/// thread: implementations must not allocate, lock, log or fail there.
pub trait Effect: Send {
    /// Prepare the stage for processing
    ///
    /// Called whenever the sample rate, block size or channel count changes.
    /// Must fully reset internal state; may allocate.
    fn prepare(&mut self, spec: &ProcessSpec);

    /// Reset stage state without changing the configuration
    fn reset(&mut self);

    /// Process audio buffer in place
    fn process(&mut self, buffer: &mut AudioBuffer);

    /// Get the effect type identifier
    fn effect_type(&self) -> &'static str;

    /// Get human-readable display name
    fn display_name(&self) -> &str;
}
