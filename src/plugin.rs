//! Host-facing processor
//!
//! `CompressorPlugin` is what a host wrapper talks to: layout negotiation,
//! prepare, per-block processing and state persistence. The editor gets the
//! shared parameter store through [`CompressorPlugin::parameters`].

use std::sync::Arc;

use crate::config::ProcessorConfig;
use crate::dsp::AudioPipeline;
use crate::engine::{AudioBuffer, ChannelLayout, ProcessSpec};
use crate::error::{Result, SqueezeError};
use crate::params::ParameterStore;

/// Display name reported to hosts
pub const PLUGIN_NAME: &str = "Squeeze";

/// Dynamic-range compressor plugin
pub struct CompressorPlugin {
    store: Arc<ParameterStore>,
    pipeline: AudioPipeline,
}

impl CompressorPlugin {
    /// Create a plugin with default configuration and parameters
    pub fn new() -> Self {
        Self::with_config(ProcessorConfig::default())
    }

    /// Create a plugin with an explicit configuration
    pub fn with_config(config: ProcessorConfig) -> Self {
        let store = Arc::new(ParameterStore::new());
        let pipeline = AudioPipeline::with_config(Arc::clone(&store), config);
        Self { store, pipeline }
    }

    /// Name shown in the host's plugin list
    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    /// The processor adds no delay
    pub fn latency_samples(&self) -> usize {
        0
    }

    /// Output stops as soon as input stops
    pub fn tail_length_seconds(&self) -> f64 {
        0.0
    }

    /// Mono or stereo, with matching input and output
    pub fn is_layout_supported(&self, input_channels: usize, output_channels: usize) -> bool {
        ChannelLayout::from_count(output_channels).is_some() && input_channels == output_channels
    }

    /// Prepare for playback
    ///
    /// Runs off the audio thread. Calling it again with new settings fully
    /// resets every stage.
    ///
    /// # Errors
    /// `InvalidProcessSpec` for a bad sample rate or block size,
    /// `UnsupportedLayout` for anything other than mono or stereo.
    pub fn prepare(
        &mut self,
        sample_rate: f64,
        max_block_size: usize,
        num_channels: usize,
    ) -> Result<()> {
        if !self.is_layout_supported(num_channels, num_channels) {
            tracing::warn!(num_channels, "rejected channel layout");
            return Err(SqueezeError::UnsupportedLayout {
                input: num_channels,
                output: num_channels,
            });
        }
        let spec = ProcessSpec::new(sample_rate, max_block_size, num_channels)?;

        self.pipeline.prepare(&spec);
        tracing::info!(
            sample_rate,
            max_block_size,
            num_channels,
            linking = ?self.pipeline.config().channel_linking,
            "prepared {}",
            PLUGIN_NAME
        );
        Ok(())
    }

    /// True once `prepare` has succeeded
    pub fn is_prepared(&self) -> bool {
        self.pipeline.is_prepared()
    }

    /// Process one block in place
    ///
    /// Output channels at or beyond `num_input_channels` carry no input and
    /// are cleared. Before the first successful `prepare` the remaining
    /// channels pass through unchanged.
    pub fn process(&mut self, buffer: &mut AudioBuffer, num_input_channels: usize) {
        for channel in num_input_channels..buffer.num_channels() {
            buffer.clear_channel(channel);
        }
        if self.pipeline.is_prepared() {
            self.pipeline.process(buffer);
        }
    }

    /// Clear envelopes and gain ramps, e.g. when the transport stops
    pub fn reset(&mut self) {
        self.pipeline.reset();
    }

    /// Gain reduction applied in the last block, for metering
    pub fn gain_reduction_db(&self) -> f32 {
        self.pipeline.gain_reduction_db()
    }

    /// Shared parameter store for editors and automation
    pub fn parameters(&self) -> Arc<ParameterStore> {
        Arc::clone(&self.store)
    }

    /// Opaque state blob for the host to persist
    pub fn get_state(&self) -> Vec<u8> {
        let blob = self.store.serialize();
        tracing::debug!(bytes = blob.len(), "saved parameter state");
        blob
    }

    /// Restore a blob from [`get_state`](Self::get_state)
    ///
    /// # Errors
    /// Any parse or validation failure; parameters keep their values.
    pub fn set_state(&self, bytes: &[u8]) -> Result<()> {
        self.store.deserialize(bytes).map_err(|err| {
            tracing::warn!(code = err.error_code(), error = %err, "ignored state blob");
            err
        })
    }
}

impl Default for CompressorPlugin {
    fn default() -> Self {
        Self::new()
    }
}
