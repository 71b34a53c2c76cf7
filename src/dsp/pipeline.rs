//! Audio pipeline
//!
//! Stages always run in this order, in place on the host buffer:
//! 1. Input gain (trim into the detector)
//! 2. Compressor
//! 3. Output gain (trim after compression)
//!
//! Parameters are read from the shared store once per block.

use std::sync::Arc;

use crate::config::ProcessorConfig;
use crate::dsp::compressor::Compressor;
use crate::dsp::effect::Effect;
use crate::dsp::gain::GainStage;
use crate::engine::{AudioBuffer, ProcessSpec};
use crate::params::{ParameterSnapshot, ParameterStore};

/// Input gain → compressor → output gain
pub struct AudioPipeline {
    store: Arc<ParameterStore>,
    config: ProcessorConfig,
    input_gain: GainStage,
    compressor: Compressor,
    output_gain: GainStage,
    spec: Option<ProcessSpec>,
}

impl AudioPipeline {
    /// Create a pipeline with the default configuration
    pub fn new(store: Arc<ParameterStore>) -> Self {
        Self::with_config(store, ProcessorConfig::default())
    }

    /// Create a pipeline with an explicit configuration
    pub fn with_config(store: Arc<ParameterStore>, config: ProcessorConfig) -> Self {
        let config = config.sanitized();
        let ramp = config.gain_smoothing();
        let mut pipeline = Self {
            store,
            config,
            input_gain: GainStage::with_smoothing(0.0, ramp).named("Input"),
            compressor: Compressor::new().with_linking(config.channel_linking),
            output_gain: GainStage::with_smoothing(0.0, ramp).named("Trim"),
            spec: None,
        };
        let snapshot = pipeline.store.snapshot();
        pipeline.apply_snapshot(&snapshot);
        pipeline
    }

    /// Prepare every stage for a new configuration
    ///
    /// Pulls the current parameter values first so the gain stages start at
    /// their targets instead of ramping from stale values. Safe to call
    /// repeatedly; each call fully resets stage state.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        let snapshot = self.store.snapshot();
        self.apply_snapshot(&snapshot);

        self.input_gain.prepare(spec);
        self.compressor.prepare(spec);
        self.output_gain.prepare(spec);
        self.spec = Some(*spec);
    }

    /// Clear envelopes and ramps without changing the configuration
    pub fn reset(&mut self) {
        self.input_gain.reset();
        self.compressor.reset();
        self.output_gain.reset();
    }

    /// Process one block in place
    pub fn process(&mut self, buffer: &mut AudioBuffer) {
        let snapshot = self.store.snapshot();
        self.apply_snapshot(&snapshot);

        self.input_gain.process(buffer);
        self.compressor.process(buffer);
        self.output_gain.process(buffer);
    }

    /// Push one parameter snapshot into the stage setters
    pub fn apply_snapshot(&mut self, snapshot: &ParameterSnapshot) {
        self.input_gain.set_gain_decibels(snapshot.input_gain_db);
        self.compressor.set_ratio(snapshot.ratio);
        self.compressor
            .set_threshold(snapshot.threshold_db + self.config.threshold_offset_db);
        self.compressor.set_attack(snapshot.attack_ms);
        self.compressor.set_release(snapshot.release_ms);
        self.output_gain.set_gain_decibels(snapshot.output_gain_db);
    }

    /// Spec from the last `prepare`, if any
    pub fn spec(&self) -> Option<&ProcessSpec> {
        self.spec.as_ref()
    }

    /// True once `prepare` has run
    pub fn is_prepared(&self) -> bool {
        self.spec.is_some()
    }

    /// Configuration in use
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Shared parameter store
    pub fn parameters(&self) -> &Arc<ParameterStore> {
        &self.store
    }

    /// Largest gain reduction in the last block, in dB
    pub fn gain_reduction_db(&self) -> f32 {
        self.compressor.gain_reduction_db()
    }

    /// Read access to the compressor
    pub fn compressor(&self) -> &Compressor {
        &self.compressor
    }

    /// Stages in processing order
    pub fn stages(&self) -> [&dyn Effect; 3] {
        [&self.input_gain, &self.compressor, &self.output_gain]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RampShape;
    use crate::params::ParamId;
    use approx::assert_relative_eq;

    fn spec() -> ProcessSpec {
        ProcessSpec::new(44100.0, 512, 2).unwrap()
    }

    fn constant_buffer(value: f32, num_samples: usize, channels: usize) -> AudioBuffer {
        let mut buffer = AudioBuffer::new(num_samples, channels);
        buffer.fill(value);
        buffer
    }

    #[test]
    fn test_stage_order() {
        let pipeline = AudioPipeline::new(Arc::new(ParameterStore::new()));
        let names: Vec<&str> = pipeline.stages().iter().map(|s| s.display_name()).collect();
        assert_eq!(names, vec!["Input", "Compressor", "Trim"]);
        let types: Vec<&str> = pipeline.stages().iter().map(|s| s.effect_type()).collect();
        assert_eq!(types, vec!["gain", "compressor", "gain"]);
    }

    #[test]
    fn test_defaults_pass_audio_unchanged() {
        let mut pipeline = AudioPipeline::new(Arc::new(ParameterStore::new()));
        pipeline.prepare(&spec());

        let mut buffer = constant_buffer(0.9, 512, 2);
        pipeline.process(&mut buffer);
        assert_eq!(buffer, constant_buffer(0.9, 512, 2));
    }

    #[test]
    fn test_threshold_offset_applied() {
        let store = Arc::new(ParameterStore::new());
        store.set(ParamId::Threshold, -10.0);
        let pipeline = AudioPipeline::new(Arc::clone(&store));
        assert_eq!(pipeline.compressor().params().threshold_db, -40.0);

        let config = ProcessorConfig {
            threshold_offset_db: 0.0,
            ..ProcessorConfig::default()
        };
        let pipeline = AudioPipeline::with_config(store, config);
        assert_eq!(pipeline.compressor().params().threshold_db, -10.0);
    }

    #[test]
    fn test_input_gain_runs_before_compressor() {
        // Input gain pushes a -40 dBFS signal over a -50 dB engine threshold
        let store = Arc::new(ParameterStore::new());
        store.set(ParamId::Threshold, -20.0);
        store.set(ParamId::Ratio, 10.0);
        store.set(ParamId::Attack, 1.0);

        let level = crate::engine::db_to_linear(-60.0);
        let mut pipeline = AudioPipeline::new(Arc::clone(&store));
        pipeline.prepare(&spec());
        let mut buffer = constant_buffer(level, 512, 2);
        pipeline.process(&mut buffer);
        assert_eq!(pipeline.gain_reduction_db(), 0.0);

        store.set(ParamId::InputGain, 20.0);
        pipeline.prepare(&spec());
        let mut buffer = constant_buffer(level, 4096, 2);
        pipeline.process(&mut buffer);
        assert!(pipeline.gain_reduction_db() > 5.0);
    }

    #[test]
    fn test_output_gain_runs_after_compressor() {
        // Output trim must not change how hard the compressor works
        let store = Arc::new(ParameterStore::new());
        store.set(ParamId::Threshold, -10.0);
        store.set(ParamId::Ratio, 4.0);
        store.set(ParamId::Attack, 1.0);

        let mut pipeline = AudioPipeline::new(Arc::clone(&store));
        pipeline.prepare(&spec());
        let mut reference = constant_buffer(0.5, 4096, 2);
        pipeline.process(&mut reference);
        let reference_gr = pipeline.gain_reduction_db();

        store.set(ParamId::OutputGain, 12.0);
        pipeline.prepare(&spec());
        let mut boosted = constant_buffer(0.5, 4096, 2);
        pipeline.process(&mut boosted);

        assert_relative_eq!(pipeline.gain_reduction_db(), reference_gr);
        assert_relative_eq!(
            boosted.get_sample(0, 4095).unwrap(),
            reference.get_sample(0, 4095).unwrap() * crate::engine::db_to_linear(12.0),
            max_relative = 1e-5
        );
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let store = Arc::new(ParameterStore::new());
        store.set(ParamId::Threshold, -20.0);
        store.set(ParamId::Ratio, 6.0);
        store.set(ParamId::Attack, 3.0);

        let run = |pipeline: &mut AudioPipeline| {
            let mut buffer = constant_buffer(0.7, 1024, 2);
            pipeline.process(&mut buffer);
            buffer
        };

        let mut pipeline = AudioPipeline::new(Arc::clone(&store));
        pipeline.prepare(&spec());
        let first = run(&mut pipeline);

        pipeline.prepare(&spec());
        pipeline.prepare(&spec());
        let second = run(&mut pipeline);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fewer_channels_than_prepared() {
        let store = Arc::new(ParameterStore::new());
        store.set(ParamId::Threshold, -20.0);
        store.set(ParamId::Ratio, 4.0);

        let mut pipeline = AudioPipeline::new(store);
        pipeline.prepare(&spec());

        let mut mono = constant_buffer(0.5, 256, 1);
        pipeline.process(&mut mono);
        assert!(mono.is_finite());

        let mut empty = AudioBuffer::new(0, 0);
        pipeline.process(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_parameter_change_picked_up_next_block() {
        let store = Arc::new(ParameterStore::new());
        let mut pipeline = AudioPipeline::new(Arc::clone(&store));
        pipeline.prepare(&spec());

        store.set(ParamId::OutputGain, -6.0);
        for _ in 0..4 {
            let mut buffer = constant_buffer(1.0, 512, 2);
            pipeline.process(&mut buffer);
        }
        let mut buffer = constant_buffer(1.0, 8, 2);
        pipeline.process(&mut buffer);
        assert_relative_eq!(
            buffer.get_sample(0, 7).unwrap(),
            crate::engine::db_to_linear(-6.0),
            max_relative = 1e-6
        );
    }

    fn trim_response(shape: RampShape) -> Vec<f32> {
        let store = Arc::new(ParameterStore::new());
        let config = ProcessorConfig {
            gain_ramp_shape: shape,
            ..ProcessorConfig::default()
        };
        let mut pipeline = AudioPipeline::with_config(Arc::clone(&store), config);
        pipeline.prepare(&spec());

        store.set(ParamId::OutputGain, -12.0);
        let mut out = Vec::new();
        for _ in 0..32 {
            let mut buffer = constant_buffer(1.0, 512, 2);
            pipeline.process(&mut buffer);
            out.extend_from_slice(buffer.channel(0).unwrap());
        }
        out
    }

    #[test]
    fn test_ramp_shapes_reach_same_target() {
        let target = crate::engine::db_to_linear(-12.0);
        let linear = trim_response(RampShape::Linear);
        let exponential = trim_response(RampShape::Exponential);
        let instant = trim_response(RampShape::Instant);

        assert_eq!(instant[0], target);
        assert!(linear[0] > target && exponential[0] > target);
        // Linear lands exactly after 20 ms; the one-pole curve is only ~63% there
        assert_eq!(linear[881], target);
        assert!(exponential[881] > target);
        assert!(exponential.windows(2).all(|w| w[1] <= w[0]));
        for response in [&linear, &exponential, &instant] {
            assert_relative_eq!(*response.last().unwrap(), target, max_relative = 1e-5);
        }
    }
}
