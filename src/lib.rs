//! Squeeze - Real-time Dynamic Range Compressor
//!
//! A feed-forward downward compressor built as a host-agnostic audio
//! processor. Host wrappers drive [`CompressorPlugin`]; editors and
//! automation talk to the shared [`ParameterStore`].
//!
//! # Architecture
//!
//! Each block flows through three stages, in place:
//! - Input gain: smoothed trim ahead of the detector
//! - Compressor: peak envelope follower and hard-knee gain computer
//! - Output gain: smoothed trim after compression
//!
//! # Example
//! ```
//! use squeeze::{AudioBuffer, CompressorPlugin, ParamId};
//!
//! let mut plugin = CompressorPlugin::new();
//! plugin.prepare(48000.0, 256, 2).unwrap();
//! plugin.parameters().set(ParamId::Ratio, 4.0);
//!
//! let mut buffer = AudioBuffer::new(256, 2);
//! plugin.process(&mut buffer, 2);
//! assert!(buffer.is_finite());
//! ```

pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod params;
pub mod plugin;

pub use config::{ProcessorConfig, RampShape};
pub use dsp::{AudioPipeline, ChannelLinking, Compressor, CompressorParams, GainStage};
pub use engine::{AudioBuffer, ChannelLayout, ProcessSpec};
pub use error::{Result, SqueezeError};
pub use params::{ParamId, ParameterSnapshot, ParameterStore};
pub use plugin::CompressorPlugin;
