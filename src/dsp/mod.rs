//! DSP stages
//!
//! Every stage implements the `Effect` trait and processes an `AudioBuffer`
//! in place. `AudioPipeline` wires the three stages in their fixed order.

mod compressor;
mod effect;
pub mod gain;
mod pipeline;
mod smoothing;

pub use compressor::{gain_computer, time_to_coeff, ChannelLinking, Compressor, CompressorParams};
pub use effect::Effect;
pub use gain::GainStage;
pub use pipeline::AudioPipeline;
pub use smoothing::{Smoother, SmoothingStyle};
