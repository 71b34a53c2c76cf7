//! Audio Engine Module
//!
//! Core types shared by every processing stage:
//! - Audio buffer and channel layouts
//! - Process spec handed to `prepare`
//! - Decibel conversion helpers

pub mod buffer;
pub mod spec;

pub use buffer::{db_to_linear, linear_to_db, AudioBuffer, ChannelLayout, LEVEL_FLOOR, LEVEL_FLOOR_DB};
pub use spec::ProcessSpec;
