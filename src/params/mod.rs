//! Control parameters
//!
//! The six compressor controls, their metadata, the atomic store shared
//! between control and audio threads, and the saved-state blob.

mod info;
mod state;
mod store;

pub use info::{ParamId, ParameterInfo, UnknownParam, PARAMETERS};
pub use state::{SavedState, CURRENT_SCHEMA_VERSION, STATE_FORMAT};
pub use store::{ParameterListener, ParameterSnapshot, ParameterStore, SubscriptionId};
