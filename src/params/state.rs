//! Saved-state blob for host persistence.
//!
//! The blob is a small JSON document:
//!
//! ```json
//! {
//!   "format": "squeeze-state",
//!   "schema_version": 1,
//!   "plugin_version": "0.1.0",
//!   "parameters": { "inputGain": 0.0, "ratio": 4.0, ... }
//! }
//! ```
//!
//! Loading validates the whole document before touching the store, so a
//! rejected blob leaves every value as it was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SqueezeError};
use crate::params::info::ParamId;
use crate::params::store::ParameterStore;

/// Tag identifying a Squeeze state blob
pub const STATE_FORMAT: &str = "squeeze-state";

/// Current schema version for state blobs
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Serialized form of the parameter store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub format: String,
    pub schema_version: u32,
    pub plugin_version: String,
    /// Keyed by parameter identifier; unknown keys are ignored on load
    pub parameters: BTreeMap<String, f32>,
}

impl SavedState {
    /// Capture the store's current values
    pub fn capture(store: &ParameterStore) -> Self {
        let parameters = ParamId::ALL
            .iter()
            .map(|id| (id.as_str().to_string(), store.get(*id)))
            .collect();
        Self {
            format: STATE_FORMAT.to_string(),
            schema_version: CURRENT_SCHEMA_VERSION,
            plugin_version: env!("CARGO_PKG_VERSION").to_string(),
            parameters,
        }
    }

    /// Check the document and extract one value per parameter
    ///
    /// # Errors
    /// - `IncompatibleStateVersion` for blobs written by a newer schema
    /// - `InvalidState` for a wrong format tag, a missing parameter, or a
    ///   non-finite value
    pub fn validated_values(&self) -> Result<[f32; ParamId::COUNT]> {
        if self.format != STATE_FORMAT {
            return Err(SqueezeError::InvalidState {
                reason: format!("unexpected format tag '{}'", self.format),
            });
        }
        if self.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(SqueezeError::IncompatibleStateVersion {
                found: self.schema_version,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }

        let mut values = [0.0_f32; ParamId::COUNT];
        for id in ParamId::ALL {
            let value = *self
                .parameters
                .get(id.as_str())
                .ok_or_else(|| SqueezeError::InvalidState {
                    reason: format!("missing parameter '{}'", id),
                })?;
            if !value.is_finite() {
                return Err(SqueezeError::InvalidState {
                    reason: format!("parameter '{}' is not finite", id),
                });
            }
            values[id.index()] = value;
        }
        Ok(values)
    }
}

impl ParameterStore {
    /// Serialize all six values into an opaque blob
    pub fn serialize(&self) -> Vec<u8> {
        let state = SavedState::capture(self);
        // A map of strings to finite floats always serializes
        serde_json::to_vec(&state).unwrap_or_default()
    }

    /// Restore values from a blob produced by [`serialize`](Self::serialize)
    ///
    /// Values outside a parameter's range are clamped like any other set.
    ///
    /// # Errors
    /// Any parse or validation failure; the store is left unchanged.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<()> {
        let state: SavedState = serde_json::from_slice(bytes)?;
        let values = state.validated_values()?;

        for id in ParamId::ALL {
            self.set(id, values[id.index()]);
        }
        tracing::debug!(
            schema_version = state.schema_version,
            written_by = %state.plugin_version,
            "restored parameter state"
        );
        Ok(())
    }
}
