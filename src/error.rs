//! Error handling for Squeeze
//!
//! Only configuration and state persistence can fail. Parameter values are
//! clamped and audio processing is infallible, so neither appears here.

use thiserror::Error;

/// Result type alias for Squeeze operations
pub type Result<T> = std::result::Result<T, SqueezeError>;

/// Main error type for Squeeze operations
#[derive(Error, Debug)]
pub enum SqueezeError {
    // Configuration Errors
    #[error("Invalid process spec: {reason}")]
    InvalidProcessSpec { reason: String },

    #[error("Unsupported channel layout: {input} in, {output} out")]
    UnsupportedLayout { input: usize, output: usize },

    // State Errors
    #[error("Invalid state blob: {reason}")]
    InvalidState { reason: String },

    #[error("Incompatible state version {found} (supported up to {supported})")]
    IncompatibleStateVersion { found: u32, supported: u32 },

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SqueezeError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SqueezeError::InvalidProcessSpec { .. } => "INVALID_PROCESS_SPEC",
            SqueezeError::UnsupportedLayout { .. } => "UNSUPPORTED_LAYOUT",
            SqueezeError::InvalidState { .. } => "INVALID_STATE",
            SqueezeError::IncompatibleStateVersion { .. } => "INCOMPATIBLE_STATE_VERSION",
            SqueezeError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// State errors leave the parameter store untouched, so the caller can
    /// keep running with the previous values.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SqueezeError::InvalidState { .. } => true,
            SqueezeError::IncompatibleStateVersion { .. } => true,
            SqueezeError::Serialization(_) => true,
            SqueezeError::InvalidProcessSpec { .. } => false,
            SqueezeError::UnsupportedLayout { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = SqueezeError::UnsupportedLayout {
            input: 2,
            output: 6,
        };
        assert_eq!(err.error_code(), "UNSUPPORTED_LAYOUT");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_state_errors_are_recoverable() {
        let err = SqueezeError::InvalidState {
            reason: "truncated".to_string(),
        };
        assert!(err.is_recoverable());

        let err = SqueezeError::IncompatibleStateVersion {
            found: 9,
            supported: 1,
        };
        assert_eq!(err.error_code(), "INCOMPATIBLE_STATE_VERSION");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_serde_error_converts() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_slice(b"{not json");
        let err: SqueezeError = parse.unwrap_err().into();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
