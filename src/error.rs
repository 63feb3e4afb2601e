//! Application Error Type
//!
//! Unifies the error types of the deposit pipeline for the CLI.

use thiserror::Error;

use crate::bridge::sdk::BridgeError;
use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::storage::StorageError;
use crate::types::flow::FlowError;

/// Root error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging errors
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Resume store errors
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Bridge client construction or unclassified bridge errors
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Classified deposit flow failure
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// Bad command-line input
    #[error("invalid input: {0}")]
    Input(String),
}

impl AppError {
    /// Create an input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Bridge(_) | AppError::Storage(_) => true,
            AppError::Flow(err) => err.kind.is_retryable(),
            _ => false,
        }
    }

    /// Get error code for display
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Logging(_) => "LOGGING_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Bridge(_) => "BRIDGE_ERROR",
            AppError::Flow(err) => err.kind.error_code(),
            AppError::Input(_) => "INPUT_ERROR",
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::flow::{ErrorKind, FlowStep};

    #[test]
    fn test_flow_error_code_passes_through() {
        let err: AppError = FlowError::validation("Invalid Stacks address format").into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(
            err.to_string(),
            "validation failed: Invalid Stacks address format"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_errors() {
        let network = FlowError {
            step: FlowStep::ExecuteTransaction,
            kind: ErrorKind::Network,
            message: "timeout".to_string(),
            cause: None,
            details: None,
            is_inscription_error: false,
        };
        assert!(AppError::from(network).is_retryable());
        assert!(AppError::from(BridgeError::Transport("reset".to_string())).is_retryable());
        assert!(!AppError::input("missing --amount").is_retryable());
        assert_eq!(AppError::input("x").error_code(), "INPUT_ERROR");
    }
}
