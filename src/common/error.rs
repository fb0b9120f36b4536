//! Common Error Types
//!
//! Unified error handling across the redemption engine.

use thiserror::Error;

/// Root error type
#[derive(Debug, Error)]
pub enum BloomError {
    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Logging errors
    #[error("logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Redemption engine errors
    #[error("engine error: {0}")]
    Engine(#[from] crate::engine::EngineError),

    /// HTLC bridge errors
    #[error("bridge error: {0}")]
    Bridge(#[from] crate::bridge::BridgeError),

    /// Supply ledger errors
    #[error("ledger error: {0}")]
    Ledger(#[from] crate::ledger::LedgerError),

    /// Intent signer errors
    #[error("signer error: {0}")]
    Signer(#[from] crate::bridge::SignerError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BloomError {
    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        match self {
            BloomError::Bridge(e) => matches!(
                e,
                crate::bridge::BridgeError::Http(_) | crate::bridge::BridgeError::CreateFailed(_)
            ),
            BloomError::Io(_) => true,
            _ => false,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            BloomError::Config(_) => "CONFIG_ERROR",
            BloomError::Logging(_) => "LOGGING_ERROR",
            BloomError::Engine(e) => e.error_code(),
            BloomError::Bridge(_) => "BRIDGE_ERROR",
            BloomError::Ledger(_) => "LEDGER_ERROR",
            BloomError::Signer(_) => "SIGNER_ERROR",
            BloomError::Io(_) => "IO_ERROR",
        }
    }
}

/// Result type alias using BloomError
pub type Result<T> = std::result::Result<T, BloomError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeError;
    use crate::engine::EngineError;

    #[test]
    fn test_error_codes() {
        let err: BloomError = EngineError::InvalidAmount { got: 0 }.into();
        assert_eq!(err.error_code(), "INVALID_AMOUNT");

        let err: BloomError = BridgeError::CreateFailed("down".to_string()).into();
        assert_eq!(err.error_code(), "BRIDGE_ERROR");
    }

    #[test]
    fn test_retryable_errors() {
        let err: BloomError = BridgeError::CreateFailed("timeout".to_string()).into();
        assert!(err.is_retryable());

        let err: BloomError = EngineError::InvalidAmount { got: 0 }.into();
        assert!(!err.is_retryable());
    }
}
