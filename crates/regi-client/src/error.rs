//! # Client Error Types
//!
//! Errors raised while setting up or driving the register.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   HTTP Setup    │  │     Session             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  HttpClient     │  │  Session(CoreError)     │ │
//! │  │  InvalidUrl     │  │                 │  │  (operator notices)     │ │
//! │  │  ConfigLoad...  │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures of individual catalog/ledger calls are not here: they travel as
//! [`regi_core::AdapterError`] into the session, which decides what the
//! operator sees.

use regi_core::CoreError;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A configuration value is out of bounds.
    #[error("Invalid terminal configuration: {0}")]
    InvalidConfig(String),

    /// The service base URL is unusable.
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // HTTP Setup Errors
    // =========================================================================
    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// A register operation was refused or failed. Never fatal.
    #[error(transparent)]
    Session(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::HttpClient(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
        )
    }

    /// Returns true if the register can keep running after this error.
    pub fn is_operator_notice(&self) -> bool {
        matches!(self, ClientError::Session(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regi_core::{Operation, ValidationError};

    #[test]
    fn test_config_errors() {
        assert!(ClientError::InvalidConfig("pos_no".into()).is_config_error());
        assert!(ClientError::InvalidUrl("ftp://x".into()).is_config_error());
        assert!(ClientError::ConfigLoadFailed("eof".into()).is_config_error());

        assert!(!ClientError::HttpClient("tls".into()).is_config_error());
        assert!(!ClientError::Session(CoreError::NoQuantityEdit).is_config_error());
    }

    #[test]
    fn test_session_error_is_transparent() {
        let err: ClientError = CoreError::Busy(Operation::Checkout).into();
        assert!(err.is_operator_notice());
        assert_eq!(err.to_string(), "A checkout is already in progress");

        let err: ClientError = CoreError::InvalidInput(ValidationError::Required {
            field: "product code".into(),
        })
        .into();
        assert_eq!(err.to_string(), "Invalid input: product code is required");
    }

    #[test]
    fn test_url_parse_error_conversion() {
        let err: ClientError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }
}
