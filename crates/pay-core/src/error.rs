//! # Payment Error Types
//!
//! Typed error handling for the epay-cart gateway client.
//! All gateway operations return `Result<T, PaymentError>`.
//!
//! Callback verification is deliberately absent here: `verify` answers with a
//! boolean and callers decide what a `false` means.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Missing merchant id / key or invalid settings. Raised before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data supplied by the caller
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network/timeout failure reaching the gateway
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status or non-success gateway response code
    #[error("Gateway rejected request{}: {message}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    GatewayRejection {
        status: Option<u16>,
        message: String,
    },

    /// Success status but an expected field is missing (e.g. 302 without `Location`)
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Gateway body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Shorthand for a rejection carrying the HTTP status
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        PaymentError::GatewayRejection {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Returns true if this error is transient. Nothing in this crate retries;
    /// the flag is for callers that do.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaymentError::Transport(_))
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::Transport(_) => 503,
            PaymentError::GatewayRejection { .. } => 502,
            PaymentError::ProtocolViolation(_) => 502,
            PaymentError::Serialization(_) => 502,
            PaymentError::Internal(_) => 500,
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(PaymentError::Transport("timeout".into()).is_retryable());
        assert!(!PaymentError::rejected(500, "boom").is_retryable());
        assert!(!PaymentError::Configuration("EPAY_PID not set".into()).is_retryable());
        assert!(!PaymentError::InvalidRequest("bad data".into()).is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PaymentError::InvalidRequest("test".into()).status_code(),
            400
        );
        assert_eq!(PaymentError::rejected(403, "nope").status_code(), 502);
        assert_eq!(PaymentError::Transport("reset".into()).status_code(), 503);
    }

    #[test]
    fn test_rejection_display() {
        let err = PaymentError::rejected(500, "merchant disabled");
        assert_eq!(
            err.to_string(),
            "Gateway rejected request (HTTP 500): merchant disabled"
        );

        let err = PaymentError::GatewayRejection {
            status: None,
            message: "order not found".into(),
        };
        assert_eq!(err.to_string(), "Gateway rejected request: order not found");
    }
}
