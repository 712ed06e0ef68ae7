//! Crate error taxonomy: fail-fast configuration/lookup errors, per-attempt
//! gateway errors, and total-exhaustion failures.

use std::fmt;

use serde_json::Value;

use crate::domain::BatchResponse;

#[derive(Debug, Clone)]
/// A single provider attempt failed.
///
/// Carries the provider's own error code and message plus the raw payload the
/// provider returned (or a synthesized one for transport failures). The
/// generic send wrapper converts this into a failure [`Response`]; it never
/// reaches the dispatcher's failover loop raw.
///
/// [`Response`]: crate::domain::Response
pub struct GatewayError {
    code: String,
    message: String,
    raw: Value,
}

impl GatewayError {
    /// Create a gateway error with a provider code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            raw: Value::Null,
        }
    }

    /// Attach the raw provider payload for diagnostics.
    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = raw;
        self
    }

    /// Provider error code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable provider message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Raw provider payload, `Value::Null` when none was captured.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} (code: {})", self.message, self.code)
        }
    }
}

impl std::error::Error for GatewayError {}

#[derive(Debug, thiserror::Error)]
/// Errors surfaced to callers of the dispatcher.
///
/// Configuration and lookup errors are raised before any I/O. Per-gateway
/// failures never appear here directly: the failover loop converts them into
/// failure [`Response`]s, and only total exhaustion surfaces as
/// [`SmsError::NoGatewayAvailable`].
///
/// [`Response`]: crate::domain::Response
pub enum SmsError {
    /// The service configuration is invalid, or an adapter reported a
    /// required field missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An unknown gateway or strategy was requested by name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No candidate gateway could be resolved for the call.
    #[error("no gateway selected")]
    NoGatewaySelected,

    /// A single provider attempt failed.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Every candidate gateway was attempted and failed, or none could be
    /// attempted at all. The attached batch holds one failure response per
    /// attempted gateway.
    #[error("no gateway was able to send the message ({} attempted)", .attempts.len())]
    NoGatewayAvailable { attempts: BatchResponse },
}

impl SmsError {
    /// Configuration error naming a required field an adapter found missing.
    pub fn missing_field(gateway: &str, field: &str) -> Self {
        Self::Configuration(format!(
            "gateway `{gateway}` requires config field `{field}`"
        ))
    }

    /// The per-gateway failure responses attached to
    /// [`SmsError::NoGatewayAvailable`], if any.
    pub fn attempts(&self) -> Option<&BatchResponse> {
        match self {
            Self::NoGatewayAvailable { attempts } => Some(attempts),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_display_includes_code_when_present() {
        let err = GatewayError::new("isv.BUSY", "system busy");
        assert_eq!(err.to_string(), "system busy (code: isv.BUSY)");

        let err = GatewayError::new("", "plain failure");
        assert_eq!(err.to_string(), "plain failure");
    }

    #[test]
    fn missing_field_names_gateway_and_field() {
        let err = SmsError::missing_field("acme", "app_key");
        assert_eq!(
            err.to_string(),
            "configuration error: gateway `acme` requires config field `app_key`"
        );
        assert!(matches!(err, SmsError::Configuration(_)));
    }

    #[test]
    fn attempts_is_only_populated_for_exhaustion() {
        let err = SmsError::NoGatewaySelected;
        assert!(err.attempts().is_none());

        let err = SmsError::NoGatewayAvailable {
            attempts: BatchResponse::new(),
        };
        assert_eq!(err.attempts().map(|batch| batch.len()), Some(0));
    }
}
