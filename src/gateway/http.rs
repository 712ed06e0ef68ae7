//! Shared HTTP plumbing for provider adapters.
//!
//! The core never calls a provider itself, but every adapter needs a client
//! honoring the gateway's timeout and TLS settings, and an endpoint resolved
//! against the provider default.

use url::Url;

use crate::config::GatewayConfig;
use crate::error::SmsError;

/// Build an HTTP client honoring the gateway's timeout and TLS settings.
pub fn client_for(config: &GatewayConfig) -> Result<reqwest::Client, SmsError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if !config.ssl_verify {
        builder = builder.danger_accept_invalid_certs(true);
    }
    builder
        .build()
        .map_err(|err| SmsError::Configuration(format!("failed to build HTTP client: {err}")))
}

/// Resolve the endpoint for a call: the configured override when present,
/// the provider default otherwise.
pub fn endpoint_url(config: &GatewayConfig, default: &str) -> Result<Url, SmsError> {
    let raw = config.endpoint.as_deref().unwrap_or(default);
    Url::parse(raw)
        .map_err(|err| SmsError::Configuration(format!("invalid endpoint `{raw}`: {err}")))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn client_builds_with_timeout_and_relaxed_tls() {
        let config = GatewayConfig::new()
            .with_timeout(Duration::from_secs(2))
            .with_ssl_verify(false);
        assert!(client_for(&config).is_ok());

        assert!(client_for(&GatewayConfig::new()).is_ok());
    }

    #[test]
    fn endpoint_override_wins_over_default() {
        let config = GatewayConfig::new().with_endpoint("https://sms.example.com/v2/send");
        let url = endpoint_url(&config, "https://api.example.com/send").unwrap();
        assert_eq!(url.as_str(), "https://sms.example.com/v2/send");

        let url = endpoint_url(&GatewayConfig::new(), "https://api.example.com/send").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/send");
    }

    #[test]
    fn invalid_endpoint_is_a_configuration_error() {
        let config = GatewayConfig::new().with_endpoint("not a url");
        let err = endpoint_url(&config, "https://api.example.com/send").unwrap_err();
        assert!(matches!(err, SmsError::Configuration(_)));
    }
}
