//! Configuration layer: per-gateway settings and the service-wide aggregate.

use std::time::Duration;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::SmsError;
use crate::strategy;

/// Request timeout back-filled into gateways that do not set their own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize)]
/// Settings for one delivery gateway.
///
/// One shape serves every provider: fields are provider-specific by
/// convention, and an adapter interprets only the fields it needs, rejecting
/// the configuration when a required one is absent.
pub struct GatewayConfig {
    /// Application/account id (AccessKeyId, public key, username, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    /// Application key (AccessKeySecret, password, token, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_key: Option<String>,
    /// Secondary secret, for providers that need a third credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<String>,
    /// Message signature (SignName, SigContent, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign: Option<String>,
    /// Provider region (e.g. `cn-hangzhou`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Provider API version (e.g. `2021-01-11`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// API endpoint override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Delivery channel / sender number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Project id, for providers that scope credentials to a project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Delivery-status callback URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    /// Invoke id, for providers that bind templates to an invocation code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoke_id: Option<String>,
    /// Signature id, for providers that reference signatures by id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_id: Option<String>,
    /// Per-call timeout; unset gateways inherit the builder's global timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    /// Whether to verify TLS certificates.
    pub ssl_verify: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            app_key: None,
            app_secret: None,
            sign: None,
            region: None,
            version: None,
            endpoint: None,
            channel: None,
            project_id: None,
            callback_url: None,
            invoke_id: None,
            signature_id: None,
            timeout: None,
            ssl_verify: true,
        }
    }
}

impl GatewayConfig {
    /// Empty configuration; fill in the fields your provider needs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application/account id.
    pub fn with_app_id(mut self, value: impl Into<String>) -> Self {
        self.app_id = Some(value.into());
        self
    }

    /// Set the application key.
    pub fn with_app_key(mut self, value: impl Into<String>) -> Self {
        self.app_key = Some(value.into());
        self
    }

    /// Set the secondary secret.
    pub fn with_app_secret(mut self, value: impl Into<String>) -> Self {
        self.app_secret = Some(value.into());
        self
    }

    /// Set the message signature.
    pub fn with_sign(mut self, value: impl Into<String>) -> Self {
        self.sign = Some(value.into());
        self
    }

    /// Set the provider region.
    pub fn with_region(mut self, value: impl Into<String>) -> Self {
        self.region = Some(value.into());
        self
    }

    /// Set the provider API version.
    pub fn with_version(mut self, value: impl Into<String>) -> Self {
        self.version = Some(value.into());
        self
    }

    /// Set the API endpoint override.
    pub fn with_endpoint(mut self, value: impl Into<String>) -> Self {
        self.endpoint = Some(value.into());
        self
    }

    /// Set the delivery channel / sender number.
    pub fn with_channel(mut self, value: impl Into<String>) -> Self {
        self.channel = Some(value.into());
        self
    }

    /// Set the project id.
    pub fn with_project_id(mut self, value: impl Into<String>) -> Self {
        self.project_id = Some(value.into());
        self
    }

    /// Set the delivery-status callback URL.
    pub fn with_callback_url(mut self, value: impl Into<String>) -> Self {
        self.callback_url = Some(value.into());
        self
    }

    /// Set the invoke id.
    pub fn with_invoke_id(mut self, value: impl Into<String>) -> Self {
        self.invoke_id = Some(value.into());
        self
    }

    /// Set the signature id.
    pub fn with_signature_id(mut self, value: impl Into<String>) -> Self {
        self.signature_id = Some(value.into());
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable or disable TLS certificate verification.
    pub fn with_ssl_verify(mut self, verify: bool) -> Self {
        self.ssl_verify = verify;
        self
    }

    /// Serialize the set fields for diagnostics.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone)]
/// Service-wide configuration: the gateway mapping plus dispatch defaults.
///
/// Invariants: the mapping is non-empty, and the default gateway always names
/// an entry in it (the first inserted key when not set explicitly).
pub struct ServiceConfig {
    gateways: IndexMap<String, GatewayConfig>,
    default_gateway: String,
    default_strategy: String,
    debug: bool,
}

impl ServiceConfig {
    /// Create a configuration from a gateway mapping, defaulting the gateway
    /// to the first inserted key and the strategy to `"order"`.
    pub fn new(gateways: IndexMap<String, GatewayConfig>) -> Result<Self, SmsError> {
        let Some(first) = gateways.keys().next().cloned() else {
            return Err(SmsError::Configuration(
                "at least one gateway must be configured".to_owned(),
            ));
        };
        Ok(Self {
            gateways,
            default_gateway: first,
            default_strategy: strategy::ORDER.to_owned(),
            debug: false,
        })
    }

    /// Start building a configuration fluently.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::new()
    }

    /// Get a gateway's configuration by name; absent names yield `None`.
    pub fn gateway(&self, name: &str) -> Option<&GatewayConfig> {
        self.gateways.get(name)
    }

    /// The full gateway mapping, in registration order.
    pub fn gateways(&self) -> &IndexMap<String, GatewayConfig> {
        &self.gateways
    }

    /// Configured gateway names, in registration order.
    pub fn gateway_names(&self) -> impl Iterator<Item = &str> {
        self.gateways.keys().map(String::as_str)
    }

    /// Name of the default gateway.
    pub fn default_gateway(&self) -> &str {
        &self.default_gateway
    }

    /// Configuration of the default gateway.
    pub fn default_gateway_config(&self) -> Option<&GatewayConfig> {
        self.gateways.get(&self.default_gateway)
    }

    /// Change the default gateway.
    ///
    /// Fails with [`SmsError::InvalidArgument`] when the name is not in the
    /// mapping.
    pub fn set_default_gateway(&mut self, name: &str) -> Result<(), SmsError> {
        if !self.gateways.contains_key(name) {
            return Err(SmsError::InvalidArgument(format!(
                "unknown gateway `{name}`"
            )));
        }
        self.default_gateway = name.to_owned();
        Ok(())
    }

    /// Name of the default gateway-selection strategy.
    pub fn default_strategy(&self) -> &str {
        &self.default_strategy
    }

    /// Whether verbose diagnostics are enabled.
    pub fn debug(&self) -> bool {
        self.debug
    }
}

#[derive(Debug, Clone)]
/// Fluent builder for [`ServiceConfig`].
pub struct ServiceConfigBuilder {
    gateways: IndexMap<String, GatewayConfig>,
    default_gateway: Option<String>,
    default_strategy: String,
    timeout: Duration,
    debug: bool,
}

impl ServiceConfigBuilder {
    /// Builder with no gateways, the `"order"` strategy, and the default
    /// global timeout.
    pub fn new() -> Self {
        Self {
            gateways: IndexMap::new(),
            default_gateway: None,
            default_strategy: strategy::ORDER.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            debug: false,
        }
    }

    /// Add or replace a gateway configuration.
    pub fn gateway(mut self, name: impl Into<String>, config: GatewayConfig) -> Self {
        self.gateways.insert(name.into(), config);
        self
    }

    /// Name the default gateway explicitly.
    pub fn default_gateway(mut self, name: impl Into<String>) -> Self {
        self.default_gateway = Some(name.into());
        self
    }

    /// Name the default strategy.
    pub fn default_strategy(mut self, name: impl Into<String>) -> Self {
        self.default_strategy = name.into();
        self
    }

    /// Set the global timeout back-filled into gateways that did not
    /// configure a more specific one.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable verbose diagnostics.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build the configuration.
    ///
    /// Fails with [`SmsError::Configuration`] when no gateway was added or
    /// the explicit default gateway is not in the mapping.
    pub fn build(self) -> Result<ServiceConfig, SmsError> {
        let mut config = ServiceConfig::new(self.gateways)?;

        for gateway in config.gateways.values_mut() {
            gateway.timeout.get_or_insert(self.timeout);
        }

        if let Some(name) = self.default_gateway {
            if !config.gateways.contains_key(&name) {
                return Err(SmsError::Configuration(format!(
                    "default gateway `{name}` is not configured"
                )));
            }
            config.default_gateway = name;
        }
        config.default_strategy = self.default_strategy;
        config.debug = self.debug;

        Ok(config)
    }
}

impl Default for ServiceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mapping_is_rejected() {
        let err = ServiceConfig::new(IndexMap::new()).unwrap_err();
        assert!(matches!(err, SmsError::Configuration(_)));

        let err = ServiceConfig::builder().build().unwrap_err();
        assert!(matches!(err, SmsError::Configuration(_)));
    }

    #[test]
    fn default_gateway_is_first_inserted_key() {
        let config = ServiceConfig::builder()
            .gateway("acme", GatewayConfig::new())
            .gateway("zeta", GatewayConfig::new())
            .build()
            .unwrap();
        assert_eq!(config.default_gateway(), "acme");
        assert!(config.default_gateway_config().is_some());
        assert_eq!(config.default_strategy(), "order");
        assert!(!config.debug());
    }

    #[test]
    fn explicit_default_gateway_must_exist() {
        let err = ServiceConfig::builder()
            .gateway("acme", GatewayConfig::new())
            .default_gateway("ghost")
            .build()
            .unwrap_err();
        assert!(matches!(err, SmsError::Configuration(_)));

        let config = ServiceConfig::builder()
            .gateway("acme", GatewayConfig::new())
            .gateway("zeta", GatewayConfig::new())
            .default_gateway("zeta")
            .build()
            .unwrap();
        assert_eq!(config.default_gateway(), "zeta");
    }

    #[test]
    fn set_default_gateway_validates_the_name() {
        let mut config = ServiceConfig::builder()
            .gateway("acme", GatewayConfig::new())
            .gateway("zeta", GatewayConfig::new())
            .build()
            .unwrap();

        config.set_default_gateway("zeta").unwrap();
        assert_eq!(config.default_gateway(), "zeta");

        let err = config.set_default_gateway("ghost").unwrap_err();
        assert!(matches!(err, SmsError::InvalidArgument(_)));
        assert_eq!(config.default_gateway(), "zeta");
    }

    #[test]
    fn absent_gateway_lookup_is_none_not_an_error() {
        let config = ServiceConfig::builder()
            .gateway("acme", GatewayConfig::new())
            .build()
            .unwrap();
        assert!(config.gateway("ghost").is_none());
    }

    #[test]
    fn global_timeout_backfills_only_unset_gateways() {
        let config = ServiceConfig::builder()
            .gateway("slow", GatewayConfig::new().with_timeout(Duration::from_secs(30)))
            .gateway("plain", GatewayConfig::new())
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        assert_eq!(
            config.gateway("slow").unwrap().timeout,
            Some(Duration::from_secs(30))
        );
        assert_eq!(
            config.gateway("plain").unwrap().timeout,
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn to_value_omits_unset_fields() {
        let value = GatewayConfig::new()
            .with_app_id("id-1")
            .with_sign("[Acme]")
            .to_value();

        let object = value.as_object().unwrap();
        assert_eq!(object.get("app_id").and_then(Value::as_str), Some("id-1"));
        assert_eq!(object.get("sign").and_then(Value::as_str), Some("[Acme]"));
        assert!(!object.contains_key("app_key"));
        assert!(!object.contains_key("endpoint"));
        assert_eq!(object.get("ssl_verify").and_then(Value::as_bool), Some(true));
    }
}
