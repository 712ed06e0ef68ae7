//! Dispatcher: resolves which gateways and strategy apply to a send, then
//! walks the ordered candidates until one accepts the message.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{GatewayConfig, ServiceConfig};
use crate::domain::{BatchResponse, Message, PhoneNumber, Response, ResponseError};
use crate::error::SmsError;
use crate::gateway::Gateway;
use crate::strategy::{Strategy, StrategyRegistry};

/// Error code reported when a configured gateway has no registered adapter.
pub const UNKNOWN_GATEWAY_CODE: &str = "UNKNOWN_GATEWAY";
/// Error code reported when a recipient's whole dispatch failed in a batch.
pub const SEND_FAILED_CODE: &str = "SEND_FAILED";

type GatewayFactory = Box<dyn Fn() -> Arc<dyn Gateway> + Send + Sync>;

#[derive(Debug, Clone, Default)]
/// Per-call overrides; take priority over per-message overrides and the
/// configured defaults.
pub struct SendOptions {
    /// Gateways to try for this call.
    pub gateways: Option<Vec<String>>,
    /// Strategy ordering the candidates for this call.
    pub strategy: Option<String>,
}

/// The orchestration engine.
///
/// Holds the read-only service configuration, the strategy registry, and the
/// adapter factories. Adapter instances are built lazily on first use and
/// memoized for the dispatcher's lifetime; the cache is lock-guarded so a
/// shared dispatcher can serve concurrent sends.
pub struct Dispatcher {
    config: ServiceConfig,
    strategies: StrategyRegistry,
    factories: HashMap<String, GatewayFactory>,
    instances: RwLock<HashMap<String, Arc<dyn Gateway>>>,
}

impl Dispatcher {
    /// Create a dispatcher over a service configuration.
    ///
    /// Register provider adapters with [`Dispatcher::register_gateway`]
    /// before sending.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            strategies: StrategyRegistry::new(),
            factories: HashMap::new(),
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// The service configuration this dispatcher was built with.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Register an adapter factory for the named gateway.
    ///
    /// The factory runs once, on the first attempt through that gateway.
    pub fn register_gateway<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn Gateway> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Register a strategy under a name, alongside the built-ins.
    pub fn register_strategy(&mut self, name: impl Into<String>, strategy: Arc<dyn Strategy>) {
        self.strategies.register(name, strategy);
    }

    /// Send a message using the configured defaults.
    pub async fn send(
        &self,
        to: impl Into<PhoneNumber>,
        message: &Message,
    ) -> Result<Response, SmsError> {
        self.send_with(to, message, &SendOptions::default()).await
    }

    /// Send a message with per-call overrides.
    ///
    /// Candidate gateways are resolved call override, then message override,
    /// then default gateway, then all configured gateways; the resolved
    /// strategy orders them and they are tried sequentially until one
    /// accepts the message.
    ///
    /// Errors:
    /// - [`SmsError::NoGatewaySelected`] when no candidate list could be
    ///   resolved, before any I/O,
    /// - [`SmsError::InvalidArgument`] for an unknown strategy name, before
    ///   any gateway is touched,
    /// - [`SmsError::NoGatewayAvailable`] when every attempt failed, with
    ///   one failure response per attempted gateway attached.
    pub async fn send_with(
        &self,
        to: impl Into<PhoneNumber>,
        message: &Message,
        options: &SendOptions,
    ) -> Result<Response, SmsError> {
        let to = to.into();
        let names = self.resolve_gateway_names(message, options)?;
        let strategy = self.resolve_strategy(message, options)?;
        let candidates = self.narrow_configs(&names);
        let ordered = strategy.apply(&candidates, message);
        self.dispatch(&to, message, &ordered).await
    }

    /// Send one message to many recipients.
    ///
    /// Each recipient is dispatched independently; an error escaping a
    /// single recipient's send is converted into a failure response so the
    /// remaining recipients are still processed. The returned batch holds
    /// exactly one response per recipient, in input order.
    pub async fn send_batch<I, P>(
        &self,
        recipients: I,
        message: &Message,
        options: &SendOptions,
    ) -> BatchResponse
    where
        I: IntoIterator<Item = P>,
        P: Into<PhoneNumber>,
    {
        let mut batch = BatchResponse::new();
        for to in recipients {
            let to = to.into();
            match self.send_with(to.clone(), message, options).await {
                Ok(response) => batch.push(response),
                Err(err) => {
                    warn!(to = %to, error = %err, "recipient dispatch failed");
                    batch.push(Response::failure(
                        "unknown",
                        to.international(),
                        ResponseError::new(SEND_FAILED_CODE, err.to_string()),
                        Value::Null,
                    ));
                }
            }
        }
        batch
    }

    /// Candidate names in priority order: call override, message override,
    /// default gateway, all configured names.
    fn resolve_gateway_names(
        &self,
        message: &Message,
        options: &SendOptions,
    ) -> Result<Vec<String>, SmsError> {
        if let Some(names) = &options.gateways {
            if !names.is_empty() {
                return Ok(names.clone());
            }
        }
        if let Some(names) = message.gateways() {
            if !names.is_empty() {
                return Ok(names.to_vec());
            }
        }
        let default = self.config.default_gateway();
        if !default.is_empty() {
            return Ok(vec![default.to_owned()]);
        }
        let all: Vec<String> = self.config.gateway_names().map(str::to_owned).collect();
        if !all.is_empty() {
            return Ok(all);
        }
        Err(SmsError::NoGatewaySelected)
    }

    fn resolve_strategy(
        &self,
        message: &Message,
        options: &SendOptions,
    ) -> Result<Arc<dyn Strategy>, SmsError> {
        let name = options
            .strategy
            .as_deref()
            .or_else(|| message.strategy())
            .unwrap_or_else(|| self.config.default_strategy());
        self.strategies.get(name)
    }

    /// Keep only the candidates that are actually configured; names without
    /// a configuration are not offered to the strategy.
    fn narrow_configs(&self, names: &[String]) -> IndexMap<String, GatewayConfig> {
        names
            .iter()
            .filter_map(|name| {
                self.config
                    .gateway(name)
                    .map(|config| (name.clone(), config.clone()))
            })
            .collect()
    }

    async fn dispatch(
        &self,
        to: &PhoneNumber,
        message: &Message,
        ordered: &[String],
    ) -> Result<Response, SmsError> {
        let mut attempts = BatchResponse::new();

        for name in ordered {
            let Some(config) = self.config.gateway(name) else {
                continue;
            };

            debug!(gateway = %name, to = %to, "attempting send");
            let response = match self.gateway(name) {
                Ok(gateway) => gateway.send(to, message, config).await,
                Err(err) => Response::failure(
                    name.as_str(),
                    to.international(),
                    ResponseError::new(UNKNOWN_GATEWAY_CODE, err.to_string()),
                    Value::Null,
                ),
            };

            if response.is_success() {
                debug!(gateway = %name, message_id = ?response.message_id, "send accepted");
                return Ok(response);
            }

            warn!(
                gateway = %name,
                error = %response.error.as_ref().map(ToString::to_string).unwrap_or_default(),
                "gateway attempt failed"
            );
            if self.config.debug() {
                debug!(gateway = %name, raw = %response.raw, "provider payload");
            }
            attempts.push(response);
        }

        Err(SmsError::NoGatewayAvailable { attempts })
    }

    /// Fetch the memoized adapter for a gateway, building it on first use.
    fn gateway(&self, name: &str) -> Result<Arc<dyn Gateway>, SmsError> {
        {
            let instances = self.instances.read().unwrap_or_else(|err| err.into_inner());
            if let Some(instance) = instances.get(name) {
                return Ok(Arc::clone(instance));
            }
        }

        let factory = self.factories.get(name).ok_or_else(|| {
            SmsError::InvalidArgument(format!("no adapter registered for gateway `{name}`"))
        })?;
        let instance = factory();

        let mut instances = self.instances.write().unwrap_or_else(|err| err.into_inner());
        let entry = instances.entry(name.to_owned()).or_insert(instance);
        Ok(Arc::clone(entry))
    }
}
