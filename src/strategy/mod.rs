//! Strategy layer: policies that order the eligible gateways for one send.

mod order;
mod random;

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::GatewayConfig;
use crate::domain::Message;
use crate::error::SmsError;

pub use order::OrderStrategy;
pub use random::RandomStrategy;

/// Name of the built-in configuration-order strategy.
pub const ORDER: &str = "order";
/// Name of the built-in uniform-shuffle strategy.
pub const RANDOM: &str = "random";

/// A policy that orders the eligible gateways for a single send attempt.
///
/// `gateways` holds only the candidates that are actually configured for the
/// call; the returned names are tried in order until one succeeds.
pub trait Strategy: Send + Sync {
    /// Order the candidate gateway names.
    fn apply(&self, gateways: &IndexMap<String, GatewayConfig>, message: &Message) -> Vec<String>;
}

impl std::fmt::Debug for dyn Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Strategy")
    }
}

/// Looks strategies up by name, pre-populated with the built-in set.
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    /// Registry holding the built-ins `"order"` and `"random"`.
    pub fn new() -> Self {
        let mut registry = Self {
            strategies: HashMap::new(),
        };
        registry.register(ORDER, Arc::new(OrderStrategy));
        registry.register(RANDOM, Arc::new(RandomStrategy));
        registry
    }

    /// Register a strategy under a name, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, strategy: Arc<dyn Strategy>) {
        self.strategies.insert(name.into(), strategy);
    }

    /// Look up a strategy by name.
    ///
    /// Unknown names fail with [`SmsError::InvalidArgument`] before any
    /// gateway is touched.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Strategy>, SmsError> {
        self.strategies
            .get(name)
            .cloned()
            .ok_or_else(|| SmsError::InvalidArgument(format!("unknown strategy `{name}`")))
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ReverseStrategy;

    impl Strategy for ReverseStrategy {
        fn apply(
            &self,
            gateways: &IndexMap<String, GatewayConfig>,
            _message: &Message,
        ) -> Vec<String> {
            gateways.keys().rev().cloned().collect()
        }
    }

    fn candidates(names: &[&str]) -> IndexMap<String, GatewayConfig> {
        names
            .iter()
            .map(|name| ((*name).to_owned(), GatewayConfig::new()))
            .collect()
    }

    #[test]
    fn builtins_are_registered() {
        let registry = StrategyRegistry::new();
        assert!(registry.get(ORDER).is_ok());
        assert!(registry.get(RANDOM).is_ok());
    }

    #[test]
    fn unknown_name_is_an_invalid_argument() {
        let registry = StrategyRegistry::new();
        let err = registry.get("round_robin").unwrap_err();
        assert!(matches!(err, SmsError::InvalidArgument(_)));
    }

    #[test]
    fn registered_strategies_are_resolvable() {
        let mut registry = StrategyRegistry::new();
        registry.register("reverse", Arc::new(ReverseStrategy));

        let strategy = registry.get("reverse").unwrap();
        let ordered = strategy.apply(&candidates(&["a", "b", "c"]), &Message::default());
        assert_eq!(ordered, vec!["c", "b", "a"]);
    }
}
