use indexmap::IndexMap;

use crate::config::GatewayConfig;
use crate::domain::Message;

use super::Strategy;

/// Tries gateways in the order they were configured. Deterministic.
pub struct OrderStrategy;

impl Strategy for OrderStrategy {
    fn apply(&self, gateways: &IndexMap<String, GatewayConfig>, _message: &Message) -> Vec<String> {
        gateways.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_configuration_order() {
        let gateways: IndexMap<String, GatewayConfig> = ["zeta", "acme", "beta"]
            .into_iter()
            .map(|name| (name.to_owned(), GatewayConfig::new()))
            .collect();

        let ordered = OrderStrategy.apply(&gateways, &Message::default());
        assert_eq!(ordered, vec!["zeta", "acme", "beta"]);
    }

    #[test]
    fn empty_input_yields_empty_order() {
        let ordered = OrderStrategy.apply(&IndexMap::new(), &Message::default());
        assert!(ordered.is_empty());
    }
}
