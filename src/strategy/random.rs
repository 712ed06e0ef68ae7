use indexmap::IndexMap;
use rand::seq::SliceRandom;

use crate::config::GatewayConfig;
use crate::domain::Message;

use super::Strategy;

/// Tries gateways in a uniformly shuffled order.
pub struct RandomStrategy;

impl Strategy for RandomStrategy {
    fn apply(&self, gateways: &IndexMap<String, GatewayConfig>, _message: &Message) -> Vec<String> {
        let mut names: Vec<String> = gateways.keys().cloned().collect();
        names.shuffle(&mut rand::rng());
        names
    }
}
