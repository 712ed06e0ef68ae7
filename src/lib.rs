//! Send SMS through interchangeable delivery gateways with policy-driven
//! failover.
//!
//! The crate is split the way the code flows: a domain layer of value types
//! (recipients, messages, attempt outcomes), a gateway layer defining the
//! capability contract provider adapters implement, a strategy layer
//! ordering the eligible gateways, and a dispatcher orchestrating the
//! failover loop: first success wins, and total exhaustion surfaces as a
//! single error carrying every failed attempt.
//!
//! ```rust,no_run
//! use omnisms::{Dispatcher, GatewayConfig, Message, ServiceConfig};
//!
//! # async fn example() -> Result<(), omnisms::SmsError> {
//! let config = ServiceConfig::builder()
//!     .gateway(
//!         "acme",
//!         GatewayConfig::new().with_app_id("id").with_app_key("secret"),
//!     )
//!     .gateway("zeta", GatewayConfig::new().with_app_key("token"))
//!     .build()?;
//!
//! let dispatcher = Dispatcher::new(config);
//! // dispatcher.register_gateway("acme", || ...) wires in provider adapters.
//!
//! let message = Message::text("your code is 1234").with_gateways(["acme", "zeta"]);
//! let response = dispatcher.send("13800138000", &message).await?;
//! println!("sent via {}", response.gateway);
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod strategy;

pub use config::{DEFAULT_TIMEOUT, GatewayConfig, ServiceConfig, ServiceConfigBuilder};
pub use dispatcher::{Dispatcher, SEND_FAILED_CODE, SendOptions, UNKNOWN_GATEWAY_CODE};
pub use domain::{
    BatchResponse, DynamicField, Message, PhoneNumber, Response, ResponseError, Status,
    TemplateData, UnixTimestamp,
};
pub use error::{GatewayError, SmsError};
pub use gateway::{BoxFuture, Gateway, UNKNOWN_ERROR_CODE};
pub use strategy::{OrderStrategy, RandomStrategy, Strategy, StrategyRegistry};
