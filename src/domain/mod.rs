//! Domain layer: value types for recipients, messages, and attempt outcomes
//! (no I/O).

mod message;
mod phone;
mod response;

pub use message::{DynamicField, Message, TemplateData};
pub use phone::PhoneNumber;
pub use response::{BatchResponse, Response, ResponseError, Status, UnixTimestamp};
