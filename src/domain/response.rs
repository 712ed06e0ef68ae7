use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Outcome of a single gateway attempt as reported by the provider.
pub enum Status {
    Success,
    Failed,
    Pending,
    Delivering,
    Rejected,
    Unknown,
}

impl Status {
    /// Lowercase wire-style name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Pending => "pending",
            Self::Delivering => "delivering",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Unix timestamp in seconds.
pub struct UnixTimestamp(u64);

impl UnixTimestamp {
    /// Create a timestamp value (no range validation is performed).
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The current time.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        Self(secs)
    }

    /// Get the underlying timestamp in seconds.
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
/// Structured error attached to a failure [`Response`].
pub struct ResponseError {
    code: String,
    message: String,
    details: Value,
}

impl ResponseError {
    /// Create a response error with a code and human-readable message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Value::Null,
        }
    }

    /// Attach a detail payload.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Error code, provider-specific or one of the crate's generic codes.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Detail payload, `Value::Null` when none was captured.
    pub fn details(&self) -> &Value {
        &self.details
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)
    }
}

#[derive(Debug, Clone)]
/// Normalized outcome of one gateway attempt.
///
/// Success and failure sides are mutually exclusive: a success response has
/// no error, a failure response has no message id/timestamp/fee. The raw
/// provider payload is always retained for diagnostics.
pub struct Response {
    /// Gateway that handled the attempt.
    pub gateway: String,
    /// Attempt outcome.
    pub status: Status,
    /// Recipient, in international format.
    pub phone_number: String,
    /// Provider tracking id, on success.
    pub message_id: Option<String>,
    /// When the message was accepted, on success.
    pub sent_at: Option<UnixTimestamp>,
    /// Billed segment count, on success.
    pub fee: Option<u32>,
    /// Structured error, on failure.
    pub error: Option<ResponseError>,
    /// Raw provider payload.
    pub raw: Value,
}

impl Response {
    /// Build a success response stamped with the current time.
    pub fn success(
        gateway: impl Into<String>,
        phone_number: impl Into<String>,
        message_id: Option<String>,
        fee: u32,
        raw: Value,
    ) -> Self {
        Self {
            gateway: gateway.into(),
            status: Status::Success,
            phone_number: phone_number.into(),
            message_id,
            sent_at: Some(UnixTimestamp::now()),
            fee: Some(fee),
            error: None,
            raw,
        }
    }

    /// Build a failure response carrying a structured error.
    pub fn failure(
        gateway: impl Into<String>,
        phone_number: impl Into<String>,
        error: ResponseError,
        raw: Value,
    ) -> Self {
        Self {
            gateway: gateway.into(),
            status: Status::Failed,
            phone_number: phone_number.into(),
            message_id: None,
            sent_at: None,
            fee: None,
            error: Some(error),
            raw,
        }
    }

    /// Whether the attempt succeeded.
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Whether the attempt failed.
    pub fn is_failed(&self) -> bool {
        self.status == Status::Failed
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            write!(
                f,
                "sent via {} to {} (id: {})",
                self.gateway,
                self.phone_number,
                self.message_id.as_deref().unwrap_or("unknown")
            )
        } else {
            let error = self
                .error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unknown error".to_owned());
            write!(
                f,
                "send via {} to {} failed: {}",
                self.gateway, self.phone_number, error
            )
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Ordered sequence of attempt responses, one per attempt or per recipient.
pub struct BatchResponse {
    responses: Vec<Response>,
}

impl BatchResponse {
    /// Empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a response, preserving attempt order.
    pub fn push(&mut self, response: Response) {
        self.responses.push(response);
    }

    /// Number of responses collected.
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Whether the batch holds no responses.
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// All responses in order.
    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    /// Iterate over the responses in order.
    pub fn iter(&self) -> impl Iterator<Item = &Response> {
        self.responses.iter()
    }

    /// `true` when the batch is non-empty and every response succeeded.
    pub fn is_success(&self) -> bool {
        !self.responses.is_empty() && self.responses.iter().all(Response::is_success)
    }

    /// `true` unless every response succeeded.
    pub fn is_failed(&self) -> bool {
        !self.is_success()
    }

    /// The responses that succeeded, in order.
    pub fn succeeded(&self) -> impl Iterator<Item = &Response> {
        self.responses.iter().filter(|r| r.is_success())
    }

    /// The responses that failed, in order.
    pub fn failed(&self) -> impl Iterator<Item = &Response> {
        self.responses.iter().filter(|r| r.is_failed())
    }

    /// The responses produced by the named gateway, in order.
    pub fn by_gateway<'a>(&'a self, gateway: &'a str) -> impl Iterator<Item = &'a Response> {
        self.responses.iter().filter(move |r| r.gateway == gateway)
    }
}

impl IntoIterator for BatchResponse {
    type Item = Response;
    type IntoIter = std::vec::IntoIter<Response>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.into_iter()
    }
}
