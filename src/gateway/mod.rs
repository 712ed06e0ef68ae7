//! Gateway layer: the capability contract every provider adapter implements,
//! and the generic wrapper that normalizes each attempt into a [`Response`].

pub mod http;

use std::future::Future;
use std::pin::Pin;

use serde_json::{Value, json};

use crate::config::GatewayConfig;
use crate::domain::{Message, PhoneNumber, Response, ResponseError};
use crate::error::SmsError;

/// Boxed future used by the gateway contract, so adapters stay object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error code used when an attempt fails with anything other than a
/// [`GatewayError`](crate::error::GatewayError).
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";

/// Raw-payload keys scanned by the default message-id extraction.
const MESSAGE_ID_KEYS: &[&str] = &["message_id", "msg_id", "msgid", "smsid", "sid", "id"];

/// The capability contract of a delivery provider adapter.
///
/// Only [`Gateway::perform_send`] talks to the provider. Everything around
/// it (config validation, id extraction, fee calculation) feeds the provided
/// [`Gateway::send`] wrapper, which is the single place attempts are
/// normalized into [`Response`]s. Adapters never build `Response`s
/// themselves.
pub trait Gateway: Send + Sync {
    /// Name this gateway is configured and selected under.
    fn name(&self) -> &str;

    /// Check that the configuration carries every field this provider needs.
    ///
    /// Called before any network attempt. The default accepts anything;
    /// adapters fail with [`SmsError::missing_field`] for absent fields.
    fn validate_config(&self, config: &GatewayConfig) -> Result<(), SmsError> {
        let _ = config;
        Ok(())
    }

    /// Perform the provider-specific call and return its raw payload.
    ///
    /// Transport and business failures are reported as
    /// [`SmsError::Gateway`].
    fn perform_send<'a>(
        &'a self,
        to: &'a PhoneNumber,
        message: &'a Message,
        config: &'a GatewayConfig,
    ) -> BoxFuture<'a, Result<Value, SmsError>>;

    /// Pull the provider's tracking id out of a successful raw payload.
    ///
    /// The default scans the id keys used across providers.
    fn extract_message_id(&self, raw: &Value) -> Option<String> {
        let object = raw.as_object()?;
        for key in MESSAGE_ID_KEYS {
            match object.get(*key) {
                Some(Value::String(id)) => return Some(id.clone()),
                Some(Value::Number(id)) => return Some(id.to_string()),
                _ => {}
            }
        }
        None
    }

    /// Billed segment count for the message.
    ///
    /// Default policy: resolved content of up to 70 characters bills one
    /// segment; longer messages bill `ceil((chars - 3) / 67)` segments.
    fn calculate_fee(&self, message: &Message) -> u32 {
        let length = message
            .content(self.name())
            .map(|content| content.chars().count())
            .unwrap_or(0);
        if length <= 70 {
            1
        } else {
            (length - 3).div_ceil(67) as u32
        }
    }

    /// Run one attempt and normalize it into a [`Response`].
    ///
    /// Validates the configuration, performs the call, and on success builds
    /// a success response with the extracted id, the computed fee, the
    /// current timestamp, and the raw payload. Gateway errors keep their
    /// provider code; anything else is reported under
    /// [`UNKNOWN_ERROR_CODE`].
    fn send<'a>(
        &'a self,
        to: &'a PhoneNumber,
        message: &'a Message,
        config: &'a GatewayConfig,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let phone = to.international();

            if let Err(err) = self.validate_config(config) {
                return failure_response(self.name(), &phone, err);
            }

            match self.perform_send(to, message, config).await {
                Ok(raw) => {
                    let message_id = self.extract_message_id(&raw);
                    let fee = self.calculate_fee(message);
                    Response::success(self.name(), phone, message_id, fee, raw)
                }
                Err(err) => failure_response(self.name(), &phone, err),
            }
        })
    }
}

fn failure_response(gateway: &str, phone: &str, err: SmsError) -> Response {
    match err {
        SmsError::Gateway(err) => {
            let error =
                ResponseError::new(err.code(), err.message()).with_details(err.raw().clone());
            let raw = err.raw().clone();
            Response::failure(gateway, phone, error, raw)
        }
        other => {
            let message = other.to_string();
            Response::failure(
                gateway,
                phone,
                ResponseError::new(UNKNOWN_ERROR_CODE, message.as_str()),
                json!({ "error": message }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::GatewayError;

    use super::*;

    struct FakeGateway {
        outcome: Result<Value, fn() -> SmsError>,
        require_app_key: bool,
        calls: Arc<AtomicUsize>,
    }

    impl FakeGateway {
        fn succeeding(raw: Value) -> Self {
            Self {
                outcome: Ok(raw),
                require_app_key: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(outcome: fn() -> SmsError) -> Self {
            Self {
                outcome: Err(outcome),
                require_app_key: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Gateway for FakeGateway {
        fn name(&self) -> &str {
            "fake"
        }

        fn validate_config(&self, config: &GatewayConfig) -> Result<(), SmsError> {
            if self.require_app_key && config.app_key.is_none() {
                return Err(SmsError::missing_field(self.name(), "app_key"));
            }
            Ok(())
        }

        fn perform_send<'a>(
            &'a self,
            _to: &'a PhoneNumber,
            _message: &'a Message,
            _config: &'a GatewayConfig,
        ) -> BoxFuture<'a, Result<Value, SmsError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                match &self.outcome {
                    Ok(raw) => Ok(raw.clone()),
                    Err(outcome) => Err(outcome()),
                }
            })
        }
    }

    fn recipient() -> PhoneNumber {
        PhoneNumber::new("13800138000", "86")
    }

    #[tokio::test]
    async fn wrapper_builds_success_response_from_raw_payload() {
        let gateway = FakeGateway::succeeding(json!({ "msgid": "abc-123", "result": 0 }));
        let response = gateway
            .send(&recipient(), &Message::text("hello"), &GatewayConfig::new())
            .await;

        assert!(response.is_success());
        assert_eq!(response.gateway, "fake");
        assert_eq!(response.phone_number, "+8613800138000");
        assert_eq!(response.message_id.as_deref(), Some("abc-123"));
        assert_eq!(response.fee, Some(1));
        assert!(response.sent_at.is_some());
        assert_eq!(response.raw["result"], 0);
    }

    #[tokio::test]
    async fn wrapper_preserves_gateway_error_code_and_payload() {
        let gateway = FakeGateway::failing(|| {
            GatewayError::new("isv.BUSY", "system busy")
                .with_raw(json!({ "Code": "isv.BUSY" }))
                .into()
        });
        let response = gateway
            .send(&recipient(), &Message::text("hello"), &GatewayConfig::new())
            .await;

        assert!(response.is_failed());
        let error = response.error.as_ref().unwrap();
        assert_eq!(error.code(), "isv.BUSY");
        assert_eq!(error.message(), "system busy");
        assert_eq!(error.details()["Code"], "isv.BUSY");
        assert_eq!(response.raw["Code"], "isv.BUSY");
    }

    #[tokio::test]
    async fn wrapper_maps_other_errors_to_unknown_code() {
        let gateway =
            FakeGateway::failing(|| SmsError::Configuration("endpoint unreachable".to_owned()));
        let response = gateway
            .send(&recipient(), &Message::text("hello"), &GatewayConfig::new())
            .await;

        assert!(response.is_failed());
        let error = response.error.as_ref().unwrap();
        assert_eq!(error.code(), UNKNOWN_ERROR_CODE);
        assert_eq!(
            error.message(),
            "configuration error: endpoint unreachable"
        );
    }

    #[tokio::test]
    async fn invalid_config_fails_before_any_network_attempt() {
        let gateway = FakeGateway {
            require_app_key: true,
            ..FakeGateway::succeeding(json!({}))
        };
        let calls = Arc::clone(&gateway.calls);

        let response = gateway
            .send(&recipient(), &Message::text("hello"), &GatewayConfig::new())
            .await;

        assert!(response.is_failed());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let error = response.error.as_ref().unwrap();
        assert_eq!(error.code(), UNKNOWN_ERROR_CODE);
        assert!(error.message().contains("app_key"));
    }

    #[test]
    fn default_message_id_extraction_scans_known_keys() {
        let gateway = FakeGateway::succeeding(Value::Null);
        assert_eq!(
            gateway.extract_message_id(&json!({ "sid": 4242 })),
            Some("4242".to_owned())
        );
        assert_eq!(
            gateway.extract_message_id(&json!({ "message_id": "m-1" })),
            Some("m-1".to_owned())
        );
        assert_eq!(gateway.extract_message_id(&json!({ "unrelated": "x" })), None);
        assert_eq!(gateway.extract_message_id(&json!("not an object")), None);
    }

    #[test]
    fn default_fee_follows_segment_boundaries() {
        let gateway = FakeGateway::succeeding(Value::Null);
        let cases = [(70, 1), (71, 2), (137, 2), (138, 3)];
        for (length, expected) in cases {
            let message = Message::text("a".repeat(length));
            assert_eq!(gateway.calculate_fee(&message), expected, "length {length}");
        }

        // No content resolves to an empty rendering: one segment.
        assert_eq!(gateway.calculate_fee(&Message::default()), 1);
    }

    #[test]
    fn fee_counts_characters_not_bytes() {
        let gateway = FakeGateway::succeeding(Value::Null);
        let message = Message::text("验".repeat(70));
        assert_eq!(gateway.calculate_fee(&message), 1);
        let message = Message::text("验".repeat(71));
        assert_eq!(gateway.calculate_fee(&message), 2);
    }

    #[test]
    fn fee_uses_content_resolved_for_this_gateway() {
        let gateway = FakeGateway::succeeding(Value::Null);
        let message = Message::default().with_content_fn(|name| {
            if name == "fake" {
                "a".repeat(138)
            } else {
                "short".to_owned()
            }
        });
        assert_eq!(gateway.calculate_fee(&message), 3);
    }
}
