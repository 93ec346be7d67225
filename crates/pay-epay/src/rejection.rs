//! # Gateway Rejection Parsing
//!
//! Turns a failing gateway response into exactly one `PaymentError`.
//!
//! Matchers run in order; the first one that recognizes the body wins:
//!
//! 1. JSON body carrying `msg` / `message`
//! 2. Known literal error strings the gateway embeds in HTML pages
//! 3. Generic message with the HTTP status (always matches)
//!
//! New gateway strings go into [`KNOWN_REJECTIONS`].

use pay_core::PaymentError;
use serde_json::Value;

/// Literal body fragment → diagnostic shown to the caller
pub struct KnownRejection {
    pub needle: &'static str,
    pub message: &'static str,
}

/// Known error strings, checked in order
pub const KNOWN_REJECTIONS: &[KnownRejection] = &[
    KnownRejection {
        needle: "签名校验失败",
        message: "Signature verification failed: check that EPAY_KEY matches the merchant key configured at the gateway",
    },
    KnownRejection {
        needle: "不支持的请求类型",
        message: "Unsupported request type: the gateway does not accept type=epay for this merchant",
    },
];

type Matcher = fn(u16, &str) -> Option<String>;

const MATCHERS: &[Matcher] = &[json_message, known_substring];

/// Map a failing response to a `GatewayRejection`.
pub fn classify(status: u16, body: &str) -> PaymentError {
    let message = MATCHERS
        .iter()
        .find_map(|matcher| matcher(status, body))
        .unwrap_or_else(|| generic(status));

    PaymentError::rejected(status, message)
}

fn json_message(_status: u16, body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body.trim()).ok()?;
    let msg = value
        .get("msg")
        .or_else(|| value.get("message"))
        .or_else(|| value.get("error"))?;

    match msg {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Null => None,
        Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

fn known_substring(_status: u16, body: &str) -> Option<String> {
    KNOWN_REJECTIONS
        .iter()
        .find(|k| body.contains(k.needle))
        .map(|k| k.message.to_string())
}

fn generic(status: u16) -> String {
    format!("Payment request failed with HTTP status {}", status)
}
