//! # Gateway Response Records
//!
//! Decoded responses of the order query and refund endpoints. Status and code
//! fields are gateway-defined; this crate only distinguishes `code == 1`
//! (success) from everything else.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Response code the gateway uses for success
pub const CODE_SUCCESS: i64 = 1;

/// Result of `act=order`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderQueryResult {
    #[serde(deserialize_with = "int_or_string")]
    pub code: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    /// Gateway trade number
    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub trade_no: Option<String>,

    /// Merchant order id
    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub out_trade_no: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,

    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addtime: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endtime: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub money: Option<String>,

    /// Gateway payment status (1 = paid on most deployments)
    #[serde(default, deserialize_with = "opt_int_or_string", skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<String>,

    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl OrderQueryResult {
    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }

    pub fn is_paid(&self) -> bool {
        self.status == Some(1)
    }
}

/// Raw refund response, passed through as decoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefundResult(pub Value);

impl RefundResult {
    /// `code` field, accepting numbers or numeric strings
    pub fn code(&self) -> Option<i64> {
        match self.0.get("code")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.0
            .get("msg")
            .or_else(|| self.0.get("message"))
            .and_then(Value::as_str)
    }

    pub fn is_success(&self) -> bool {
        self.code() == Some(CODE_SUCCESS)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Float(f64),
    Str(String),
}

fn int_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    match IntOrString::deserialize(d)? {
        IntOrString::Int(i) => Ok(i),
        IntOrString::Float(f) => Ok(f as i64),
        IntOrString::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected integer, got {:?}", s))),
    }
}

fn opt_int_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    match Option::<IntOrString>::deserialize(d)? {
        None => Ok(None),
        Some(IntOrString::Int(i)) => Ok(Some(i)),
        Some(IntOrString::Float(f)) => Ok(Some(f as i64)),
        Some(IntOrString::Str(s)) => Ok(s.trim().parse().ok()),
    }
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
