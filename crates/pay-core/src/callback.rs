//! # Callback Payload
//!
//! The field set the gateway sends to `notify_url` when a payment settles.
//! The payload keeps every field exactly as received; typed accessors are
//! views over it. Validity is never stored, it is recomputed by `verify`.

use crate::signing::{self, SignableFieldSet, SIGN_FIELD, SIGN_TYPE_FIELD};
use std::collections::HashMap;

/// Trade status reported for a completed payment
pub const TRADE_SUCCESS: &str = "TRADE_SUCCESS";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackPayload {
    fields: SignableFieldSet,
}

impl CallbackPayload {
    pub fn new(fields: SignableFieldSet) -> Self {
        Self { fields }
    }

    /// Verify the embedded `sign` against the shared secret
    pub fn verify(&self, secret: &str) -> bool {
        signing::verify(&self.fields, secret)
    }

    pub fn fields(&self) -> &SignableFieldSet {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name)
    }

    pub fn pid(&self) -> Option<&str> {
        self.get("pid")
    }

    /// Gateway trade number
    pub fn trade_no(&self) -> Option<&str> {
        self.get("trade_no")
    }

    /// Merchant order id
    pub fn out_trade_no(&self) -> Option<&str> {
        self.get("out_trade_no")
    }

    pub fn payment_type(&self) -> Option<&str> {
        self.get("type")
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    pub fn money(&self) -> Option<&str> {
        self.get("money")
    }

    pub fn trade_status(&self) -> Option<&str> {
        self.get("trade_status")
    }

    pub fn sign(&self) -> Option<&str> {
        self.get(SIGN_FIELD)
    }

    pub fn sign_type(&self) -> Option<&str> {
        self.get(SIGN_TYPE_FIELD)
    }

    pub fn is_trade_success(&self) -> bool {
        self.trade_status() == Some(TRADE_SUCCESS)
    }
}

impl From<SignableFieldSet> for CallbackPayload {
    fn from(fields: SignableFieldSet) -> Self {
        Self::new(fields)
    }
}

impl From<HashMap<String, String>> for CallbackPayload {
    fn from(map: HashMap<String, String>) -> Self {
        Self::new(map.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CallbackPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::{sign, SIGN_TYPE_MD5};

    fn notification(secret: &str) -> CallbackPayload {
        let fields = SignableFieldSet::new()
            .with("pid", "1001")
            .with("trade_no", "2024010112000012345")
            .with("out_trade_no", "ORD-1")
            .with("type", "alipay")
            .with("name", "Pro plan")
            .with("money", "9.90")
            .with("trade_status", TRADE_SUCCESS);
        let sig = sign(&fields, secret);

        fields
            .with(SIGN_FIELD, sig.into_string())
            .with(SIGN_TYPE_FIELD, SIGN_TYPE_MD5)
            .into()
    }

    #[test]
    fn test_accessors() {
        let payload = notification("k");

        assert_eq!(payload.out_trade_no(), Some("ORD-1"));
        assert_eq!(payload.trade_no(), Some("2024010112000012345"));
        assert_eq!(payload.money(), Some("9.90"));
        assert_eq!(payload.sign_type(), Some("MD5"));
        assert!(payload.is_trade_success());
    }

    #[test]
    fn test_verify_from_query_map() {
        let payload = notification("k");
        let map: HashMap<String, String> = payload.fields().to_pairs().into_iter().collect();

        let rebuilt = CallbackPayload::from(map);
        assert!(rebuilt.verify("k"));
        assert!(!rebuilt.verify("wrong"));
    }

    #[test]
    fn test_forged_amount_rejected() {
        let payload = notification("k");
        let mut fields = payload.fields().clone();
        fields.set("money", Some("0.01".to_string()));

        assert!(!CallbackPayload::new(fields).verify("k"));
    }
}
