//! # Payment Submission
//!
//! Builds the signed field set for a new order, submits it to
//! `/pay/submit.php` and returns the payment page URL from the redirect.

use crate::config::EpayConfig;
use crate::rejection;
use crate::transport::{GatewayTransport, ReqwestTransport};
use pay_core::{
    sign, truncate_chars, Amount, PaymentError, PaymentOrder, PaymentResult, SignableFieldSet,
    MAX_PRODUCT_NAME_CHARS, SIGN_FIELD, SIGN_TYPE_FIELD, SIGN_TYPE_MD5,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Request type tag sent as `type`
pub const REQUEST_TYPE: &str = "epay";

/// Signs and submits payment requests
pub struct PaymentRequestBuilder {
    config: EpayConfig,
    transport: Arc<dyn GatewayTransport>,
}

impl PaymentRequestBuilder {
    /// Create a builder with the default reqwest transport
    pub fn new(config: &EpayConfig) -> PaymentResult<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a builder over a caller-supplied transport
    pub fn with_transport(config: &EpayConfig, transport: Arc<dyn GatewayTransport>) -> Self {
        Self {
            config: config.clone(),
            transport,
        }
    }

    /// Unsigned field set for an order. The name limit is applied here too,
    /// since `PaymentOrder` fields are public.
    fn build_fields(&self, order: &PaymentOrder) -> SignableFieldSet {
        SignableFieldSet::new()
            .with("pid", &self.config.pid)
            .with("type", REQUEST_TYPE)
            .with("out_trade_no", &order.order_id)
            .with(
                "name",
                truncate_chars(&order.product_name, MAX_PRODUCT_NAME_CHARS),
            )
            .with("money", order.amount.to_gateway_string())
            .with("notify_url", &order.notify_url)
            .with("return_url", &order.return_url)
    }

    /// The complete submission payload: fields plus `sign` and `sign_type`.
    pub fn build_payload(&self, order: &PaymentOrder) -> PaymentResult<SignableFieldSet> {
        self.config.ensure_credentials()?;
        order.validate()?;

        let fields = self.build_fields(order);
        let signature = sign(&fields, &self.config.key);

        Ok(fields
            .with(SIGN_FIELD, signature.into_string())
            .with(SIGN_TYPE_FIELD, SIGN_TYPE_MD5))
    }

    /// Submit a payment request and return the payment page URL.
    #[instrument(skip(self, order), fields(order_id = %order.order_id))]
    pub async fn submit(&self, order: &PaymentOrder) -> PaymentResult<String> {
        let payload = self.build_payload(order)?;
        let url = self.config.submit_url();
        let form = payload.to_pairs();

        info!("Submitting payment request to {}", url);
        debug!("Payment request params: {:?}", form);

        let response = self.transport.post_form(&url, &form).await?;

        if response.is_redirect() {
            return match response.location {
                Some(location) => {
                    info!("Payment page created: {}", location);
                    Ok(location)
                }
                None => {
                    error!(
                        "Gateway redirected without Location: status={}",
                        response.status
                    );
                    Err(PaymentError::ProtocolViolation(format!(
                        "Gateway answered HTTP {} without a Location header",
                        response.status
                    )))
                }
            };
        }

        error!(
            "Gateway error: status={}, body={}",
            response.status, response.body
        );
        Err(rejection::classify(response.status, &response.body))
    }

    /// Convenience: build the order from raw inputs and submit it.
    pub async fn create_payment(
        &self,
        order_id: &str,
        amount: Amount,
        product_name: &str,
        site_url: &str,
    ) -> PaymentResult<String> {
        let order = PaymentOrder::new(order_id, amount, product_name, site_url);
        self.submit(&order).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pay_core::verify;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn order() -> PaymentOrder {
        PaymentOrder::new("ORD-1", Amount::new(10.0), "Pro plan", "https://shop.example")
    }

    fn builder(server: &MockServer) -> PaymentRequestBuilder {
        let config = EpayConfig::new("1001", "merchant-key").with_api_base_url(server.uri());
        PaymentRequestBuilder::new(&config).unwrap()
    }

    #[test]
    fn test_payload_fields() {
        let config = EpayConfig::new("1001", "merchant-key");
        let builder = PaymentRequestBuilder::new(&config).unwrap();
        let payload = builder.build_payload(&order()).unwrap();

        assert_eq!(payload.get("pid"), Some("1001"));
        assert_eq!(payload.get("type"), Some("epay"));
        assert_eq!(payload.get("out_trade_no"), Some("ORD-1"));
        assert_eq!(payload.get("money"), Some("10.00"));
        assert_eq!(
            payload.get("notify_url"),
            Some("https://shop.example/webhook/epay/notify")
        );
        assert_eq!(
            payload.get("return_url"),
            Some("https://shop.example/checkout/success?order_id=ORD-1")
        );
        assert_eq!(payload.get("sign_type"), Some("MD5"));
        assert_eq!(payload.get("sign").map(str::len), Some(32));
        assert!(verify(&payload, "merchant-key"));
    }

    #[test]
    fn test_long_name_truncated_before_signing() {
        let config = EpayConfig::new("1001", "merchant-key");
        let builder = PaymentRequestBuilder::new(&config).unwrap();
        let order = PaymentOrder::new("ORD-1", Amount::new(1.0), "n".repeat(100), "https://s");
        let payload = builder.build_payload(&order).unwrap();

        assert_eq!(payload.get("name"), Some("n".repeat(64).as_str()));
        assert!(verify(&payload, "merchant-key"));
    }

    #[test]
    fn test_name_truncated_when_order_mutated() {
        let config = EpayConfig::new("1001", "merchant-key");
        let builder = PaymentRequestBuilder::new(&config).unwrap();
        let mut order = order();
        order.product_name = "n".repeat(100);

        let payload = builder.build_payload(&order).unwrap();

        assert_eq!(payload.get("name").map(|n| n.chars().count()), Some(64));
        assert!(verify(&payload, "merchant-key"));
    }

    #[test]
    fn test_name_truncated_when_order_deserialized() {
        let config = EpayConfig::new("1001", "merchant-key");
        let builder = PaymentRequestBuilder::new(&config).unwrap();
        let mut value = serde_json::to_value(order()).unwrap();
        value["product_name"] = serde_json::Value::String("会".repeat(80));
        let order: PaymentOrder = serde_json::from_value(value).unwrap();

        let payload = builder.build_payload(&order).unwrap();

        assert_eq!(payload.get("name"), Some("会".repeat(64).as_str()));
    }

    #[tokio::test]
    async fn test_redirect_returns_location() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pay/submit.php"))
            .and(body_string_contains("sign_type=MD5"))
            .and(body_string_contains("money=10.00"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "https://pay.example/x"))
            .expect(1)
            .mount(&server)
            .await;

        let url = builder(&server).submit(&order()).await.unwrap();
        assert_eq!(url, "https://pay.example/x");
    }

    #[tokio::test]
    async fn test_redirect_without_location() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(302))
            .mount(&server)
            .await;

        let err = builder(&server).submit(&order()).await.unwrap_err();
        assert!(matches!(err, PaymentError::ProtocolViolation(_)));
    }

    #[tokio::test]
    async fn test_signature_failure_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><h3>签名校验失败！</h3></html>"),
            )
            .mount(&server)
            .await;

        let err = builder(&server).submit(&order()).await.unwrap_err();
        match err {
            PaymentError::GatewayRejection { status, message } => {
                assert_eq!(status, Some(200));
                assert!(message.starts_with("Signature verification failed"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_json_error_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"code":-1,"msg":"商户不存在"}"#),
            )
            .mount(&server)
            .await;

        let err = builder(&server).submit(&order()).await.unwrap_err();
        assert_eq!(err.to_string(), "Gateway rejected request (HTTP 400): 商户不存在");
    }

    #[tokio::test]
    async fn test_generic_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let err = builder(&server).submit(&order()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Gateway rejected request (HTTP 500): Payment request failed with HTTP status 500"
        );
    }

    #[tokio::test]
    async fn test_missing_credentials_never_hit_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "https://pay.example/x"))
            .expect(0)
            .mount(&server)
            .await;

        let config = EpayConfig::new("", "merchant-key").with_api_base_url(server.uri());
        let err = PaymentRequestBuilder::new(&config)
            .unwrap()
            .submit(&order())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_create_payment_from_raw_inputs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("out_trade_no=ORD-9"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "https://pay.example/y"))
            .expect(1)
            .mount(&server)
            .await;

        let url = builder(&server)
            .create_payment("ORD-9", Amount::new(1.5), "Pro plan", "https://shop.example/")
            .await
            .unwrap();
        assert_eq!(url, "https://pay.example/y");
    }
}
