//! # Payment Strategy Trait
//!
//! The seam between the HTTP service and a concrete gateway integration.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PaymentStrategy (trait)                  │
//! │  ├── create_payment()      signed submit → payment URL      │
//! │  ├── verify_callback()     notify payload → bool            │
//! │  ├── query_order()         trade_no → OrderQueryResult      │
//! │  ├── refund()              trade_no, amount → RefundResult  │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                    ┌───────┴───────┐
//!                    │  EpayGateway  │
//!                    └───────────────┘
//! ```

use crate::callback::CallbackPayload;
use crate::error::PaymentResult;
use crate::order::{Amount, PaymentOrder, PaymentSession};
use crate::response::{OrderQueryResult, RefundResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for gateway integrations.
///
/// Every method is a single request/response cycle; implementations hold no
/// per-order state.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Submit a signed payment request and return the payment page.
    ///
    /// # Arguments
    /// * `order` - The order to pay, callback URLs already derived
    ///
    /// # Returns
    /// A `PaymentSession` whose `payment_url` the customer is sent to.
    async fn create_payment(&self, order: &PaymentOrder) -> PaymentResult<PaymentSession>;

    /// Check a notification's signature. `false` means reject and do not fulfill.
    fn verify_callback(&self, payload: &CallbackPayload) -> bool;

    /// Look up an order by gateway trade number.
    async fn query_order(&self, trade_no: &str) -> PaymentResult<OrderQueryResult>;

    /// Request a refund. The gateway response is returned as decoded.
    async fn refund(&self, trade_no: &str, amount: Amount) -> PaymentResult<RefundResult>;

    /// Get the provider name (for logging and routing).
    fn provider_name(&self) -> &'static str;

    /// Path the gateway notifies.
    /// Default: `/webhook/{provider_name}/notify`
    fn callback_path(&self) -> String {
        format!("/webhook/{}/notify", self.provider_name())
    }
}

/// Type alias for a boxed payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentError;

    struct Offline;

    #[async_trait]
    impl PaymentStrategy for Offline {
        async fn create_payment(&self, order: &PaymentOrder) -> PaymentResult<PaymentSession> {
            Ok(PaymentSession::new(&order.order_id, "offline", "https://pay.example/x"))
        }

        fn verify_callback(&self, payload: &CallbackPayload) -> bool {
            payload.verify("k")
        }

        async fn query_order(&self, _trade_no: &str) -> PaymentResult<OrderQueryResult> {
            Err(PaymentError::Transport("offline".into()))
        }

        async fn refund(&self, _trade_no: &str, _amount: Amount) -> PaymentResult<RefundResult> {
            Err(PaymentError::Transport("offline".into()))
        }

        fn provider_name(&self) -> &'static str {
            "offline"
        }
    }

    #[test]
    fn test_default_callback_path() {
        assert_eq!(Offline.callback_path(), "/webhook/offline/notify");
    }

    #[tokio::test]
    async fn test_boxed_dispatch() {
        let strategy: BoxedPaymentStrategy = Arc::new(Offline);
        let order = PaymentOrder::new("ORD-1", Amount::new(1.0), "p", "https://shop.example");

        let session = strategy.create_payment(&order).await.unwrap();
        assert_eq!(session.payment_url, "https://pay.example/x");
        assert!(strategy.query_order("T1").await.unwrap_err().is_retryable());
    }
}
