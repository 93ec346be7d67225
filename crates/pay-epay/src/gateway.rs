//! # EasyPay Strategy
//!
//! `PaymentStrategy` implementation composing the request builder, the
//! query/refund clients and the callback verifier over one shared transport.

use crate::checkout::PaymentRequestBuilder;
use crate::config::EpayConfig;
use crate::query::OrderQueryClient;
use crate::refund::RefundClient;
use crate::transport::{GatewayTransport, ReqwestTransport};
use crate::webhook::verify_callback;
use async_trait::async_trait;
use pay_core::{
    Amount, CallbackPayload, OrderQueryResult, PaymentOrder, PaymentResult, PaymentSession,
    PaymentStrategy, RefundResult,
};
use std::sync::Arc;
use tracing::instrument;

pub const PROVIDER_NAME: &str = "epay";

pub struct EpayGateway {
    config: EpayConfig,
    checkout: PaymentRequestBuilder,
    query: OrderQueryClient,
    refunds: RefundClient,
}

impl EpayGateway {
    /// Create a gateway with the default reqwest transport
    pub fn new(config: EpayConfig) -> PaymentResult<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = EpayConfig::from_env()?;
        Self::new(config)
    }

    pub fn with_transport(config: EpayConfig, transport: Arc<dyn GatewayTransport>) -> Self {
        Self {
            checkout: PaymentRequestBuilder::with_transport(&config, transport.clone()),
            query: OrderQueryClient::with_transport(&config, transport.clone()),
            refunds: RefundClient::with_transport(&config, transport),
            config,
        }
    }

    pub fn config(&self) -> &EpayConfig {
        &self.config
    }

    pub fn refunds(&self) -> &RefundClient {
        &self.refunds
    }
}

#[async_trait]
impl PaymentStrategy for EpayGateway {
    #[instrument(skip(self, order), fields(order_id = %order.order_id))]
    async fn create_payment(&self, order: &PaymentOrder) -> PaymentResult<PaymentSession> {
        let payment_url = self.checkout.submit(order).await?;
        Ok(PaymentSession::new(&order.order_id, PROVIDER_NAME, payment_url))
    }

    fn verify_callback(&self, payload: &CallbackPayload) -> bool {
        verify_callback(payload, &self.config.key)
    }

    async fn query_order(&self, trade_no: &str) -> PaymentResult<OrderQueryResult> {
        self.query.query(trade_no).await
    }

    async fn refund(&self, trade_no: &str, amount: Amount) -> PaymentResult<RefundResult> {
        self.refunds.refund(trade_no, amount).await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
