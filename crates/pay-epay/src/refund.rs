//! # Refunds
//!
//! `POST {gateway}/api.php` with a JSON body `{pid, key, trade_no, money}`.
//!
//! `refund` hands back whatever the gateway decoded to. `refund_checked`
//! applies the same `code == 1` rule as the order query.

use crate::config::EpayConfig;
use crate::rejection;
use crate::transport::{GatewayTransport, ReqwestTransport};
use pay_core::{Amount, PaymentError, PaymentResult, RefundResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Serialize)]
struct RefundRequest<'a> {
    pid: &'a str,
    key: &'a str,
    trade_no: &'a str,
    money: String,
}

pub struct RefundClient {
    config: EpayConfig,
    transport: Arc<dyn GatewayTransport>,
}

impl RefundClient {
    pub fn new(config: &EpayConfig) -> PaymentResult<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: &EpayConfig, transport: Arc<dyn GatewayTransport>) -> Self {
        Self {
            config: config.clone(),
            transport,
        }
    }

    /// Request a refund; the decoded response is returned unmodified.
    #[instrument(skip(self, amount), fields(money = %amount))]
    pub async fn refund(&self, trade_no: &str, amount: Amount) -> PaymentResult<RefundResult> {
        self.config.ensure_credentials()?;

        if !amount.is_positive() {
            return Err(PaymentError::InvalidRequest(format!(
                "Refund amount must be positive, got {}",
                amount
            )));
        }

        let url = self.config.api_url();
        let request = RefundRequest {
            pid: &self.config.pid,
            key: &self.config.key,
            trade_no,
            money: amount.to_gateway_string(),
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| PaymentError::Serialization(e.to_string()))?;

        debug!(
            "Requesting refund: url={}, pid={}, trade_no={}, money={}",
            url, request.pid, trade_no, request.money
        );

        let response = self.transport.post_json(&url, &body).await?;

        // Decoded JSON is handed back whatever the status; only a body that
        // is not JSON is treated as a gateway failure.
        let value: serde_json::Value = match serde_json::from_str(&response.body) {
            Ok(value) => value,
            Err(e) if response.is_success() => {
                error!("Undecodable refund response: {}", response.body);
                return Err(PaymentError::Serialization(format!(
                    "Failed to parse refund response: {}",
                    e
                )));
            }
            Err(_) => {
                error!(
                    "Refund request failed: status={}, body={}",
                    response.status, response.body
                );
                return Err(rejection::classify(response.status, &response.body));
            }
        };

        if !response.is_success() {
            warn!("Refund answered HTTP {} with a JSON body", response.status);
        }

        info!("Refund response received: trade_no={}", trade_no);
        Ok(RefundResult(value))
    }

    /// Like `refund`, but a non-success `code` becomes a `GatewayRejection`.
    pub async fn refund_checked(&self, trade_no: &str, amount: Amount) -> PaymentResult<RefundResult> {
        let result = self.refund(trade_no, amount).await?;

        if result.is_success() {
            return Ok(result);
        }

        warn!("Refund rejected: code={:?}, msg={:?}", result.code(), result.message());
        Err(PaymentError::GatewayRejection {
            status: None,
            message: result
                .message()
                .map(String::from)
                .unwrap_or_else(|| "Refund failed".to_string()),
        })
    }
}
