//! # Order Query
//!
//! `GET {gateway}/api.php?act=order&pid=&key=&trade_no=`
//!
//! No signing: the endpoint authenticates with the merchant key sent as a
//! plain parameter.

use crate::config::EpayConfig;
use crate::rejection;
use crate::transport::{GatewayTransport, ReqwestTransport};
use pay_core::{OrderQueryResult, PaymentError, PaymentResult};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub struct OrderQueryClient {
    config: EpayConfig,
    transport: Arc<dyn GatewayTransport>,
}

impl OrderQueryClient {
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

    /// Look up an order by gateway trade number.
    ///
    /// `code == 1` returns the parsed record unchanged; any other code is a
    /// `GatewayRejection` carrying the gateway message.
    #[instrument(skip(self))]
    pub async fn query(&self, trade_no: &str) -> PaymentResult<OrderQueryResult> {
        self.config.ensure_credentials()?;

        let url = self.config.api_url();
        let params = vec![
            ("act".to_string(), "order".to_string()),
            ("pid".to_string(), self.config.pid.clone()),
            ("key".to_string(), self.config.key.clone()),
            ("trade_no".to_string(), trade_no.to_string()),
        ];

        debug!(
            "Querying order: url={}, pid={}, trade_no={}",
            url, self.config.pid, trade_no
        );

        let response = self.transport.get(&url, &params).await?;

        if !response.is_success() {
            error!(
                "Order query failed: status={}, body={}",
                response.status, response.body
            );
            return Err(rejection::classify(response.status, &response.body));
        }

        let result: OrderQueryResult = serde_json::from_str(&response.body).map_err(|e| {
            error!("Undecodable order query response: {}", response.body);
            PaymentError::Serialization(format!("Failed to parse order query response: {}", e))
        })?;

        if !result.is_success() {
            warn!("Order query rejected: code={}, msg={:?}", result.code, result.msg);
            return Err(PaymentError::GatewayRejection {
                status: None,
                message: result
                    .msg
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| format!("Order query failed with code {}", result.code)),
            });
        }

        info!("Order query ok: trade_no={}, status={:?}", trade_no, result.status);
        Ok(result)
    }
}
