//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the gateway strategy, the notification handler and configuration.

use pay_core::BoxedPaymentStrategy;
use pay_epay::{CallbackHandler, EpayConfig, EpayGateway, LoggingCallbackHandler};
use std::net::SocketAddr;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL; notify/return URLs are derived from it
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Gateway integration
    pub strategy: BoxedPaymentStrategy,
    /// Receives verified notifications
    pub callbacks: Arc<dyn CallbackHandler>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState with the EasyPay gateway configured from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let epay_config = EpayConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize EasyPay: {}", e))?;
        tracing::info!("Gateway: {}", epay_config.gateway_root());

        let gateway = EpayGateway::new(epay_config)
            .map_err(|e| anyhow::anyhow!("Failed to initialize EasyPay: {}", e))?;

        Ok(Self::with_strategy(
            config,
            Arc::new(gateway),
            Arc::new(LoggingCallbackHandler),
        ))
    }

    /// Assemble state from explicit parts (tests, embedding)
    pub fn with_strategy(
        config: AppConfig,
        strategy: BoxedPaymentStrategy,
        callbacks: Arc<dyn CallbackHandler>,
    ) -> Self {
        Self {
            strategy,
            callbacks,
            config,
        }
    }
}
