//! # epay-cart
//!
//! Checkout service in front of an EasyPay-compatible gateway.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export EPAY_API_URL=https://pay.example.com
//! export EPAY_PID=1001
//! export EPAY_KEY=...
//! export BASE_URL=https://shop.example.com
//!
//! # Run the server
//! epay-cart
//! ```

use pay_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.strategy.provider_name());
    info!("Public base URL: {}", state.config.base_url);

    let app = routes::create_router(state);

    info!("epay-cart starting on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Checkout: POST http://{}/api/v1/checkout", addr);
        info!("Notify: http://{}/webhook/epay/notify", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  epay-cart
  ━━━━━━━━━━━━━━━━━━━━━━━
  EasyPay checkout service
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
