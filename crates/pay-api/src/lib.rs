//! # pay-api
//!
//! HTTP API layer for epay-cart.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for checkout, order lookup and refunds
//! - The gateway notification endpoint
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/checkout` | Create payment, returns payment page URL |
//! | GET | `/api/v1/orders/{trade_no}` | Query order |
//! | POST | `/api/v1/refunds` | Request refund |
//! | GET, POST | `/webhook/epay/notify` | Gateway notification |
//! | GET | `/checkout/success` | Return page |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
