//! # pay-epay
//!
//! EasyPay-compatible gateway integration for epay-cart.
//!
//! This crate provides:
//!
//! 1. **PaymentRequestBuilder** - signed `/pay/submit.php` requests
//!    - MD5 canonical signature over the form fields
//!    - Redirects are not followed; the `Location` header is the payment page
//!    - Gateway errors mapped through an ordered matcher chain
//!
//! 2. **OrderQueryClient** / **RefundClient** - `/api.php` lookups and refunds
//!
//! 3. **Callback verification** - `verify_callback` and handler dispatch for
//!    the asynchronous notification
//!
//! `EpayGateway` bundles all of them behind `pay_core::PaymentStrategy`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_epay::{EpayConfig, EpayGateway};
//! use pay_core::{Amount, PaymentOrder, PaymentStrategy};
//!
//! let config = EpayConfig::from_env()?;
//! let gateway = EpayGateway::new(config)?;
//!
//! let order = PaymentOrder::new("ORD-1", Amount::new(9.9), "Pro plan", "https://shop.example");
//! let session = gateway.create_payment(&order).await?;
//!
//! // Redirect user to session.payment_url
//! ```
//!
//! ## Notifications
//!
//! ```rust,ignore
//! use pay_epay::{dispatch_callback, CallbackHandler};
//!
//! struct Fulfill;
//!
//! impl CallbackHandler for Fulfill {
//!     fn on_trade_success(&self, payload: &CallbackPayload) -> PaymentResult<()> {
//!         // Mark the order paid (idempotently)
//!         Ok(())
//!     }
//! }
//!
//! // In your notify endpoint:
//! let outcome = dispatch_callback(&Fulfill, &payload, &config.key)?;
//! respond(outcome.ack_body());
//! ```

pub mod checkout;
pub mod config;
pub mod gateway;
pub mod query;
pub mod refund;
pub mod rejection;
pub mod transport;
pub mod webhook;

// Re-exports
pub use checkout::{PaymentRequestBuilder, REQUEST_TYPE};
pub use config::EpayConfig;
pub use gateway::{EpayGateway, PROVIDER_NAME};
pub use query::OrderQueryClient;
pub use refund::RefundClient;
pub use transport::{GatewayResponse, GatewayTransport, ReqwestTransport};
pub use webhook::{
    dispatch_callback, dispatch_callback_with, verify_callback, CallbackHandler, CallbackOutcome,
    LoggingCallbackHandler, ACK_FAIL, ACK_SUCCESS,
};
