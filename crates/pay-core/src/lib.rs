//! # pay-core
//!
//! Core types and traits for the epay-cart gateway client.
//!
//! This crate provides:
//! - The canonical signer (`sign`, `verify`) shared by outgoing requests and
//!   incoming callbacks
//! - `PaymentOrder`, `Amount`, and `CallbackUrls` for the payment flow
//! - `CallbackPayload`, `OrderQueryResult`, `RefundResult` gateway records
//! - `PaymentStrategy` trait for gateway integrations
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{Amount, PaymentOrder, PaymentStrategy};
//!
//! let order = PaymentOrder::new("ORD-1", Amount::new(9.9), "Pro plan", "https://shop.example");
//! let session = strategy.create_payment(&order).await?;
//!
//! // Redirect user to session.payment_url
//! ```

pub mod callback;
pub mod error;
pub mod order;
pub mod response;
pub mod signing;
pub mod strategy;

// Re-exports for convenience
pub use callback::{CallbackPayload, TRADE_SUCCESS};
pub use error::{PaymentError, PaymentResult};
pub use order::{
    truncate_chars, Amount, CallbackUrls, PaymentOrder, PaymentSession, MAX_PRODUCT_NAME_CHARS,
};
pub use response::{OrderQueryResult, RefundResult, CODE_SUCCESS};
pub use signing::{
    canonical_string, sign, verify, Signature, SignableFieldSet, SIGN_FIELD, SIGN_TYPE_FIELD,
    SIGN_TYPE_MD5,
};
pub use strategy::{BoxedPaymentStrategy, PaymentStrategy};
