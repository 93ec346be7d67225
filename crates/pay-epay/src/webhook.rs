//! # Gateway Notifications
//!
//! Verification and dispatch of the asynchronous callback the gateway sends
//! to `notify_url`. A callback whose signature does not verify never reaches
//! a handler.
//!
//! The gateway keeps re-sending a notification until it reads [`ACK_SUCCESS`]
//! as the response body, so handlers must tolerate duplicates for the same
//! order.

use pay_core::{CallbackPayload, PaymentResult};
use tracing::{debug, info, warn};

/// Body that acknowledges a notification
pub const ACK_SUCCESS: &str = "success";

/// Body that refuses a notification
pub const ACK_FAIL: &str = "fail";

/// Check a callback's signature against the merchant key.
pub fn verify_callback(payload: &CallbackPayload, secret: &str) -> bool {
    payload.verify(secret)
}

/// What happened to a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Signature matched and the handler accepted it
    Accepted,
    /// Signature missing or mismatched; handler not invoked
    Rejected,
}

impl CallbackOutcome {
    /// Response body for the gateway
    pub fn ack_body(&self) -> &'static str {
        match self {
            CallbackOutcome::Accepted => ACK_SUCCESS,
            CallbackOutcome::Rejected => ACK_FAIL,
        }
    }
}

/// Notification handler trait
///
/// Implement this trait to fulfill orders. Only verified callbacks arrive here.
#[allow(unused_variables)]
pub trait CallbackHandler: Send + Sync {
    /// Called when `trade_status` is `TRADE_SUCCESS`
    fn on_trade_success(&self, payload: &CallbackPayload) -> PaymentResult<()> {
        info!(
            "Payment completed: order={:?}, trade_no={:?}, money={:?}",
            payload.out_trade_no(),
            payload.trade_no(),
            payload.money()
        );
        Ok(())
    }

    /// Called for any other trade status
    fn on_other_status(&self, payload: &CallbackPayload) -> PaymentResult<()> {
        debug!(
            "Unhandled trade status {:?} for order {:?}",
            payload.trade_status(),
            payload.out_trade_no()
        );
        Ok(())
    }
}

/// Default handler (just logs notifications)
pub struct LoggingCallbackHandler;

impl CallbackHandler for LoggingCallbackHandler {}

/// Verify a notification and route it to the handler.
///
/// Handler errors propagate so the caller can withhold the acknowledgement
/// and let the gateway retry.
pub fn dispatch_callback(
    handler: &dyn CallbackHandler,
    payload: &CallbackPayload,
    secret: &str,
) -> PaymentResult<CallbackOutcome> {
    dispatch_callback_with(handler, payload, |p| verify_callback(p, secret))
}

/// Same as `dispatch_callback`, with the signature check supplied by the
/// caller (e.g. `PaymentStrategy::verify_callback`).
pub fn dispatch_callback_with<V>(
    handler: &dyn CallbackHandler,
    payload: &CallbackPayload,
    verify: V,
) -> PaymentResult<CallbackOutcome>
where
    V: FnOnce(&CallbackPayload) -> bool,
{
    if !verify(payload) {
        warn!(
            "Rejected notification with bad signature: order={:?}, trade_no={:?}",
            payload.out_trade_no(),
            payload.trade_no()
        );
        return Ok(CallbackOutcome::Rejected);
    }

    if payload.is_trade_success() {
        handler.on_trade_success(payload)?;
    } else {
        handler.on_other_status(payload)?;
    }

    Ok(CallbackOutcome::Accepted)
}
