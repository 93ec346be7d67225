//! # Request Handlers
//!
//! Axum request handlers for the payment API.
//! Checkout, order lookup, refunds and the gateway notification endpoint.

use crate::state::AppState;
use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use pay_core::{Amount, CallbackPayload, PaymentError, PaymentOrder};
use pay_epay::{dispatch_callback_with, CallbackOutcome};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create checkout request
#[derive(Debug, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Merchant order id (generated when omitted)
    #[serde(default)]
    pub order_id: Option<String>,
    /// Amount in major units, e.g. 9.9
    pub amount: f64,
    /// Product name shown on the payment page
    pub product_name: String,
}

/// Create checkout response
#[derive(Debug, Serialize)]
pub struct CreateCheckoutResponse {
    pub order_id: String,
    /// Payment page (redirect user here)
    pub payment_url: String,
    pub provider: String,
}

/// Refund request
#[derive(Debug, Deserialize)]
pub struct CreateRefundRequest {
    /// Gateway trade number
    pub trade_no: String,
    pub amount: f64,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn payment_error_to_response(err: PaymentError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), Json(response))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "epay-cart",
        "provider": state.strategy.provider_name(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a payment and return the gateway payment page
#[instrument(skip(state, request), fields(amount = request.amount))]
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<Json<CreateCheckoutResponse>, ApiError> {
    let order_id = request
        .order_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());

    let order = PaymentOrder::new(
        order_id,
        Amount::new(request.amount),
        &request.product_name,
        &state.config.base_url,
    );

    info!(
        "Creating payment: order={}, money={}, notify_url={}",
        order.order_id, order.amount, order.notify_url
    );

    let session = state.strategy.create_payment(&order).await.map_err(|e| {
        error!("Failed to create payment: {}", e);
        payment_error_to_response(e)
    })?;

    Ok(Json(CreateCheckoutResponse {
        order_id: session.order_id,
        payment_url: session.payment_url,
        provider: session.provider,
    }))
}

/// Look up an order by gateway trade number
#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(trade_no): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.strategy.query_order(&trade_no).await.map_err(|e| {
        error!("Order query failed: {}", e);
        payment_error_to_response(e)
    })?;

    Ok(Json(result))
}

/// Request a refund; the gateway response is returned as-is
#[instrument(skip(state, request), fields(trade_no = %request.trade_no))]
pub async fn create_refund(
    State(state): State<AppState>,
    Json(request): Json<CreateRefundRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .strategy
        .refund(&request.trade_no, Amount::new(request.amount))
        .await
        .map_err(|e| {
            error!("Refund failed: {}", e);
            payment_error_to_response(e)
        })?;

    Ok(Json(result.into_inner()))
}

/// Gateway notification delivered as a query string
pub async fn notify_get(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    handle_notification(&state, params)
}

/// Gateway notification delivered as a form body
pub async fn notify_post(
    State(state): State<AppState>,
    Form(params): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    handle_notification(&state, params)
}

fn handle_notification(state: &AppState, params: HashMap<String, String>) -> (StatusCode, &'static str) {
    let payload = CallbackPayload::from(params);

    let outcome = dispatch_callback_with(state.callbacks.as_ref(), &payload, |p| {
        state.strategy.verify_callback(p)
    });

    match outcome {
        Ok(outcome @ CallbackOutcome::Accepted) => {
            info!(
                "Notification accepted: order={:?}, status={:?}",
                payload.out_trade_no(),
                payload.trade_status()
            );
            (StatusCode::OK, outcome.ack_body())
        }
        Ok(outcome @ CallbackOutcome::Rejected) => (StatusCode::BAD_REQUEST, outcome.ack_body()),
        Err(e) => {
            // withhold the ack so the gateway retries
            warn!("Notification handler failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, CallbackOutcome::Rejected.ack_body())
        }
    }
}

/// Return page the customer lands on after paying
pub async fn checkout_success(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let order_id = params.get("order_id").map(|s| s.as_str()).unwrap_or("unknown");
    Html(format!(r#"
<!DOCTYPE html>
<html>
<head><title>Payment Submitted</title></head>
<body style="font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);">
    <div style="background: white; padding: 60px; border-radius: 16px; text-align: center;">
        <h1>Thank you!</h1>
        <p>Order: <code>{}</code></p>
        <p style="color: #666;">Your order is confirmed as soon as the payment notification arrives.</p>
    </div>
</body>
</html>
"#, escape_html(order_id)))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400);
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
    }

    #[test]
    fn test_payment_error_conversion() {
        let (status, _json) = payment_error_to_response(PaymentError::InvalidRequest("Bad data".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _json) = payment_error_to_response(PaymentError::rejected(200, "签名校验失败"));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>\"x\"</script>"), "&lt;script&gt;&quot;x&quot;&lt;/script&gt;");
        assert_eq!(escape_html("ORD-1"), "ORD-1");
    }
}
