//! # Gateway Transport
//!
//! The HTTP exchange with the gateway, behind a trait so the request builder
//! and the query/refund clients can be driven by a mock server or a stub.
//!
//! Redirects are never followed: the payment page URL *is* the `Location`
//! header of the submit response.

use async_trait::async_trait;
use pay_core::{PaymentError, PaymentResult};
use reqwest::header::LOCATION;
use reqwest::{redirect, Client, Response};
use std::time::Duration;
use tracing::debug;

/// What the gateway answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    pub status: u16,
    /// `Location` header, if any
    pub location: Option<String>,
    pub body: String,
}

impl GatewayResponse {
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait GatewayTransport: Send + Sync {
    /// `application/x-www-form-urlencoded` POST
    async fn post_form(&self, url: &str, form: &[(String, String)]) -> PaymentResult<GatewayResponse>;

    /// GET with a query string
    async fn get(&self, url: &str, query: &[(String, String)]) -> PaymentResult<GatewayResponse>;

    /// `application/json` POST
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> PaymentResult<GatewayResponse>;
}

/// reqwest-backed transport with redirects disabled and a bounded timeout
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Wrap an existing client. It must not follow redirects.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn read(response: Response) -> PaymentResult<GatewayResponse> {
        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = response.text().await.map_err(transport_error)?;

        debug!("Gateway responded: status={}, location={:?}", status, location);

        Ok(GatewayResponse {
            status,
            location,
            body,
        })
    }
}

#[async_trait]
impl GatewayTransport for ReqwestTransport {
    async fn post_form(&self, url: &str, form: &[(String, String)]) -> PaymentResult<GatewayResponse> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;

        Self::read(response).await
    }

    async fn get(&self, url: &str, query: &[(String, String)]) -> PaymentResult<GatewayResponse> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        Self::read(response).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> PaymentResult<GatewayResponse> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        Self::read(response).await
    }
}

fn transport_error(e: reqwest::Error) -> PaymentError {
    if e.is_timeout() {
        PaymentError::Transport(format!("Gateway request timed out: {}", e))
    } else {
        PaymentError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_redirect_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pay/submit.php"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("out_trade_no=ORD-1"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("{}/elsewhere", server.uri())),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let form = vec![("out_trade_no".to_string(), "ORD-1".to_string())];
        let response = transport
            .post_form(&format!("{}/pay/submit.php", server.uri()), &form)
            .await
            .unwrap();

        assert_eq!(response.status, 302);
        assert!(response.is_redirect());
        assert_eq!(
            response.location,
            Some(format!("{}/elsewhere", server.uri()))
        );
    }

    #[tokio::test]
    async fn test_get_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api.php"))
            .and(query_param("act", "order"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"code\":1}"))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let query = vec![("act".to_string(), "order".to_string())];
        let response = transport
            .get(&format!("{}/api.php", server.uri()), &query)
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.body, "{\"code\":1}");
        assert_eq!(response.location, None);
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_millis(50)).unwrap();
        let err = transport
            .post_json(&format!("{}/api.php", server.uri()), &serde_json::json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Transport(_)));
        assert!(err.is_retryable());
    }
}
