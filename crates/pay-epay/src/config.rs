//! # EasyPay Configuration
//!
//! Configuration for the gateway integration.
//! Built once at process start (usually via `from_env`) and passed by
//! reference into the request builder and the query/refund clients.

use pay_core::PaymentError;
use std::env;
use std::fmt;
use std::time::Duration;

/// Default gateway address when `EPAY_API_URL` is not set
pub const DEFAULT_API_URL: &str = "https://epay.example.com";

/// Payment submission endpoint, relative to the gateway root
pub const SUBMIT_PATH: &str = "/pay/submit.php";

/// Query/refund endpoint, relative to the gateway root
pub const API_PATH: &str = "/api.php";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gateway configuration
#[derive(Clone)]
pub struct EpayConfig {
    /// Merchant / partner id (`pid`)
    pub pid: String,

    /// Shared merchant key. Mixed into signatures, sent in plain only to the
    /// query/refund API.
    pub key: String,

    /// Gateway base URL (for testing/mocking)
    pub api_base_url: String,

    /// Bound on each gateway round trip
    pub timeout: Duration,
}

impl EpayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `EPAY_PID`
    /// - `EPAY_KEY`
    ///
    /// Optional:
    /// - `EPAY_API_URL` (defaults to [`DEFAULT_API_URL`])
    /// - `EPAY_TIMEOUT_SECS` (defaults to 30)
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; `from_env` delegates here.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PaymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| PaymentError::Configuration(format!("{} not set", name)))
        };

        let pid = required("EPAY_PID")?;
        let key = required("EPAY_KEY")?;

        let api_base_url = lookup("EPAY_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(PaymentError::Configuration(
                "EPAY_API_URL must start with http:// or https://".to_string(),
            ));
        }

        let timeout = match lookup("EPAY_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    PaymentError::Configuration(format!(
                        "EPAY_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                        raw
                    ))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            pid,
            key,
            api_base_url,
            timeout,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(pid: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            pid: pid.into(),
            key: key.into(),
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builder: set custom gateway base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fail unless both merchant id and key are present.
    pub fn ensure_credentials(&self) -> Result<(), PaymentError> {
        if self.pid.trim().is_empty() {
            return Err(PaymentError::Configuration("EPAY_PID not set".to_string()));
        }
        if self.key.trim().is_empty() {
            return Err(PaymentError::Configuration("EPAY_KEY not set".to_string()));
        }
        Ok(())
    }

    /// Submission URL: base without trailing slashes, ending in `/pay/submit.php`
    pub fn submit_url(&self) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        if base.ends_with(SUBMIT_PATH) {
            base.to_string()
        } else {
            format!("{}{}", base, SUBMIT_PATH)
        }
    }

    /// Query/refund URL at the gateway root
    pub fn api_url(&self) -> String {
        format!("{}{}", self.gateway_root(), API_PATH)
    }

    /// Base URL with trailing slashes and any endpoint suffix removed
    pub fn gateway_root(&self) -> &str {
        let base = self.api_base_url.trim_end_matches('/');
        base.strip_suffix(SUBMIT_PATH)
            .or_else(|| base.strip_suffix(API_PATH))
            .unwrap_or(base)
            .trim_end_matches('/')
    }
}

impl fmt::Debug for EpayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EpayConfig")
            .field("pid", &self.pid)
            .field("key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
