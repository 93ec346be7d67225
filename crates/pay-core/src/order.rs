//! # Order Types
//!
//! Per-request value types for the payment flow: the amount, the order being
//! paid, the callback URLs handed to the gateway and the session returned to
//! the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PaymentError;

/// Gateway limit on the product name, in characters
pub const MAX_PRODUCT_NAME_CHARS: usize = 64;

/// Money amount in the smallest unit (cents).
///
/// Rendered for the gateway as a fixed two-decimal string, e.g. `"10.00"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount {
    cents: i64,
}

impl Amount {
    /// Create an amount from a decimal value, rounded to the nearest cent
    pub fn new(amount: f64) -> Self {
        Self {
            cents: (amount * 100.0).round() as i64,
        }
    }

    /// Create an amount from cents
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    pub fn cents(&self) -> i64 {
        self.cents
    }

    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Two-decimal fixed rendering used in signed fields
    pub fn to_gateway_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Amount {
    type Err = PaymentError;

    /// Parse a decimal string with at most two fraction digits ("10", "9.9", "9.90")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PaymentError::InvalidRequest(format!("Invalid amount: {:?}", s));

        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty()
            || frac.len() > 2
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(invalid)?;

        Ok(Self {
            cents: if negative { -cents } else { cents },
        })
    }
}

/// Notify/return URLs derived from the merchant site URL
#[derive(Debug, Clone)]
pub struct CallbackUrls {
    /// Base URL of the merchant site (e.g., "https://shop.example")
    pub site_url: String,
    /// Server-to-server notification path
    pub notify_path: String,
    /// Browser return page path
    pub return_path: String,
}

impl CallbackUrls {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into().trim_end_matches('/').to_string(),
            notify_path: "/webhook/epay/notify".to_string(),
            return_path: "/checkout/success".to_string(),
        }
    }

    pub fn notify_url(&self) -> String {
        format!("{}{}", self.site_url, self.notify_path)
    }

    pub fn return_url(&self, order_id: &str) -> String {
        format!(
            "{}{}?order_id={}",
            self.site_url,
            self.return_path,
            urlencoding::encode(order_id)
        )
    }
}

/// An order to be paid through the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrder {
    /// Merchant order id (`out_trade_no`)
    pub order_id: String,

    pub amount: Amount,

    /// Product name, at most 64 characters
    pub product_name: String,

    pub notify_url: String,

    pub return_url: String,
}

impl PaymentOrder {
    /// Create an order, deriving the callback URLs from the site URL.
    /// The product name is truncated to 64 characters.
    pub fn new(
        order_id: impl Into<String>,
        amount: Amount,
        product_name: impl AsRef<str>,
        site_url: &str,
    ) -> Self {
        let order_id = order_id.into();
        let urls = CallbackUrls::new(site_url);

        Self {
            notify_url: urls.notify_url(),
            return_url: urls.return_url(&order_id),
            order_id,
            amount,
            product_name: truncate_chars(product_name.as_ref(), MAX_PRODUCT_NAME_CHARS),
        }
    }

    /// Check caller-supplied data before anything is signed or sent
    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.order_id.trim().is_empty() {
            return Err(PaymentError::InvalidRequest(
                "Order id must not be empty".to_string(),
            ));
        }
        if !self.amount.is_positive() {
            return Err(PaymentError::InvalidRequest(format!(
                "Amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// Cut `s` to at most `max` characters (Unicode scalar values).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// A payment page created by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Our merchant order ID
    pub order_id: String,

    /// Provider name (e.g., "epay")
    pub provider: String,

    /// URL to send the customer to
    pub payment_url: String,

    pub created_at: DateTime<Utc>,
}

impl PaymentSession {
    pub fn new(
        order_id: impl Into<String>,
        provider: impl Into<String>,
        payment_url: impl Into<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            provider: provider.into(),
            payment_url: payment_url.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_formatting() {
        assert_eq!(Amount::new(10.0).to_gateway_string(), "10.00");
        assert_eq!(Amount::new(9.9).to_gateway_string(), "9.90");
        assert_eq!(Amount::new(0.1 + 0.2).to_gateway_string(), "0.30");
        assert_eq!(Amount::from_cents(5).to_gateway_string(), "0.05");
        assert_eq!(Amount::from_cents(-150).to_gateway_string(), "-1.50");
    }

    #[test]
    fn test_amount_parsing() {
        assert_eq!("10".parse::<Amount>().unwrap().cents(), 1000);
        assert_eq!("9.9".parse::<Amount>().unwrap().cents(), 990);
        assert_eq!("0.05".parse::<Amount>().unwrap().cents(), 5);
        assert_eq!("-1.50".parse::<Amount>().unwrap().cents(), -150);

        assert!("1.005".parse::<Amount>().is_err());
        assert!("abc".parse::<Amount>().is_err());
        assert!(".5".parse::<Amount>().is_err());
        assert!("".parse::<Amount>().is_err());
    }

    #[test]
    fn test_callback_urls() {
        let urls = CallbackUrls::new("https://shop.example//");

        assert_eq!(urls.notify_url(), "https://shop.example/webhook/epay/notify");
        assert_eq!(
            urls.return_url("ORD-1"),
            "https://shop.example/checkout/success?order_id=ORD-1"
        );
    }

    #[test]
    fn test_return_url_encodes_order_id() {
        let urls = CallbackUrls::new("https://shop.example");

        assert_eq!(
            urls.return_url("A&B #1"),
            "https://shop.example/checkout/success?order_id=A%26B%20%231"
        );
        assert_eq!(
            urls.return_url("ORD_1.x~y"),
            "https://shop.example/checkout/success?order_id=ORD_1.x~y"
        );
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("ab", 3), "ab");
        assert_eq!(truncate_chars("会员卡", 2), "会员");
    }

    #[test]
    fn test_product_name_truncated() {
        let long_name = "x".repeat(100);
        let order = PaymentOrder::new("ORD-1", Amount::new(1.0), &long_name, "https://shop.example");

        assert_eq!(order.product_name.chars().count(), 64);
    }

    #[test]
    fn test_product_name_truncated_on_char_boundary() {
        let long_name = "会员".repeat(50);
        let order = PaymentOrder::new("ORD-1", Amount::new(1.0), &long_name, "https://shop.example");

        assert_eq!(order.product_name.chars().count(), 64);
        assert_eq!(order.product_name, "会员".repeat(32));
    }

    #[test]
    fn test_short_name_untouched() {
        let order = PaymentOrder::new("ORD-1", Amount::new(1.0), "Pro plan", "https://shop.example");
        assert_eq!(order.product_name, "Pro plan");
        assert_eq!(order.notify_url, "https://shop.example/webhook/epay/notify");
        assert_eq!(
            order.return_url,
            "https://shop.example/checkout/success?order_id=ORD-1"
        );
    }

    #[test]
    fn test_validate() {
        let ok = PaymentOrder::new("ORD-1", Amount::new(1.0), "p", "https://s");
        assert!(ok.validate().is_ok());

        let zero = PaymentOrder::new("ORD-1", Amount::from_cents(0), "p", "https://s");
        assert!(matches!(zero.validate(), Err(PaymentError::InvalidRequest(_))));

        let blank = PaymentOrder::new("  ", Amount::new(1.0), "p", "https://s");
        assert!(matches!(blank.validate(), Err(PaymentError::InvalidRequest(_))));
    }
}
