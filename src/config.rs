use crate::domain::control::PayLabel;
use crate::domain::gateway::{CheckoutProfile, Prefill, Theme};
use crate::error::{CheckoutError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Settings for one checkout page.
///
/// Everything the page used to read from globals is passed in here instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckoutConfig {
    /// Base URL of the shop backend, e.g. `https://shop.example.com`.
    pub backend_url: String,
    /// Public key of the hosted checkout.
    pub gateway_key: String,
    /// Amount shown on the pay button. Never sent to the gateway.
    pub display_amount: Decimal,
    pub currency_symbol: String,
    pub merchant_name: String,
    pub description: String,
    pub theme_color: String,
    pub prefill: Prefill,
    /// Value of the `Cookie` header carrying the logged-in session.
    pub session_cookie: Option<String>,
    pub csrf_token: Option<String>,
    /// No timeout when absent.
    pub request_timeout_secs: Option<u64>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            backend_url: String::new(),
            gateway_key: String::new(),
            display_amount: Decimal::ZERO,
            currency_symbol: "₹".to_string(),
            merchant_name: "SecureShop".to_string(),
            description: "Secure Online Purchase".to_string(),
            theme_color: Theme::default().color,
            prefill: Prefill::default(),
            session_cookie: None,
            csrf_token: None,
            request_timeout_secs: None,
        }
    }
}

impl CheckoutConfig {
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| CheckoutError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| CheckoutError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&source)
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.backend_url)
            .map_err(|e| CheckoutError::Config(format!("backend_url: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CheckoutError::Config(format!(
                "backend_url: unsupported scheme {}",
                url.scheme()
            )));
        }
        if self.gateway_key.trim().is_empty() {
            return Err(CheckoutError::Config("gateway_key is required".to_string()));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(CheckoutError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn pay_label(&self) -> PayLabel {
        PayLabel::new(self.display_amount, self.currency_symbol.clone())
    }

    pub fn profile(&self) -> CheckoutProfile {
        CheckoutProfile {
            key: self.gateway_key.clone(),
            merchant_name: self.merchant_name.clone(),
            description: self.description.clone(),
            prefill: self.prefill.clone(),
            theme: Theme {
                color: self.theme_color.clone(),
            },
        }
    }
}
