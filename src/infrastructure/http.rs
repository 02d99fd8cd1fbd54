use crate::config::CheckoutConfig;
use crate::domain::gateway::GatewayPayload;
use crate::domain::order::{MinorUnits, OrderCreated, OrderRef, VerifiedOrderId};
use crate::domain::ports::{CsrfTokenProvider, CsrfTokenProviderRef, OrderInitiator, ResultVerifier};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Relative to `backend_url`, so a backend mounted under a path prefix keeps it.
pub const CREATE_ORDER_PATH: &str = "payment/create-order";
pub const VERIFY_PATH: &str = "payment/verify";
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// A CSRF token fixed at startup, e.g. read from the page's meta tag.
#[derive(Debug, Clone, Default)]
pub struct StaticCsrfToken(String);

impl StaticCsrfToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CsrfTokenProvider for StaticCsrfToken {
    fn csrf_token(&self) -> String {
        self.0.clone()
    }
}

/// Accepts an id sent either as a JSON string or a number.
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    success: bool,
    #[serde(default)]
    amount: Option<u64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default, deserialize_with = "deserialize_id")]
    order_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl CreateOrderResponse {
    fn into_order(self) -> Result<OrderCreated> {
        if !self.success {
            return Err(CheckoutError::OrderCreationFailed(self.message));
        }
        let (Some(order_id), Some(amount), Some(currency)) =
            (self.order_id, self.amount, self.currency)
        else {
            tracing::error!("create-order reported success without order details");
            return Err(CheckoutError::OrderCreationFailed(None));
        };
        Ok(OrderCreated {
            order_ref: OrderRef::new(order_id)?,
            amount: MinorUnits(amount),
            currency,
        })
    }
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    razorpay_payment_id: &'a str,
    razorpay_order_id: &'a str,
    razorpay_signature: &'a str,
}

impl<'a> From<&'a GatewayPayload> for VerifyRequest<'a> {
    fn from(payload: &'a GatewayPayload) -> Self {
        Self {
            razorpay_payment_id: &payload.payment_id,
            razorpay_order_id: &payload.order_id,
            razorpay_signature: &payload.signature,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default, deserialize_with = "deserialize_id")]
    order_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl VerifyResponse {
    fn into_order_id(self) -> Result<VerifiedOrderId> {
        if !self.success {
            let reason = self
                .message
                .unwrap_or_else(|| "backend rejected the payment proof".to_string());
            return Err(CheckoutError::VerificationFailed(reason));
        }
        VerifiedOrderId::new(self.order_id.unwrap_or_default())
    }
}

/// The shop backend, reached over JSON/HTTP.
///
/// Serves as both the order initiator and the result verifier.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    csrf: CsrfTokenProviderRef,
    session_cookie: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &CheckoutConfig, csrf: CsrfTokenProviderRef) -> Result<Self> {
        let mut base_url = Url::parse(&config.backend_url)
            .map_err(|e| CheckoutError::Config(format!("backend_url: {}", e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CheckoutError::Config(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            csrf,
            session_cookie: config.session_cookie.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CheckoutError::Config(format!("{}: {}", path, e)))
    }

    /// POSTs `body` and decodes the reply whatever the status code; the
    /// backend reports business failures inside the body.
    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let mut request = self
            .client
            .post(url)
            .header(CSRF_HEADER, self.csrf.csrf_token())
            .json(body);
        if let Some(cookie) = &self.session_cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CheckoutError::Transport(format!("{} timed out", path))
            } else {
                CheckoutError::from(e)
            }
        })?;
        let status = response.status();
        tracing::debug!(path, status = status.as_u16(), "backend responded");

        response.json::<R>().await.map_err(|e| {
            CheckoutError::Transport(format!("{} returned an unreadable body ({}): {}", path, status, e))
        })
    }
}

#[async_trait]
impl OrderInitiator for HttpBackend {
    async fn create_order(&self) -> Result<OrderCreated> {
        let response: CreateOrderResponse = self
            .post_json(CREATE_ORDER_PATH, &serde_json::json!({}))
            .await?;
        if !response.success {
            tracing::info!(reason = ?response.message, "backend refused to create order");
        }
        response.into_order()
    }
}

#[async_trait]
impl ResultVerifier for HttpBackend {
    async fn verify(&self, payload: &GatewayPayload) -> Result<VerifiedOrderId> {
        let request = VerifyRequest::from(payload);
        let response: VerifyResponse = self.post_json(VERIFY_PATH, &request).await?;
        if !response.success {
            tracing::error!(
                payment_id = %payload.payment_id,
                reason = ?response.message,
                "backend did not confirm payment"
            );
        }
        response.into_order_id()
    }
}
