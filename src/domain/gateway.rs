use super::order::{MinorUnits, OrderCreated, OrderRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the widget hands back when the user completes payment.
///
/// Opaque to the flow: it is forwarded to the verifier unchanged. The
/// signature is kept out of `Debug` output so it never reaches the logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub payment_id: String,
    pub order_id: String,
    pub signature: String,
}

impl fmt::Debug for GatewayPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayPayload")
            .field("payment_id", &self.payment_id)
            .field("order_id", &self.order_id)
            .field("signature", &"<redacted>")
            .finish()
    }
}

/// The single result of one opened widget session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Approved(GatewayPayload),
    /// Gateway-reported failure with its human-readable description, if any.
    Rejected(Option<String>),
    Dismissed,
}

impl CheckoutOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Approved(_) => "approved",
            Self::Rejected(_) => "rejected",
            Self::Dismissed => "dismissed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefill {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            color: "#6c63ff".to_string(),
        }
    }
}

/// Merchant-level widget settings that do not change between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutProfile {
    pub key: String,
    pub merchant_name: String,
    pub description: String,
    pub prefill: Prefill,
    pub theme: Theme,
}

/// Everything the widget is opened with.
///
/// Only constructible from a fresh [`OrderCreated`], so the widget can never
/// be configured without a backend-issued order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutOptions {
    pub key: String,
    pub amount: MinorUnits,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub order_id: OrderRef,
    pub prefill: Prefill,
    pub theme: Theme,
}

impl CheckoutOptions {
    pub fn for_order(profile: &CheckoutProfile, order: &OrderCreated) -> Self {
        Self {
            key: profile.key.clone(),
            amount: order.amount,
            currency: order.currency.clone(),
            name: profile.merchant_name.clone(),
            description: profile.description.clone(),
            order_id: order.order_ref.clone(),
            prefill: profile.prefill.clone(),
            theme: profile.theme.clone(),
        }
    }
}
