use crate::domain::notification::Severity;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Everything that can end a payment attempt, plus the few errors raised
/// outside an attempt (configuration, a click while locked).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// The backend refused to create an order. Nothing reached the gateway yet.
    #[error("order creation failed: {}", .0.as_deref().unwrap_or("no reason given"))]
    OrderCreationFailed(Option<String>),
    /// The gateway reported a payment failure, e.g. a declined card.
    #[error("gateway rejected payment: {}", .0.as_deref().unwrap_or("no description"))]
    GatewayRejected(Option<String>),
    /// The user closed the widget. Not an error from the user's point of view.
    #[error("checkout dismissed by user")]
    GatewayCancelled,
    /// The gateway accepted the payment but the backend did not confirm it.
    #[error("payment verification failed: {0}")]
    VerificationFailed(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("checkout widget failed: {0}")]
    Widget(String),
    /// The caller stopped driving the attempt before it settled.
    #[error("payment attempt interrupted")]
    Interrupted,
    #[error("a payment attempt is already in progress")]
    AttemptInProgress,
    #[error("invalid transition from {from} on {event}")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },
    #[error("configuration error: {0}")]
    Config(String),
}

impl CheckoutError {
    /// The text shown to the user when this error ends an attempt.
    pub fn user_message(&self) -> String {
        match self {
            Self::OrderCreationFailed(reason) => reason
                .clone()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| "Payment setup failed".to_string()),
            Self::GatewayRejected(description) => format!(
                "Payment failed: {}",
                description
                    .as_deref()
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or("Unknown error")
            ),
            Self::GatewayCancelled => "Payment cancelled.".to_string(),
            Self::VerificationFailed(_) => {
                "Payment verification failed. Contact support.".to_string()
            }
            Self::Transport(_) => "Network error. Please try again.".to_string(),
            Self::Widget(_) => "Payment window could not be opened. Please try again.".to_string(),
            Self::Interrupted => "Payment was interrupted. Please try again.".to_string(),
            Self::AttemptInProgress => "A payment is already being processed.".to_string(),
            Self::InvalidTransition { .. } | Self::Config(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::GatewayCancelled => Severity::Warning,
            Self::AttemptInProgress => Severity::Info,
            _ => Severity::Error,
        }
    }
}

impl From<reqwest::Error> for CheckoutError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
