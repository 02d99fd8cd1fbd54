use super::control::SubmitControl;
use super::gateway::{CheckoutOptions, CheckoutOutcome, GatewayPayload};
use super::notification::Notification;
use super::order::{OrderCreated, VerifiedOrderId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Asks the backend to create a payable order for the current cart.
#[async_trait]
pub trait OrderInitiator: Send + Sync {
    async fn create_order(&self) -> Result<OrderCreated>;
}

/// Asks the backend to authoritatively confirm a gateway-reported payment.
#[async_trait]
pub trait ResultVerifier: Send + Sync {
    async fn verify(&self, payload: &GatewayPayload) -> Result<VerifiedOrderId>;
}

/// A hosted checkout widget.
///
/// `open` returns once the widget is showing; the user's decision arrives
/// later through exactly one of the callbacks.
pub trait HostedCheckout: Send + Sync {
    fn open(&self, options: CheckoutOptions, callbacks: CheckoutCallbacks) -> Result<()>;
}

/// Toast sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Page navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Where the pay button is drawn.
pub trait SubmitControlView: Send + Sync {
    fn render(&self, control: &SubmitControl);
}

/// Current anti-forgery token for state-mutating requests.
pub trait CsrfTokenProvider: Send + Sync {
    fn csrf_token(&self) -> String;
}

pub type OrderInitiatorRef = Arc<dyn OrderInitiator>;
pub type ResultVerifierRef = Arc<dyn ResultVerifier>;
pub type HostedCheckoutRef = Arc<dyn HostedCheckout>;
pub type NotifierRef = Arc<dyn Notifier>;
pub type NavigatorRef = Arc<dyn Navigator>;
pub type SubmitControlViewRef = Arc<dyn SubmitControlView>;
pub type CsrfTokenProviderRef = Arc<dyn CsrfTokenProvider>;

/// Completion hooks handed to a widget for one session.
///
/// Clones share one slot: whichever hook fires first delivers its outcome,
/// every later call is a no-op returning `false`.
#[derive(Clone)]
pub struct CheckoutCallbacks {
    slot: Arc<Mutex<Option<oneshot::Sender<CheckoutOutcome>>>>,
}

impl CheckoutCallbacks {
    pub fn channel() -> (Self, oneshot::Receiver<CheckoutOutcome>) {
        let (tx, rx) = oneshot::channel();
        let callbacks = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (callbacks, rx)
    }

    pub fn on_approved(&self, payload: GatewayPayload) -> bool {
        self.complete(CheckoutOutcome::Approved(payload))
    }

    pub fn on_rejected(&self, description: Option<String>) -> bool {
        self.complete(CheckoutOutcome::Rejected(description))
    }

    pub fn on_dismissed(&self) -> bool {
        self.complete(CheckoutOutcome::Dismissed)
    }

    /// Whether a hook has already fired for this session.
    pub fn is_settled(&self) -> bool {
        self.slot
            .lock()
            .map(|slot| slot.is_none())
            .unwrap_or(true)
    }

    fn complete(&self, outcome: CheckoutOutcome) -> bool {
        let sender = match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match sender {
            Some(tx) => {
                tracing::debug!(outcome = outcome.kind(), "checkout session settled");
                tx.send(outcome).is_ok()
            }
            None => {
                tracing::warn!(
                    outcome = outcome.kind(),
                    "ignoring callback for an already settled checkout session"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> GatewayPayload {
        GatewayPayload {
            payment_id: "pay_1".into(),
            order_id: "order_O1".into(),
            signature: "sig".into(),
        }
    }

    #[tokio::test]
    async fn test_first_callback_wins() {
        let (callbacks, rx) = CheckoutCallbacks::channel();
        let late = callbacks.clone();

        assert!(callbacks.on_approved(payload()));
        assert!(!late.on_dismissed());
        assert!(!late.on_rejected(Some("declined".into())));
        assert!(late.is_settled());

        assert_eq!(rx.await.unwrap(), CheckoutOutcome::Approved(payload()));
    }

    #[tokio::test]
    async fn test_dropping_all_handles_closes_channel() {
        let (callbacks, rx) = CheckoutCallbacks::channel();
        assert!(!callbacks.is_settled());
        drop(callbacks);
        assert!(rx.await.is_err());
    }
}
