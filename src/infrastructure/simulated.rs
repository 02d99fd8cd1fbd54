use crate::domain::gateway::{CheckoutOptions, GatewayPayload};
use crate::domain::ports::{CheckoutCallbacks, HostedCheckout};
use crate::error::{CheckoutError, Result};
use crate::infrastructure::guard;
use std::sync::Mutex;
use std::time::Duration;

/// What the simulated user does once the widget is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetScript {
    Approve(GatewayPayload),
    /// Approves with the order id the widget was opened for.
    ApproveOrder {
        payment_id: String,
        signature: String,
    },
    Reject(Option<String>),
    Dismiss,
    /// Fires each step in order; only the first can land.
    Sequence(Vec<WidgetScript>),
    /// Closes without calling anything.
    Abandon,
    FailToOpen(String),
}

impl WidgetScript {
    /// Whether playing this script fires at least one callback.
    pub fn fires(&self) -> bool {
        match self {
            Self::Approve(_) | Self::ApproveOrder { .. } | Self::Reject(_) | Self::Dismiss => true,
            Self::Sequence(steps) => steps.iter().any(WidgetScript::fires),
            Self::Abandon | Self::FailToOpen(_) => false,
        }
    }
}

/// Hosted checkout stand-in that plays a [`WidgetScript`] on a background
/// task, the way a real widget calls back some time after opening.
pub struct SimulatedCheckout {
    script: WidgetScript,
    delay: Duration,
    opened: Mutex<Vec<CheckoutOptions>>,
    last_callbacks: Mutex<Option<CheckoutCallbacks>>,
}

impl SimulatedCheckout {
    pub fn new(script: WidgetScript) -> Self {
        Self {
            script,
            delay: Duration::ZERO,
            opened: Mutex::new(Vec::new()),
            last_callbacks: Mutex::new(None),
        }
    }

    /// Waits `delay` before playing the script.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// How many times the widget was opened.
    pub fn opened(&self) -> usize {
        guard(&self.opened).len()
    }

    pub fn opened_with(&self) -> Vec<CheckoutOptions> {
        guard(&self.opened).clone()
    }

    /// Callbacks of the most recent session, for firing stray events after
    /// the fact.
    pub fn last_callbacks(&self) -> Option<CheckoutCallbacks> {
        guard(&self.last_callbacks).clone()
    }

    fn play(script: &WidgetScript, callbacks: &CheckoutCallbacks, order_id: &str) {
        match script {
            WidgetScript::Approve(payload) => {
                callbacks.on_approved(payload.clone());
            }
            WidgetScript::ApproveOrder {
                payment_id,
                signature,
            } => {
                callbacks.on_approved(GatewayPayload {
                    payment_id: payment_id.clone(),
                    order_id: order_id.to_string(),
                    signature: signature.clone(),
                });
            }
            WidgetScript::Reject(description) => {
                callbacks.on_rejected(description.clone());
            }
            WidgetScript::Dismiss => {
                callbacks.on_dismissed();
            }
            WidgetScript::Sequence(steps) => {
                for step in steps {
                    Self::play(step, callbacks, order_id);
                }
            }
            WidgetScript::Abandon | WidgetScript::FailToOpen(_) => {}
        }
    }
}

impl HostedCheckout for SimulatedCheckout {
    fn open(&self, options: CheckoutOptions, callbacks: CheckoutCallbacks) -> Result<()> {
        if let WidgetScript::FailToOpen(reason) = &self.script {
            return Err(CheckoutError::Widget(reason.clone()));
        }

        tracing::debug!(order_id = %options.order_id, "simulated checkout opened");
        let order_id = options.order_id.as_str().to_string();
        guard(&self.opened).push(options);

        if !self.script.fires() {
            return Ok(());
        }

        *guard(&self.last_callbacks) = Some(callbacks.clone());
        let script = self.script.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
            Self::play(&script, &callbacks, &order_id);
        });
        Ok(())
    }
}
