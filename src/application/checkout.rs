use crate::domain::gateway::{CheckoutOptions, CheckoutOutcome, CheckoutProfile};
use crate::domain::order::OrderCreated;
use crate::domain::ports::{CheckoutCallbacks, HostedCheckoutRef};
use crate::error::Result;

/// Uniform completion contract over whatever widget is configured.
pub struct CheckoutAdapter {
    widget: HostedCheckoutRef,
    profile: CheckoutProfile,
}

impl CheckoutAdapter {
    pub fn new(widget: HostedCheckoutRef, profile: CheckoutProfile) -> Self {
        Self { widget, profile }
    }

    /// Opens the widget for `order` and waits for the user's decision.
    ///
    /// Takes an [`OrderCreated`] so the widget is only ever opened for an
    /// order the backend just issued. A widget that goes away without firing
    /// any callback counts as dismissed.
    pub async fn run(&self, order: &OrderCreated) -> Result<CheckoutOutcome> {
        let options = CheckoutOptions::for_order(&self.profile, order);
        let (callbacks, completion) = CheckoutCallbacks::channel();

        tracing::info!(
            order_id = %order.order_ref,
            amount = order.amount.value(),
            currency = %order.currency,
            "opening hosted checkout"
        );
        self.widget.open(options, callbacks)?;

        match completion.await {
            Ok(outcome) => Ok(outcome),
            Err(_) => {
                tracing::warn!(
                    order_id = %order.order_ref,
                    "checkout closed without reporting a result"
                );
                Ok(CheckoutOutcome::Dismissed)
            }
        }
    }
}
