use crate::application::checkout::CheckoutAdapter;
use crate::domain::attempt::{AttemptEvent, AttemptState, PaymentAttempt};
use crate::domain::control::{PayLabel, SubmitControl};
use crate::domain::gateway::{CheckoutOutcome, CheckoutProfile};
use crate::domain::notification::{Notification, Severity};
use crate::domain::order::VerifiedOrderId;
use crate::domain::ports::{
    HostedCheckoutRef, NavigatorRef, NotifierRef, OrderInitiatorRef, ResultVerifierRef,
    SubmitControlViewRef,
};
use crate::error::{CheckoutError, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const SUCCESS_MESSAGE: &str = "Payment successful!";

/// How an attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded { order_id: VerifiedOrderId },
    Failed(CheckoutError),
    Cancelled,
}

/// Collaborators the controller is wired to.
pub struct FlowPorts {
    pub initiator: OrderInitiatorRef,
    pub verifier: ResultVerifierRef,
    pub widget: HostedCheckoutRef,
    pub notifier: NotifierRef,
    pub navigator: NavigatorRef,
    pub view: SubmitControlViewRef,
}

/// Sequences order creation, the hosted checkout and verification for one
/// pay button.
///
/// Holds the live [`PaymentAttempt`]. The attempt lock is only taken to
/// apply a transition, never across a backend or widget wait, so a second
/// click during an attempt sees the lock and is turned away.
pub struct FlowController {
    attempt: Mutex<PaymentAttempt>,
    pay_label: PayLabel,
    initiator: OrderInitiatorRef,
    verifier: ResultVerifierRef,
    checkout: CheckoutAdapter,
    notifier: NotifierRef,
    navigator: NavigatorRef,
    view: SubmitControlViewRef,
}

/// Settles the attempt as [`CheckoutError::Interrupted`] if `submit` is
/// dropped before reaching a terminal state.
struct InFlight<'a> {
    controller: &'a FlowController,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(controller: &'a FlowController) -> Self {
        Self {
            controller,
            armed: true,
        }
    }

    fn settle(&mut self, err: CheckoutError) -> Outcome {
        self.armed = false;
        self.controller.settle(err)
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("payment attempt dropped before it settled");
            self.controller.settle(CheckoutError::Interrupted);
        }
    }
}

impl FlowController {
    /// Creates a controller and draws the idle pay button.
    pub fn new(pay_label: PayLabel, profile: CheckoutProfile, ports: FlowPorts) -> Self {
        let controller = Self {
            attempt: Mutex::new(PaymentAttempt::new()),
            checkout: CheckoutAdapter::new(ports.widget, profile),
            pay_label,
            initiator: ports.initiator,
            verifier: ports.verifier,
            notifier: ports.notifier,
            navigator: ports.navigator,
            view: ports.view,
        };
        controller
            .view
            .render(&controller.pay_label.control_for(AttemptState::Idle));
        controller
    }

    pub fn state(&self) -> AttemptState {
        self.attempt().state()
    }

    pub fn submit_control(&self) -> SubmitControl {
        self.pay_label.control_for(self.state())
    }

    /// Handles a click on the pay button and runs the attempt to its end.
    ///
    /// Returns `Err(AttemptInProgress)` when another attempt still holds the
    /// button; that click changes nothing and produces no notification.
    /// Every other path yields an [`Outcome`] after exactly one notification.
    /// Dropping the returned future mid-attempt fails the attempt as
    /// interrupted and hands the button back.
    #[tracing::instrument(name = "payment_attempt", skip(self))]
    pub async fn submit(&self) -> Result<Outcome> {
        {
            let mut attempt = self.attempt();
            if attempt.ui_lock() {
                tracing::debug!(state = attempt.state().name(), "pay click ignored");
                return Err(CheckoutError::AttemptInProgress);
            }
            self.transition(&mut attempt, AttemptEvent::Start)?;
        }
        let mut in_flight = InFlight::new(self);

        let order = match self.initiator.create_order().await {
            Ok(order) => order,
            Err(err) => return Ok(in_flight.settle(err)),
        };
        if let Err(err) = self.apply(AttemptEvent::OrderCreated(order.order_ref.clone())) {
            return Ok(in_flight.settle(err));
        }

        let payload = match self.checkout.run(&order).await {
            Ok(CheckoutOutcome::Approved(payload)) => payload,
            Ok(CheckoutOutcome::Rejected(description)) => {
                return Ok(in_flight.settle(CheckoutError::GatewayRejected(description)));
            }
            Ok(CheckoutOutcome::Dismissed) => {
                return Ok(in_flight.settle(CheckoutError::GatewayCancelled));
            }
            Err(err) => return Ok(in_flight.settle(err)),
        };
        if let Err(err) = self.apply(AttemptEvent::Approved(payload)) {
            return Ok(in_flight.settle(err));
        }

        let payload = self.attempt().gateway_payload().cloned();
        let Some(payload) = payload else {
            let err = CheckoutError::VerificationFailed("gateway payload missing".to_string());
            return Ok(in_flight.settle(err));
        };

        let verified = match self.verifier.verify(&payload).await {
            Ok(order_id) => order_id,
            // The gateway already took the money, so an unanswered verify is
            // an unconfirmed payment rather than a plain network retry.
            Err(CheckoutError::Transport(cause)) => {
                return Ok(in_flight.settle(CheckoutError::VerificationFailed(cause)));
            }
            Err(err) => return Ok(in_flight.settle(err)),
        };
        if let Err(err) = self.apply(AttemptEvent::Verified) {
            return Ok(in_flight.settle(err));
        }
        in_flight.disarm();

        tracing::info!(order_id = %verified, "payment verified");
        self.notifier
            .notify(Notification::new(SUCCESS_MESSAGE, Severity::Success));
        self.navigator.navigate(&verified.success_path());

        Ok(Outcome::Succeeded { order_id: verified })
    }

    fn attempt(&self) -> MutexGuard<'_, PaymentAttempt> {
        self.attempt.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(&self, event: AttemptEvent) -> Result<AttemptState> {
        let mut attempt = self.attempt();
        self.transition(&mut attempt, event)
    }

    fn transition(&self, attempt: &mut PaymentAttempt, event: AttemptEvent) -> Result<AttemptState> {
        let from = attempt.state();
        let event_name = event.name();
        let to = attempt.apply(event)?;
        tracing::info!(from = from.name(), to = to.name(), event = event_name, "attempt transition");
        self.view.render(&self.pay_label.control_for(to));
        Ok(to)
    }

    /// Ends the attempt on a failure or cancellation, reports it once and
    /// hands the button back.
    fn settle(&self, err: CheckoutError) -> Outcome {
        let cancelled = matches!(err, CheckoutError::GatewayCancelled);
        let event = if cancelled {
            AttemptEvent::Dismissed
        } else {
            AttemptEvent::Fail
        };

        match &err {
            CheckoutError::GatewayCancelled => tracing::warn!("payment cancelled by user"),
            CheckoutError::GatewayRejected(_) => tracing::warn!(error = %err, "payment rejected"),
            _ => tracing::error!(error = %err, "payment attempt failed"),
        }

        let mut attempt = self.attempt();
        if let Err(transition_err) = self.transition(&mut attempt, event) {
            tracing::error!(error = %transition_err, "discarding attempt in unexpected state");
            *attempt = PaymentAttempt::new();
        }

        self.notifier
            .notify(Notification::new(err.user_message(), err.severity()));

        if attempt.state() != AttemptState::Idle {
            if let Err(reset_err) = self.transition(&mut attempt, AttemptEvent::Reset) {
                tracing::error!(error = %reset_err, "forcing attempt back to idle");
                *attempt = PaymentAttempt::new();
            }
        }
        self.view
            .render(&self.pay_label.control_for(attempt.state()));

        if cancelled {
            Outcome::Cancelled
        } else {
            Outcome::Failed(err)
        }
    }
}
