use super::gateway::GatewayPayload;
use super::order::OrderRef;
use crate::error::{CheckoutError, Result};

/// Stage of a payment attempt.
///
/// `Idle -> CreatingOrder -> AwaitingGateway -> Verifying -> Succeeded`, with
/// `Failed` and `Cancelled` returning to `Idle` once reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttemptState {
    Idle,
    CreatingOrder,
    AwaitingGateway,
    Verifying,
    Succeeded,
    Failed,
    Cancelled,
}

impl AttemptState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CreatingOrder => "creating_order",
            Self::AwaitingGateway => "awaiting_gateway",
            Self::Verifying => "verifying",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Waiting on the backend or the widget.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::CreatingOrder | Self::AwaitingGateway | Self::Verifying
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptEvent {
    Start,
    OrderCreated(OrderRef),
    Approved(GatewayPayload),
    Dismissed,
    Verified,
    /// Any failure: backend refusal, gateway rejection, transport error,
    /// unconfirmed payment.
    Fail,
    Reset,
}

impl AttemptEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::OrderCreated(_) => "order_created",
            Self::Approved(_) => "approved",
            Self::Dismissed => "dismissed",
            Self::Verified => "verified",
            Self::Fail => "fail",
            Self::Reset => "reset",
        }
    }
}

/// One end-to-end run of the payment flow.
///
/// Owned by the flow controller; every mutation goes through [`apply`],
/// which refuses any transition the state machine does not allow.
///
/// [`apply`]: PaymentAttempt::apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAttempt {
    state: AttemptState,
    order_ref: Option<OrderRef>,
    gateway_payload: Option<GatewayPayload>,
}

impl Default for PaymentAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentAttempt {
    pub fn new() -> Self {
        Self {
            state: AttemptState::Idle,
            order_ref: None,
            gateway_payload: None,
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn order_ref(&self) -> Option<&OrderRef> {
        self.order_ref.as_ref()
    }

    pub fn gateway_payload(&self) -> Option<&GatewayPayload> {
        self.gateway_payload.as_ref()
    }

    /// True while the submit control must stay disabled.
    pub fn ui_lock(&self) -> bool {
        self.state.is_in_flight() || self.state == AttemptState::Succeeded
    }

    /// Applies `event`, returning the new state.
    pub fn apply(&mut self, event: AttemptEvent) -> Result<AttemptState> {
        use AttemptState::*;

        let from = self.state;
        let invalid = CheckoutError::InvalidTransition {
            from: from.name(),
            event: event.name(),
        };

        let next = match (from, event) {
            (Idle, AttemptEvent::Start) => CreatingOrder,
            (CreatingOrder, AttemptEvent::OrderCreated(order_ref)) => {
                if self.order_ref.is_some() {
                    return Err(invalid);
                }
                self.order_ref = Some(order_ref);
                AwaitingGateway
            }
            (AwaitingGateway, AttemptEvent::Approved(payload)) => {
                if self.order_ref.is_none() {
                    return Err(invalid);
                }
                self.gateway_payload = Some(payload);
                Verifying
            }
            (AwaitingGateway, AttemptEvent::Dismissed) => Cancelled,
            (Verifying, AttemptEvent::Verified) => Succeeded,
            (CreatingOrder | AwaitingGateway | Verifying, AttemptEvent::Fail) => Failed,
            (Failed | Cancelled, AttemptEvent::Reset) => {
                *self = Self::new();
                return Ok(self.state);
            }
            _ => return Err(invalid),
        };

        if next.is_terminal() {
            self.gateway_payload = None;
        }
        self.state = next;
        Ok(next)
    }
}
