use crate::domain::control::SubmitControl;
use crate::domain::gateway::GatewayPayload;
use crate::domain::notification::Notification;
use crate::domain::order::{OrderCreated, VerifiedOrderId};
use crate::domain::ports::{Navigator, Notifier, OrderInitiator, ResultVerifier, SubmitControlView};
use crate::error::{CheckoutError, Result};
use crate::infrastructure::guard;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Order initiator answering from a queue of prepared responses.
///
/// Runs dry into a transport error, like a backend that stopped answering.
#[derive(Default)]
pub struct ScriptedOrderInitiator {
    responses: Mutex<VecDeque<Result<OrderCreated>>>,
    calls: Mutex<usize>,
    delay: Mutex<Duration>,
}

impl ScriptedOrderInitiator {
    pub fn new(responses: Vec<Result<OrderCreated>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    /// Simulated round-trip latency for every call.
    pub fn set_delay(&self, delay: Duration) {
        *guard(&self.delay) = delay;
    }

    pub fn push(&self, response: Result<OrderCreated>) {
        guard(&self.responses).push_back(response);
    }

    pub fn calls(&self) -> usize {
        *guard(&self.calls)
    }
}

#[async_trait]
impl OrderInitiator for ScriptedOrderInitiator {
    async fn create_order(&self) -> Result<OrderCreated> {
        *guard(&self.calls) += 1;
        let delay = *guard(&self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        guard(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(CheckoutError::Transport("no response scripted".to_string())))
    }
}

/// Verifier answering from a queue and recording every payload it was
/// asked to confirm.
#[derive(Default)]
pub struct ScriptedVerifier {
    responses: Mutex<VecDeque<Result<VerifiedOrderId>>>,
    received: Mutex<Vec<GatewayPayload>>,
}

impl ScriptedVerifier {
    pub fn new(responses: Vec<Result<VerifiedOrderId>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, response: Result<VerifiedOrderId>) {
        guard(&self.responses).push_back(response);
    }

    pub fn received(&self) -> Vec<GatewayPayload> {
        guard(&self.received).clone()
    }
}

#[async_trait]
impl ResultVerifier for ScriptedVerifier {
    async fn verify(&self, payload: &GatewayPayload) -> Result<VerifiedOrderId> {
        guard(&self.received).push(payload.clone());
        guard(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(CheckoutError::Transport("no response scripted".to_string())))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        guard(&self.notifications).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        guard(&self.notifications).push(notification);
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<String> {
        guard(&self.paths).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        guard(&self.paths).push(path.to_string());
    }
}

/// Keeps every rendering of the pay button, oldest first.
#[derive(Default)]
pub struct RecordingView {
    renders: Mutex<Vec<SubmitControl>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn renders(&self) -> Vec<SubmitControl> {
        guard(&self.renders).clone()
    }

    pub fn current(&self) -> Option<SubmitControl> {
        guard(&self.renders).last().cloned()
    }
}

impl SubmitControlView for RecordingView {
    fn render(&self, control: &SubmitControl) {
        guard(&self.renders).push(control.clone());
    }
}
