#![allow(dead_code)]

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use checkout_flow::application::flow::{FlowController, FlowPorts};
use checkout_flow::domain::gateway::{CheckoutProfile, GatewayPayload, Prefill, Theme};
use checkout_flow::domain::control::PayLabel;
use checkout_flow::domain::order::{MinorUnits, OrderCreated, OrderRef, VerifiedOrderId};
use checkout_flow::error::Result;
use checkout_flow::infrastructure::in_memory::{
    RecordingNavigator, RecordingNotifier, RecordingView, ScriptedOrderInitiator, ScriptedVerifier,
};
use checkout_flow::infrastructure::simulated::{SimulatedCheckout, WidgetScript};
use rust_decimal_macros::dec;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PAY_LABEL: &str = "Pay ₹499.00 Securely";

pub fn profile() -> CheckoutProfile {
    CheckoutProfile {
        key: "rzp_test_key".into(),
        merchant_name: "SecureShop".into(),
        description: "Secure Online Purchase".into(),
        prefill: Prefill {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            contact: "9999999999".into(),
        },
        theme: Theme::default(),
    }
}

pub fn order(id: &str) -> OrderCreated {
    OrderCreated {
        order_ref: OrderRef::new(id).unwrap(),
        amount: MinorUnits(49_900),
        currency: "INR".into(),
    }
}

pub fn payload(order_id: &str) -> GatewayPayload {
    GatewayPayload {
        payment_id: "pay_1".into(),
        order_id: order_id.into(),
        signature: "sig".into(),
    }
}

pub fn verified(id: &str) -> VerifiedOrderId {
    VerifiedOrderId::new(id).unwrap()
}

/// A controller wired to in-memory collaborators that the test can inspect.
pub struct Harness {
    pub controller: FlowController,
    pub initiator: Arc<ScriptedOrderInitiator>,
    pub verifier: Arc<ScriptedVerifier>,
    pub widget: Arc<SimulatedCheckout>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub view: Arc<RecordingView>,
}

impl Harness {
    pub fn new(
        creates: Vec<Result<OrderCreated>>,
        widget: SimulatedCheckout,
        verifies: Vec<Result<VerifiedOrderId>>,
    ) -> Self {
        let initiator = Arc::new(ScriptedOrderInitiator::new(creates));
        let verifier = Arc::new(ScriptedVerifier::new(verifies));
        let widget = Arc::new(widget);
        let notifier = Arc::new(RecordingNotifier::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let view = Arc::new(RecordingView::new());

        let controller = FlowController::new(
            PayLabel::new(dec!(499.00), "₹"),
            profile(),
            FlowPorts {
                initiator: initiator.clone(),
                verifier: verifier.clone(),
                widget: widget.clone(),
                notifier: notifier.clone(),
                navigator: navigator.clone(),
                view: view.clone(),
            },
        );

        Self {
            controller,
            initiator,
            verifier,
            widget,
            notifier,
            navigator,
            view,
        }
    }

    pub fn with_script(
        create: Result<OrderCreated>,
        script: WidgetScript,
        verify: Result<VerifiedOrderId>,
    ) -> Self {
        Self::new(vec![create], SimulatedCheckout::new(script), vec![verify])
    }
}

/// What the fake shop backend saw.
#[derive(Default)]
pub struct BackendLog {
    pub create_calls: AtomicUsize,
    pub verify_bodies: Mutex<Vec<Value>>,
    pub csrf_tokens: Mutex<Vec<String>>,
    pub cookies: Mutex<Vec<String>>,
}

/// Where the fake backend is mounted and how slowly it answers.
#[derive(Default)]
pub struct BackendOptions {
    /// Path prefix such as `/shop`; empty mounts at the root.
    pub prefix: &'static str,
    pub create_delay: Duration,
    pub verify_delay: Duration,
}

struct BackendState {
    create_response: Value,
    verify_response: Value,
    create_delay: Duration,
    verify_delay: Duration,
    log: Arc<BackendLog>,
}

pub struct FakeBackend {
    pub base_url: String,
    pub log: Arc<BackendLog>,
}

impl FakeBackend {
    pub fn create_calls(&self) -> usize {
        self.log.create_calls.load(Ordering::SeqCst)
    }

    pub fn verify_bodies(&self) -> Vec<Value> {
        self.log.verify_bodies.lock().unwrap().clone()
    }
}

fn record_headers(log: &BackendLog, headers: &HeaderMap) {
    if let Some(token) = headers.get("x-csrftoken").and_then(|v| v.to_str().ok()) {
        log.csrf_tokens.lock().unwrap().push(token.to_string());
    }
    if let Some(cookie) = headers.get("cookie").and_then(|v| v.to_str().ok()) {
        log.cookies.lock().unwrap().push(cookie.to_string());
    }
}

async fn create_order(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Json<Value> {
    state.log.create_calls.fetch_add(1, Ordering::SeqCst);
    record_headers(&state.log, &headers);
    tokio::time::sleep(state.create_delay).await;
    Json(state.create_response.clone())
}

async fn verify(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record_headers(&state.log, &headers);
    state.log.verify_bodies.lock().unwrap().push(body);
    tokio::time::sleep(state.verify_delay).await;
    Json(state.verify_response.clone())
}

/// Serves the two payment endpoints on an ephemeral local port with canned
/// replies.
pub async fn spawn_backend(create_response: Value, verify_response: Value) -> FakeBackend {
    spawn_backend_with(create_response, verify_response, BackendOptions::default()).await
}

pub async fn spawn_backend_with(
    create_response: Value,
    verify_response: Value,
    options: BackendOptions,
) -> FakeBackend {
    let log = Arc::new(BackendLog::default());
    let state = Arc::new(BackendState {
        create_response,
        verify_response,
        create_delay: options.create_delay,
        verify_delay: options.verify_delay,
        log: log.clone(),
    });
    let routes = Router::new()
        .route("/payment/create-order", post(create_order))
        .route("/payment/verify", post(verify))
        .with_state(state);
    let app = if options.prefix.is_empty() {
        routes
    } else {
        Router::new().nest(options.prefix, routes)
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeBackend {
        base_url: format!("http://{}{}", addr, options.prefix),
        log,
    }
}
