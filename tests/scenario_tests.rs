mod common;

use checkout_flow::application::flow::{FlowController, FlowPorts, Outcome, SUCCESS_MESSAGE};
use checkout_flow::config::CheckoutConfig;
use checkout_flow::domain::attempt::AttemptState;
use checkout_flow::domain::notification::{Notification, Severity};
use checkout_flow::error::CheckoutError;
use checkout_flow::infrastructure::http::{HttpBackend, StaticCsrfToken};
use checkout_flow::infrastructure::in_memory::{RecordingNavigator, RecordingNotifier, RecordingView};
use checkout_flow::infrastructure::simulated::{SimulatedCheckout, WidgetScript};
use common::{BackendOptions, FakeBackend, PAY_LABEL, spawn_backend, spawn_backend_with};
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

struct Page {
    controller: FlowController,
    widget: Arc<SimulatedCheckout>,
    notifier: Arc<RecordingNotifier>,
    navigator: Arc<RecordingNavigator>,
    view: Arc<RecordingView>,
}

fn page(backend: &FakeBackend, script: WidgetScript) -> Page {
    page_with_timeout(backend, script, None)
}

fn page_with_timeout(
    backend: &FakeBackend,
    script: WidgetScript,
    request_timeout_secs: Option<u64>,
) -> Page {
    let config = CheckoutConfig {
        backend_url: backend.base_url.clone(),
        gateway_key: "rzp_test_key".into(),
        display_amount: dec!(499.00),
        session_cookie: Some("session=abc".into()),
        request_timeout_secs,
        ..Default::default()
    };
    let http = Arc::new(
        HttpBackend::new(&config, Arc::new(StaticCsrfToken::new("csrf-123"))).unwrap(),
    );
    let widget = Arc::new(SimulatedCheckout::new(script));
    let notifier = Arc::new(RecordingNotifier::new());
    let navigator = Arc::new(RecordingNavigator::new());
    let view = Arc::new(RecordingView::new());

    let controller = FlowController::new(
        config.pay_label(),
        config.profile(),
        FlowPorts {
            initiator: http.clone(),
            verifier: http,
            widget: widget.clone(),
            notifier: notifier.clone(),
            navigator: navigator.clone(),
            view: view.clone(),
        },
    );

    Page {
        controller,
        widget,
        notifier,
        navigator,
        view,
    }
}

fn approve() -> WidgetScript {
    WidgetScript::ApproveOrder {
        payment_id: "pay_1".into(),
        signature: "sig".into(),
    }
}

#[tokio::test]
async fn test_backend_rejection_shows_reason() {
    let backend = spawn_backend(
        json!({ "success": false, "message": "Insufficient stock" }),
        json!({ "success": true, "order_id": 1 }),
    )
    .await;
    let page = page(&backend, approve());

    let outcome = page.controller.submit().await.unwrap();

    assert!(matches!(
        outcome,
        Outcome::Failed(CheckoutError::OrderCreationFailed(_))
    ));
    assert_eq!(
        page.notifier.notifications(),
        vec![Notification::new("Insufficient stock", Severity::Error)]
    );
    let control = page.view.current().unwrap();
    assert!(control.enabled);
    assert_eq!(control.label, PAY_LABEL);
    assert_eq!(page.widget.opened(), 0);
    assert!(backend.verify_bodies().is_empty());
}

#[tokio::test]
async fn test_verified_payment_redirects_to_success_page() {
    let backend = spawn_backend(
        json!({ "success": true, "order_id": "O1", "amount": 49900, "currency": "INR" }),
        json!({ "success": true, "order_id": "O1" }),
    )
    .await;
    let page = page(&backend, approve());

    let outcome = page.controller.submit().await.unwrap();

    assert!(matches!(outcome, Outcome::Succeeded { .. }));
    assert_eq!(page.navigator.paths(), vec!["/order/success/O1".to_string()]);
    assert_eq!(
        page.notifier.notifications(),
        vec![Notification::new(SUCCESS_MESSAGE, Severity::Success)]
    );
    assert_eq!(
        backend.verify_bodies(),
        vec![json!({
            "razorpay_payment_id": "pay_1",
            "razorpay_order_id": "O1",
            "razorpay_signature": "sig",
        })]
    );

    let opened = page.widget.opened_with();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].amount.value(), 49_900);
    assert_eq!(opened[0].currency, "INR");
    assert_eq!(opened[0].prefill.name, "");

    assert_eq!(
        *backend.log.csrf_tokens.lock().unwrap(),
        vec!["csrf-123".to_string(), "csrf-123".to_string()]
    );
    assert_eq!(backend.log.cookies.lock().unwrap()[0], "session=abc");
}

#[tokio::test]
async fn test_dismissal_is_a_warning_and_skips_verify() {
    let backend = spawn_backend(
        json!({ "success": true, "order_id": "O1", "amount": 49900, "currency": "INR" }),
        json!({ "success": true, "order_id": "O1" }),
    )
    .await;
    let page = page(&backend, WidgetScript::Dismiss);

    let outcome = page.controller.submit().await.unwrap();

    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(
        page.notifier.notifications(),
        vec![Notification::new("Payment cancelled.", Severity::Warning)]
    );
    assert!(backend.verify_bodies().is_empty());
    assert!(page.navigator.paths().is_empty());
    assert_eq!(page.controller.state(), AttemptState::Idle);
    assert!(page.view.current().unwrap().enabled);
}

#[tokio::test]
async fn test_unconfirmed_payment_asks_to_contact_support() {
    let backend = spawn_backend(
        json!({ "success": true, "order_id": "O1", "amount": 49900, "currency": "INR" }),
        json!({ "success": false }),
    )
    .await;
    let page = page(&backend, approve());

    let outcome = page.controller.submit().await.unwrap();

    assert!(matches!(
        outcome,
        Outcome::Failed(CheckoutError::VerificationFailed(_))
    ));
    let notes = page.notifier.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Error);
    assert_eq!(
        notes[0].message,
        "Payment verification failed. Contact support."
    );
    assert_ne!(notes[0].message, "Payment cancelled.");
    assert!(page.navigator.paths().is_empty());
    let control = page.view.current().unwrap();
    assert!(control.enabled);
    assert_eq!(control.label, PAY_LABEL);
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = FakeBackend {
        base_url: format!("http://{}", addr),
        log: Default::default(),
    };
    let page = page(&backend, approve());

    let outcome = page.controller.submit().await.unwrap();

    assert!(matches!(outcome, Outcome::Failed(CheckoutError::Transport(_))));
    assert_eq!(
        page.notifier.notifications(),
        vec![Notification::new(
            "Network error. Please try again.",
            Severity::Error
        )]
    );
    assert_eq!(page.widget.opened(), 0);
}

#[tokio::test]
async fn test_success_without_order_id_never_opens_widget() {
    let backend = spawn_backend(
        json!({ "success": true, "order_id": "", "amount": 49900, "currency": "INR" }),
        json!({ "success": true, "order_id": "O1" }),
    )
    .await;
    let page = page(&backend, approve());

    let outcome = page.controller.submit().await.unwrap();

    assert!(matches!(
        outcome,
        Outcome::Failed(CheckoutError::OrderCreationFailed(None))
    ));
    assert_eq!(page.widget.opened(), 0);
    assert_eq!(
        page.notifier.notifications(),
        vec![Notification::new("Payment setup failed", Severity::Error)]
    );
}

#[tokio::test]
async fn test_backend_under_path_prefix_is_reached() {
    let backend = spawn_backend_with(
        json!({ "success": true, "order_id": "O1", "amount": 49900, "currency": "INR" }),
        json!({ "success": true, "order_id": "O1" }),
        BackendOptions {
            prefix: "/shop",
            ..Default::default()
        },
    )
    .await;
    assert!(backend.base_url.ends_with("/shop"));
    let page = page(&backend, approve());

    let outcome = page.controller.submit().await.unwrap();

    assert!(matches!(outcome, Outcome::Succeeded { .. }));
    assert_eq!(backend.create_calls(), 1);
    assert_eq!(backend.verify_bodies().len(), 1);
    assert_eq!(page.navigator.paths(), vec!["/order/success/O1".to_string()]);
}

#[tokio::test]
async fn test_hung_order_creation_times_out_as_network_error() {
    let backend = spawn_backend_with(
        json!({ "success": true, "order_id": "O1", "amount": 49900, "currency": "INR" }),
        json!({ "success": true, "order_id": "O1" }),
        BackendOptions {
            create_delay: Duration::from_secs(3),
            ..Default::default()
        },
    )
    .await;
    let page = page_with_timeout(&backend, approve(), Some(1));

    let outcome = page.controller.submit().await.unwrap();

    assert!(matches!(outcome, Outcome::Failed(CheckoutError::Transport(_))));
    assert_eq!(
        page.notifier.notifications(),
        vec![Notification::new(
            "Network error. Please try again.",
            Severity::Error
        )]
    );
    let control = page.view.current().unwrap();
    assert!(control.enabled);
    assert_eq!(control.label, PAY_LABEL);
    assert_eq!(page.widget.opened(), 0);
    assert_eq!(page.controller.state(), AttemptState::Idle);
}

#[tokio::test]
async fn test_hung_verification_times_out_as_unconfirmed_payment() {
    let backend = spawn_backend_with(
        json!({ "success": true, "order_id": "O1", "amount": 49900, "currency": "INR" }),
        json!({ "success": true, "order_id": "O1" }),
        BackendOptions {
            verify_delay: Duration::from_secs(3),
            ..Default::default()
        },
    )
    .await;
    let page = page_with_timeout(&backend, approve(), Some(1));

    let outcome = page.controller.submit().await.unwrap();

    assert!(matches!(
        outcome,
        Outcome::Failed(CheckoutError::VerificationFailed(_))
    ));
    assert_eq!(
        page.notifier.notifications(),
        vec![Notification::new(
            "Payment verification failed. Contact support.",
            Severity::Error
        )]
    );
    assert_eq!(backend.verify_bodies().len(), 1);
    assert!(page.navigator.paths().is_empty());
    assert!(page.view.current().unwrap().enabled);
}
