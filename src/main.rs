use checkout_flow::application::flow::{FlowController, FlowPorts, Outcome};
use checkout_flow::config::CheckoutConfig;
use checkout_flow::infrastructure::http::{HttpBackend, StaticCsrfToken};
use checkout_flow::infrastructure::simulated::{SimulatedCheckout, WidgetScript};
use checkout_flow::interfaces::console::{ConsoleNavigator, ConsoleNotifier, LoggingControlView};
use checkout_flow::telemetry;
use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Simulate {
    Approve,
    Reject,
    Dismiss,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Checkout configuration file (JSON)
    #[arg(long, env = "CHECKOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the shop backend. Overrides the config file.
    #[arg(long, env = "CHECKOUT_BACKEND_URL")]
    backend_url: Option<String>,

    /// Public key of the hosted checkout. Overrides the config file.
    #[arg(long, env = "CHECKOUT_GATEWAY_KEY")]
    gateway_key: Option<String>,

    #[arg(long, env = "CHECKOUT_SESSION_COOKIE", hide_env_values = true)]
    session_cookie: Option<String>,

    #[arg(long, env = "CHECKOUT_CSRF_TOKEN", hide_env_values = true)]
    csrf_token: Option<String>,

    /// Give up on a backend call after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// What the simulated user does in the checkout widget.
    #[arg(long, value_enum, default_value_t = Simulate::Approve)]
    simulate: Simulate,

    #[arg(long, default_value = "pay_simulated")]
    payment_id: String,

    #[arg(long, default_value = "")]
    signature: String,

    /// Gateway error description when simulating a rejection.
    #[arg(long)]
    reject_reason: Option<String>,
}

impl Cli {
    fn load_config(&self) -> Result<CheckoutConfig> {
        let mut config = match &self.config {
            Some(path) => CheckoutConfig::load(path).into_diagnostic()?,
            None => CheckoutConfig::default(),
        };
        if let Some(url) = &self.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(key) = &self.gateway_key {
            config.gateway_key = key.clone();
        }
        if let Some(cookie) = &self.session_cookie {
            config.session_cookie = Some(cookie.clone());
        }
        if let Some(token) = &self.csrf_token {
            config.csrf_token = Some(token.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = Some(secs);
        }
        config.validate().into_diagnostic()?;
        Ok(config)
    }

    fn widget_script(&self) -> WidgetScript {
        match self.simulate {
            Simulate::Approve => WidgetScript::ApproveOrder {
                payment_id: self.payment_id.clone(),
                signature: self.signature.clone(),
            },
            Simulate::Reject => WidgetScript::Reject(self.reject_reason.clone()),
            Simulate::Dismiss => WidgetScript::Dismiss,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    telemetry::init();
    let cli = Cli::parse();
    let config = cli.load_config()?;

    let csrf = Arc::new(StaticCsrfToken::new(
        config.csrf_token.clone().unwrap_or_default(),
    ));
    let backend = Arc::new(HttpBackend::new(&config, csrf).into_diagnostic()?);

    let controller = FlowController::new(
        config.pay_label(),
        config.profile(),
        FlowPorts {
            initiator: backend.clone(),
            verifier: backend,
            widget: Arc::new(SimulatedCheckout::new(cli.widget_script())),
            notifier: Arc::new(ConsoleNotifier::new(io::stderr())),
            navigator: Arc::new(ConsoleNavigator::new(io::stdout())),
            view: Arc::new(LoggingControlView),
        },
    );

    match controller.submit().await.into_diagnostic()? {
        Outcome::Succeeded { .. } => Ok(ExitCode::SUCCESS),
        Outcome::Cancelled => Ok(ExitCode::from(2)),
        Outcome::Failed(_) => Ok(ExitCode::FAILURE),
    }
}
