use crate::domain::control::SubmitControl;
use crate::domain::notification::Notification;
use crate::domain::ports::{Navigator, Notifier, SubmitControlView};
use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Prints toasts as `[severity] message` lines.
pub struct ConsoleNotifier<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Notifier for ConsoleNotifier<W> {
    fn notify(&self, notification: Notification) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "[{}] {}", notification.severity, notification.message) {
            tracing::warn!(error = %e, "failed to write notification");
        }
    }
}

/// Prints the navigation target; the caller decides where to go with it.
pub struct ConsoleNavigator<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> ConsoleNavigator<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Navigator for ConsoleNavigator<W> {
    fn navigate(&self, path: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{}", path) {
            tracing::warn!(error = %e, "failed to write navigation target");
        }
    }
}

/// Traces every pay button rendering.
#[derive(Debug, Default)]
pub struct LoggingControlView;

impl SubmitControlView for LoggingControlView {
    fn render(&self, control: &SubmitControl) {
        tracing::debug!(enabled = control.enabled, label = %control.label, "pay button");
    }
}
