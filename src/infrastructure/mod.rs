//! Adapters behind the domain ports: the shop backend over HTTP, a simulated
//! checkout widget, and in-memory collaborators for wiring and tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod http;
pub mod in_memory;
pub mod simulated;

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
