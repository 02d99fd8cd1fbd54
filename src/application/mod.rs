//! Application layer: drives one payment attempt across the backend and the
//! hosted checkout widget.
//!
//! `FlowController` owns the attempt and is the only place that changes the
//! pay button. `CheckoutAdapter` turns the widget's callbacks into a single
//! awaited outcome.

pub mod checkout;
pub mod flow;
