//! Domain layer: the payment attempt state machine, the values it carries,
//! and the ports through which it talks to the backend, the gateway widget
//! and the page.

pub mod attempt;
pub mod control;
pub mod gateway;
pub mod notification;
pub mod order;
pub mod ports;
