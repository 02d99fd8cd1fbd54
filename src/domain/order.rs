use crate::error::{CheckoutError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-issued identifier of the payable order (the gateway order id).
///
/// Never empty: the widget must not be opened without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderRef(String);

impl OrderRef {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(CheckoutError::OrderCreationFailed(None))
        } else {
            Ok(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Charge amount in the currency's smallest unit, exactly as the backend
/// issued it. The client never recomputes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MinorUnits(pub u64);

impl MinorUnits {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A successful create-order response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCreated {
    pub order_ref: OrderRef,
    pub amount: MinorUnits,
    pub currency: String,
}

/// Canonical shop order id returned by a successful verification; the
/// success page lives under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedOrderId(String);

impl VerifiedOrderId {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(CheckoutError::VerificationFailed(
                "backend confirmed payment without an order id".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the order success page.
    pub fn success_path(&self) -> String {
        format!("/order/success/{}", self.0)
    }
}

impl fmt::Display for VerifiedOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
