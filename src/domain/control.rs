use super::attempt::AttemptState;
use rust_decimal::Decimal;

pub const PROCESSING_LABEL: &str = "Processing...";
pub const REDIRECTING_LABEL: &str = "Redirecting...";

/// Rendered state of the pay button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    pub label: String,
}

/// Amount shown on the idle pay button. Display only: the charge amount
/// always comes from the backend's order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayLabel {
    amount: Decimal,
    currency_symbol: String,
}

impl PayLabel {
    pub fn new(amount: Decimal, currency_symbol: impl Into<String>) -> Self {
        Self {
            amount,
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn text(&self) -> String {
        format!(
            "Pay {}{} Securely",
            self.currency_symbol,
            self.amount.round_dp(2)
        )
    }

    /// Derives the button for `state`.
    ///
    /// `Failed` and `Cancelled` render like `Idle` because they hand control
    /// straight back to the user.
    pub fn control_for(&self, state: AttemptState) -> SubmitControl {
        match state {
            AttemptState::Idle | AttemptState::Failed | AttemptState::Cancelled => SubmitControl {
                enabled: true,
                label: self.text(),
            },
            AttemptState::CreatingOrder | AttemptState::AwaitingGateway | AttemptState::Verifying => {
                SubmitControl {
                    enabled: false,
                    label: PROCESSING_LABEL.to_string(),
                }
            }
            AttemptState::Succeeded => SubmitControl {
                enabled: false,
                label: REDIRECTING_LABEL.to_string(),
            },
        }
    }
}
