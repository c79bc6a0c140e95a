use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmortizationError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient payment: {payment} does not exceed first-month interest of {first_month_interest}; the loan would never be repaid")]
    InsufficientPayment {
        payment: Decimal,
        first_month_interest: Decimal,
    },

    #[error("Iteration limit exceeded: {function} did not reach a zero balance within {iterations} months (remaining balance: {remaining_balance})")]
    IterationLimitExceeded {
        function: String,
        iterations: u32,
        remaining_balance: Decimal,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for AmortizationError {
    fn from(e: serde_json::Error) -> Self {
        AmortizationError::SerializationError(e.to_string())
    }
}
