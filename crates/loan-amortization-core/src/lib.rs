//! Loan amortization with decimal precision.
//!
//! Builds month-by-month amortization schedules, projects payoff under an
//! additional principal payment, and computes level payments for new loans.
//! Pure computation: no I/O and no shared state between calls.

pub mod amortization;
pub mod error;
pub mod presentation;
pub mod types;

pub use error::AmortizationError;
pub use types::*;

/// Standard result type for all amortization operations
pub type AmortizationResult<T> = Result<T, AmortizationError>;
