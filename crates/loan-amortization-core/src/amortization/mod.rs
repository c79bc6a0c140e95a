pub mod analysis;
pub mod level_payment;
pub mod payoff;
pub mod schedule;
mod validation;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::Months;

/// Month cap applied to every projection unless overridden (100 years).
pub const DEFAULT_MAX_MONTHS: Months = 1200;

/// Balances below this after a payment are treated as settled. Absorbs the
/// last-digit rounding of 28-digit Decimal arithmetic so a level payment
/// retires its loan in exactly the scheduled number of months.
pub const SETTLEMENT_TOLERANCE: Decimal = dec!(0.000001);

/// Payoffs longer than this (30 years) are flagged in analysis warnings.
pub(crate) const LONG_PAYOFF_MONTHS: Months = 360;

pub use analysis::{analyze_existing_loan, analyze_new_purchase};
pub use level_payment::compute_level_payment;
pub use payoff::{project_payoff, remaining_term, PayoffSummary, RemainingTerm};
pub use schedule::{build_schedule, AmortizationSchedule, PaymentRecord};
