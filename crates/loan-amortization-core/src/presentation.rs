//! Presentation boundary: rounding and human-readable formatting.
//!
//! The engine never rounds. Front ends call [`RoundForDisplay::rounded`] on a
//! result just before showing it; rates and counts pass through unchanged.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amortization::analysis::{ExistingLoanOutput, NewPurchaseOutput, PayoffProjection};
use crate::amortization::level_payment::LevelPaymentOutput;
use crate::amortization::payoff::{PayoffOutput, PayoffSummary, RemainingTerm};
use crate::amortization::schedule::{PaymentRecord, ScheduleOutput};
use crate::types::{Money, Months};

const CURRENCY_DP: u32 = 2;

/// Round a monetary amount to cents, half away from zero, always carrying
/// two decimal places (`100` becomes `100.00`).
pub fn round_money(amount: Money) -> Money {
    let mut rounded =
        amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CURRENCY_DP);
    rounded
}

/// `$1,234,567.89`; negatives as `-$1,234.50`.
pub fn format_currency(amount: Money) -> String {
    let rounded = round_money(amount);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}

/// A month count split into whole years and leftover months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearsMonths {
    pub years: Months,
    pub months: Months,
}

impl YearsMonths {
    pub fn from_months(total: Months) -> Self {
        Self {
            years: total / 12,
            months: total % 12,
        }
    }
}

impl fmt::Display for YearsMonths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |n: Months| if n == 1 { "" } else { "s" };
        write!(
            f,
            "{} year{} and {} month{}",
            self.years,
            plural(self.years),
            self.months,
            plural(self.months)
        )
    }
}

/// Copy of a result with every monetary field rounded to cents.
pub trait RoundForDisplay {
    fn rounded(&self) -> Self;
}

fn round_opt(amount: Option<Decimal>) -> Option<Decimal> {
    amount.map(round_money)
}

impl RoundForDisplay for PaymentRecord {
    fn rounded(&self) -> Self {
        Self {
            payment_number: self.payment_number,
            principal_paid: round_money(self.principal_paid),
            interest_paid: round_money(self.interest_paid),
            cumulative_interest: round_money(self.cumulative_interest),
            remaining_balance: round_money(self.remaining_balance),
        }
    }
}

impl RoundForDisplay for Vec<PaymentRecord> {
    fn rounded(&self) -> Self {
        self.iter().map(RoundForDisplay::rounded).collect()
    }
}

impl RoundForDisplay for PayoffSummary {
    fn rounded(&self) -> Self {
        Self {
            months_to_payoff: self.months_to_payoff,
            total_interest_paid: round_money(self.total_interest_paid),
        }
    }
}

impl RoundForDisplay for RemainingTerm {
    fn rounded(&self) -> Self {
        Self {
            final_payment: round_money(self.final_payment),
            total_interest_paid: round_money(self.total_interest_paid),
            ..*self
        }
    }
}

impl RoundForDisplay for PayoffProjection {
    fn rounded(&self) -> Self {
        Self {
            monthly_payment: round_money(self.monthly_payment),
            total_interest_paid: round_money(self.total_interest_paid),
            ..self.clone()
        }
    }
}

impl RoundForDisplay for ScheduleOutput {
    fn rounded(&self) -> Self {
        Self {
            monthly_payment: round_money(self.monthly_payment),
            number_of_payments: self.number_of_payments,
            total_interest_paid: round_money(self.total_interest_paid),
            total_paid: round_money(self.total_paid),
            schedule: self.schedule.rounded(),
        }
    }
}

impl RoundForDisplay for PayoffOutput {
    fn rounded(&self) -> Self {
        Self {
            modified_monthly_payment: round_money(self.modified_monthly_payment),
            months_to_payoff: self.months_to_payoff,
            time_to_payoff: self.time_to_payoff,
            total_interest_paid: round_money(self.total_interest_paid),
            remaining_term: self.remaining_term.rounded(),
        }
    }
}

impl RoundForDisplay for LevelPaymentOutput {
    fn rounded(&self) -> Self {
        Self {
            monthly_payment: round_money(self.monthly_payment),
            total_paid: round_money(self.total_paid),
            total_interest: round_money(self.total_interest),
        }
    }
}

impl RoundForDisplay for ExistingLoanOutput {
    fn rounded(&self) -> Self {
        Self {
            modified_monthly_payment: round_money(self.modified_monthly_payment),
            baseline: self.baseline.as_ref().map(RoundForDisplay::rounded),
            with_additional: self.with_additional.rounded(),
            months_saved: self.months_saved,
            interest_saved: round_opt(self.interest_saved),
            total_cost_with_additional: round_money(self.total_cost_with_additional),
            total_paid_with_additional: round_money(self.total_paid_with_additional),
            schedule: self.schedule.rounded(),
        }
    }
}

impl RoundForDisplay for NewPurchaseOutput {
    fn rounded(&self) -> Self {
        Self {
            principal: round_money(self.principal),
            loan_to_value: self.loan_to_value,
            term_months: self.term_months,
            monthly_payment: round_money(self.monthly_payment),
            total_cost: round_money(self.total_cost),
            total_interest: round_money(self.total_interest),
            with_additional: self.with_additional.rounded(),
            total_cost_with_additional: round_money(self.total_cost_with_additional),
            months_saved: self.months_saved,
            interest_saved: round_money(self.interest_saved),
            schedule: self.schedule.rounded(),
        }
    }
}
