//! Payoff projections that track only scalars (month count, interest), not a
//! full schedule.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use super::validation::{
    checked_amount, require_annual_rate, require_covers_interest, require_max_months,
    require_non_negative, require_positive, MONTHS_PER_YEAR,
};
use super::{DEFAULT_MAX_MONTHS, LONG_PAYOFF_MONTHS, SETTLEMENT_TOLERANCE};
use crate::error::AmortizationError;
use crate::presentation::YearsMonths;
use crate::types::{with_metadata, ComputationOutput, Money, Months, Rate};
use crate::AmortizationResult;

/// Months and interest needed to retire a balance at a fixed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffSummary {
    pub months_to_payoff: Months,
    pub total_interest_paid: Money,
}

/// Projection at the current payment, splitting out the final partial payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingTerm {
    /// Payments made at the full monthly amount.
    pub full_payments: Months,
    /// Size of the last, smaller payment; zero if the balance lands exactly on
    /// a full payment.
    pub final_payment: Money,
    pub months_to_payoff: Months,
    pub total_interest_paid: Money,
}

/// Project months to payoff and total interest at `modified_monthly_payment`.
///
/// `monthly_rate` is already divided by 12. The overshoot in the final month
/// is clamped away rather than refunded, as is any sub-micro residual left by
/// Decimal rounding.
pub fn project_payoff(
    principal: Money,
    monthly_rate: Rate,
    modified_monthly_payment: Money,
) -> AmortizationResult<PayoffSummary> {
    project_payoff_capped(
        principal,
        monthly_rate,
        modified_monthly_payment,
        DEFAULT_MAX_MONTHS,
    )
}

/// [`project_payoff`] with an explicit month cap.
pub fn project_payoff_capped(
    principal: Money,
    monthly_rate: Rate,
    modified_monthly_payment: Money,
    max_months: Months,
) -> AmortizationResult<PayoffSummary> {
    require_positive("principal", principal)?;
    require_non_negative("monthly_rate", monthly_rate)?;
    require_positive("modified_monthly_payment", modified_monthly_payment)?;
    require_max_months(max_months)?;
    require_covers_interest(principal, monthly_rate, modified_monthly_payment)?;

    let mut balance = principal;
    let mut months: Months = 0;
    let mut total_interest = Decimal::ZERO;

    while balance > Decimal::ZERO {
        if months >= max_months {
            return Err(cap_exceeded("project_payoff", max_months, balance));
        }
        let interest = balance * monthly_rate;
        balance -= modified_monthly_payment - interest;
        months += 1;
        total_interest = checked_amount("principal", total_interest.checked_add(interest))?;

        if balance < SETTLEMENT_TOLERANCE {
            balance = Decimal::ZERO;
        }
    }

    debug!(months, total_interest = %total_interest, "payoff projection complete");

    Ok(PayoffSummary {
        months_to_payoff: months,
        total_interest_paid: total_interest,
    })
}

/// Months remaining at the current payment, with the last payment broken out.
pub fn remaining_term(
    principal: Money,
    annual_rate: Rate,
    monthly_payment: Money,
) -> AmortizationResult<RemainingTerm> {
    remaining_term_capped(principal, annual_rate, monthly_payment, DEFAULT_MAX_MONTHS)
}

/// [`remaining_term`] with an explicit month cap.
pub fn remaining_term_capped(
    principal: Money,
    annual_rate: Rate,
    monthly_payment: Money,
    max_months: Months,
) -> AmortizationResult<RemainingTerm> {
    require_positive("principal", principal)?;
    require_annual_rate("annual_rate", annual_rate)?;
    require_positive("monthly_payment", monthly_payment)?;
    require_max_months(max_months)?;

    let monthly_rate = annual_rate / MONTHS_PER_YEAR;
    require_covers_interest(principal, monthly_rate, monthly_payment)?;

    let mut balance = principal;
    let mut full_payments: Months = 0;
    let mut final_payment = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;

    while balance > Decimal::ZERO {
        if full_payments >= max_months {
            return Err(cap_exceeded("remaining_term", max_months, balance));
        }
        let interest = balance * monthly_rate;
        total_interest = checked_amount("principal", total_interest.checked_add(interest))?;

        let amount_due = checked_amount("principal", balance.checked_add(interest))?;
        if amount_due < monthly_payment {
            final_payment = amount_due;
            break;
        }
        balance = amount_due - monthly_payment;
        if balance < SETTLEMENT_TOLERANCE {
            balance = Decimal::ZERO;
        }
        full_payments += 1;
    }

    let months_to_payoff = if final_payment.is_zero() {
        full_payments
    } else {
        full_payments + 1
    };

    Ok(RemainingTerm {
        full_payments,
        final_payment,
        months_to_payoff,
        total_interest_paid: total_interest,
    })
}

fn cap_exceeded(function: &str, max_months: Months, balance: Money) -> AmortizationError {
    warn!(function, max_months, remaining_balance = %balance, "projection hit month cap");
    AmortizationError::IterationLimitExceeded {
        function: function.into(),
        iterations: max_months,
        remaining_balance: balance,
    }
}

// ---------------------------------------------------------------------------
// Envelope API
// ---------------------------------------------------------------------------

/// Serializable payoff request. Takes the annual rate, unlike
/// [`project_payoff`], since that is what callers collect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffInput {
    pub principal: Money,
    pub annual_rate: Rate,
    pub monthly_payment: Money,
    #[serde(default)]
    pub additional_payment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_months: Option<Months>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffOutput {
    pub modified_monthly_payment: Money,
    pub months_to_payoff: Months,
    pub time_to_payoff: YearsMonths,
    pub total_interest_paid: Money,
    pub remaining_term: RemainingTerm,
}

/// Payoff projection plus the months-remaining breakdown, in the standard envelope.
pub fn analyze_payoff(input: &PayoffInput) -> AmortizationResult<ComputationOutput<PayoffOutput>> {
    let start = Instant::now();
    require_annual_rate("annual_rate", input.annual_rate)?;
    require_positive("monthly_payment", input.monthly_payment)?;
    require_non_negative("additional_payment", input.additional_payment)?;
    let max_months = input.max_months.unwrap_or(DEFAULT_MAX_MONTHS);

    let modified = checked_amount(
        "additional_payment",
        input.monthly_payment.checked_add(input.additional_payment),
    )?;
    let monthly_rate = input.annual_rate / MONTHS_PER_YEAR;
    let summary = project_payoff_capped(input.principal, monthly_rate, modified, max_months)?;
    let term = remaining_term_capped(input.principal, input.annual_rate, modified, max_months)?;

    let mut warnings = Vec::new();
    if summary.months_to_payoff > LONG_PAYOFF_MONTHS {
        warnings.push(format!(
            "Payoff takes {} months; payment barely exceeds interest",
            summary.months_to_payoff
        ));
    }

    let output = PayoffOutput {
        modified_monthly_payment: modified,
        months_to_payoff: summary.months_to_payoff,
        time_to_payoff: YearsMonths::from_months(summary.months_to_payoff),
        total_interest_paid: summary.total_interest_paid,
        remaining_term: term,
    };

    Ok(with_metadata(
        "Fixed-payment payoff projection",
        input,
        warnings,
        start,
        output,
    ))
}
