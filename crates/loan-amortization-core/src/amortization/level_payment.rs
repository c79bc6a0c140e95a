use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::validation::{checked_amount, require_annual_rate, require_positive, MONTHS_PER_YEAR};
use crate::error::AmortizationError;
use crate::types::{with_metadata, ComputationOutput, Money, Months, Rate};
use crate::AmortizationResult;

/// Level monthly payment that fully amortizes `principal` over `term_months`.
///
/// `payment = P * r / (1 - (1 + r)^-n)` with `r = annual_rate / 12`; at a
/// zero rate this degenerates to `P / n`.
///
/// Decimal carries 28 significant digits. At high rates over very long terms
/// `(1 + r)^-n` vanishes below that precision and the payment collapses to
/// pure interest; such terms are rejected as `InvalidInput` on `term_months`.
/// Just short of that point the payment is short by less than the last digit,
/// and a fixed-payment projection can run a month or two past the term.
pub fn compute_level_payment(
    principal: Money,
    annual_rate: Rate,
    term_months: Months,
) -> AmortizationResult<Money> {
    require_positive("principal", principal)?;
    require_annual_rate("annual_rate", annual_rate)?;
    if term_months == 0 {
        return Err(AmortizationError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be at least one month".into(),
        });
    }

    let n = Decimal::from(term_months);
    let monthly_rate = annual_rate / MONTHS_PER_YEAR;
    if monthly_rate.is_zero() {
        return Ok(principal / n);
    }

    // (1 + r)^n overflows Decimal for long terms at high rates; the discount
    // term is then indistinguishable from zero.
    let discount = match (Decimal::ONE + monthly_rate).checked_powu(u64::from(term_months)) {
        Some(growth) => Decimal::ONE / growth,
        None => Decimal::ZERO,
    };

    let interest = principal * monthly_rate;
    let payment = checked_amount("principal", interest.checked_div(Decimal::ONE - discount))?;
    if payment <= interest {
        return Err(AmortizationError::InvalidInput {
            field: "term_months".into(),
            reason: format!(
                "Term of {term_months} months is too long to amortize at this rate \
                 with 28-digit decimal precision"
            ),
        });
    }
    Ok(payment)
}

/// Convert a loan term in years to whole months.
pub fn term_years_to_months(term_years: Decimal) -> AmortizationResult<Months> {
    let months = term_years * MONTHS_PER_YEAR;
    if months <= Decimal::ZERO {
        return Err(AmortizationError::InvalidInput {
            field: "term_years".into(),
            reason: "Term must be positive".into(),
        });
    }
    if !months.fract().is_zero() {
        return Err(AmortizationError::InvalidInput {
            field: "term_years".into(),
            reason: format!("Term of {term_years} years is not a whole number of months"),
        });
    }
    months.to_u32().ok_or_else(|| AmortizationError::InvalidInput {
        field: "term_years".into(),
        reason: "Term is too long".into(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelPaymentInput {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: Months,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelPaymentOutput {
    pub monthly_payment: Money,
    /// Payment times term; ignores the final-payment rounding a lender would apply.
    pub total_paid: Money,
    pub total_interest: Money,
}

pub fn analyze_level_payment(
    input: &LevelPaymentInput,
) -> AmortizationResult<ComputationOutput<LevelPaymentOutput>> {
    let start = Instant::now();
    let monthly_payment =
        compute_level_payment(input.principal, input.annual_rate, input.term_months)?;
    let total_paid = checked_amount(
        "principal",
        monthly_payment.checked_mul(Decimal::from(input.term_months)),
    )?;

    let mut warnings = Vec::new();
    if input.annual_rate.is_zero() {
        warnings.push("Zero interest rate: payment is principal / term".into());
    }

    let output = LevelPaymentOutput {
        monthly_payment,
        total_paid,
        total_interest: total_paid - input.principal,
    };

    Ok(with_metadata(
        "Level-payment annuity (P x r / (1 - (1 + r)^-n))",
        input,
        warnings,
        start,
        output,
    ))
}
