//! Existing-loan and new-purchase analyses.
//!
//! Each analysis compares the payoff timeline at the required payment with
//! the timeline under an additional monthly principal payment, and returns the
//! full schedule at the modified payment. Everything is carried in full
//! precision; round with [`crate::presentation`] before display.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::level_payment::{compute_level_payment, term_years_to_months};
use super::payoff::{project_payoff_capped, PayoffSummary};
use super::schedule::{build_schedule, PaymentRecord};
use super::validation::{
    checked_amount, require_annual_rate, require_max_months, require_non_negative, require_positive,
    MONTHS_PER_YEAR,
};
use super::{DEFAULT_MAX_MONTHS, LONG_PAYOFF_MONTHS};
use crate::error::AmortizationError;
use crate::presentation::YearsMonths;
use crate::types::{with_metadata, ComputationOutput, Money, Months, Rate};
use crate::AmortizationResult;

/// Loan-to-value above which a purchase is flagged.
const HIGH_LTV: Decimal = dec!(0.80);

// ---------------------------------------------------------------------------
// Shared output pieces
// ---------------------------------------------------------------------------

/// A payoff projection with its years-and-months breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffProjection {
    pub monthly_payment: Money,
    pub months_to_payoff: Months,
    pub time_to_payoff: YearsMonths,
    pub total_interest_paid: Money,
}

impl PayoffProjection {
    fn new(monthly_payment: Money, summary: PayoffSummary) -> Self {
        Self {
            monthly_payment,
            months_to_payoff: summary.months_to_payoff,
            time_to_payoff: YearsMonths::from_months(summary.months_to_payoff),
            total_interest_paid: summary.total_interest_paid,
        }
    }
}

// ---------------------------------------------------------------------------
// Existing loan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingLoanInput {
    /// Principal still owed.
    pub current_balance: Money,
    pub annual_rate: Rate,
    /// Required monthly payment (interest + principal).
    pub monthly_payment: Money,
    #[serde(default)]
    pub additional_payment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_months: Option<Months>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingLoanOutput {
    pub modified_monthly_payment: Money,
    /// Projection at the required payment alone; absent when that payment does
    /// not cover interest.
    pub baseline: Option<PayoffProjection>,
    pub with_additional: PayoffProjection,
    pub months_saved: Option<Months>,
    pub interest_saved: Option<Money>,
    /// Modified payment times months to payoff.
    pub total_cost_with_additional: Money,
    /// Balance plus interest: what is actually paid once the last payment is clipped.
    pub total_paid_with_additional: Money,
    pub schedule: Vec<PaymentRecord>,
}

/// Analyse an existing loan with an optional extra principal payment.
pub fn analyze_existing_loan(
    input: &ExistingLoanInput,
) -> AmortizationResult<ComputationOutput<ExistingLoanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_positive("current_balance", input.current_balance)?;
    require_annual_rate("annual_rate", input.annual_rate)?;
    require_positive("monthly_payment", input.monthly_payment)?;
    require_non_negative("additional_payment", input.additional_payment)?;
    let max_months = input.max_months.unwrap_or(DEFAULT_MAX_MONTHS);
    require_max_months(max_months)?;

    let monthly_rate = input.annual_rate / MONTHS_PER_YEAR;
    let modified = checked_amount(
        "additional_payment",
        input.monthly_payment.checked_add(input.additional_payment),
    )?;

    let with_additional = PayoffProjection::new(
        modified,
        project_payoff_capped(input.current_balance, monthly_rate, modified, max_months)?,
    );

    let baseline = match project_payoff_capped(
        input.current_balance,
        monthly_rate,
        input.monthly_payment,
        max_months,
    ) {
        Ok(summary) => Some(PayoffProjection::new(input.monthly_payment, summary)),
        Err(AmortizationError::InsufficientPayment {
            first_month_interest,
            ..
        }) => {
            warnings.push(format!(
                "Required payment alone does not cover first-month interest of {}; \
                 no baseline comparison",
                first_month_interest.round_dp(2)
            ));
            None
        }
        Err(AmortizationError::IterationLimitExceeded { iterations, .. }) => {
            warnings.push(format!(
                "Required payment alone does not retire the loan within {iterations} months; \
                 no baseline comparison"
            ));
            None
        }
        Err(e) => return Err(e),
    };

    let months_saved = baseline
        .as_ref()
        .map(|b| b.months_to_payoff.saturating_sub(with_additional.months_to_payoff));
    let interest_saved = baseline
        .as_ref()
        .map(|b| b.total_interest_paid - with_additional.total_interest_paid);

    let schedule = build_schedule(
        input.current_balance,
        input.annual_rate,
        input.monthly_payment,
        input.additional_payment,
    )?
    .with_max_months(max_months)
    .collect_records()?;

    if input.additional_payment.is_zero() {
        warnings.push("No additional payment: projection equals the current schedule".into());
    }
    if input.annual_rate.is_zero() {
        warnings.push("Zero interest rate: additional payments save time but no interest".into());
    }
    if with_additional.months_to_payoff > LONG_PAYOFF_MONTHS {
        warnings.push(format!(
            "Payoff takes {} even with the additional payment",
            with_additional.time_to_payoff
        ));
    }

    debug!(
        months = with_additional.months_to_payoff,
        months_saved = ?months_saved,
        "existing loan analysis complete"
    );

    let total_cost_with_additional = checked_amount(
        "monthly_payment",
        modified.checked_mul(Decimal::from(with_additional.months_to_payoff)),
    )?;
    let total_paid_with_additional = checked_amount(
        "current_balance",
        input
            .current_balance
            .checked_add(with_additional.total_interest_paid),
    )?;

    let output = ExistingLoanOutput {
        modified_monthly_payment: modified,
        total_cost_with_additional,
        total_paid_with_additional,
        baseline,
        with_additional,
        months_saved,
        interest_saved,
        schedule,
    };

    Ok(with_metadata(
        "Existing loan payoff comparison with additional principal",
        input,
        warnings,
        start,
        output,
    ))
}

// ---------------------------------------------------------------------------
// New purchase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchaseInput {
    pub purchase_price: Money,
    #[serde(default)]
    pub down_payment: Money,
    pub annual_rate: Rate,
    /// Loan term in years; must convert to a whole number of months.
    pub term_years: Decimal,
    #[serde(default)]
    pub additional_payment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_months: Option<Months>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchaseOutput {
    pub principal: Money,
    pub loan_to_value: Rate,
    pub term_months: Months,
    /// Level payment (interest + principal) over the full term.
    pub monthly_payment: Money,
    /// Down payment plus every level payment over the term.
    pub total_cost: Money,
    pub total_interest: Money,
    pub with_additional: PayoffProjection,
    /// Down payment plus modified payment times months to payoff.
    pub total_cost_with_additional: Money,
    pub months_saved: Months,
    pub interest_saved: Money,
    pub schedule: Vec<PaymentRecord>,
}

/// Analyse a new purchase loan: level payment, total cost, and the effect of
/// an additional monthly principal payment.
pub fn analyze_new_purchase(
    input: &NewPurchaseInput,
) -> AmortizationResult<ComputationOutput<NewPurchaseOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_positive("purchase_price", input.purchase_price)?;
    require_non_negative("down_payment", input.down_payment)?;
    if input.down_payment >= input.purchase_price {
        return Err(AmortizationError::InvalidInput {
            field: "down_payment".into(),
            reason: "Down payment must be less than the purchase price".into(),
        });
    }
    require_annual_rate("annual_rate", input.annual_rate)?;
    if input.term_years < Decimal::ONE {
        return Err(AmortizationError::InvalidInput {
            field: "term_years".into(),
            reason: "Term must be at least one year".into(),
        });
    }
    require_non_negative("additional_payment", input.additional_payment)?;
    let max_months = input.max_months.unwrap_or(DEFAULT_MAX_MONTHS);
    require_max_months(max_months)?;

    let principal = input.purchase_price - input.down_payment;
    let term_months = term_years_to_months(input.term_years)?;
    let loan_to_value = principal / input.purchase_price;

    let monthly_payment = compute_level_payment(principal, input.annual_rate, term_months)
        .map_err(|e| match e {
            AmortizationError::InvalidInput { field, reason } if field == "term_months" => {
                AmortizationError::InvalidInput {
                    field: "term_years".into(),
                    reason,
                }
            }
            other => other,
        })?;
    let scheduled_total = checked_amount(
        "purchase_price",
        monthly_payment.checked_mul(Decimal::from(term_months)),
    )?;
    let total_interest = scheduled_total - principal;

    let monthly_rate = input.annual_rate / MONTHS_PER_YEAR;
    let modified = checked_amount(
        "additional_payment",
        monthly_payment.checked_add(input.additional_payment),
    )?;
    let with_additional = PayoffProjection::new(
        modified,
        project_payoff_capped(principal, monthly_rate, modified, max_months)?,
    );

    let schedule = build_schedule(
        principal,
        input.annual_rate,
        monthly_payment,
        input.additional_payment,
    )?
    .with_max_months(max_months)
    .collect_records()?;

    if input.down_payment.is_zero() {
        warnings.push("No down payment: the full purchase price is financed".into());
    } else if loan_to_value > HIGH_LTV {
        warnings.push(format!(
            "Loan-to-value of {}% exceeds {}%",
            (loan_to_value * dec!(100)).round_dp(1),
            HIGH_LTV * dec!(100)
        ));
    }
    if input.annual_rate.is_zero() {
        warnings.push("Zero interest rate: level payment is principal / term".into());
    }
    if with_additional.months_to_payoff > term_months {
        warnings.push(format!(
            "Level payment retires the loan in {} months, past the {term_months}-month term; \
             the term is at the limit of 28-digit decimal precision at this rate",
            with_additional.months_to_payoff
        ));
    }

    debug!(
        term_months,
        months = with_additional.months_to_payoff,
        "new purchase analysis complete"
    );

    let total_cost = checked_amount(
        "purchase_price",
        input.down_payment.checked_add(scheduled_total),
    )?;
    let total_cost_with_additional = checked_amount(
        "purchase_price",
        modified
            .checked_mul(Decimal::from(with_additional.months_to_payoff))
            .and_then(|paid| input.down_payment.checked_add(paid)),
    )?;

    let output = NewPurchaseOutput {
        principal,
        loan_to_value,
        term_months,
        monthly_payment,
        total_cost,
        total_interest,
        total_cost_with_additional,
        months_saved: term_months.saturating_sub(with_additional.months_to_payoff),
        interest_saved: total_interest - with_additional.total_interest_paid,
        with_additional,
        schedule,
    };

    Ok(with_metadata(
        "New purchase level-payment loan with additional principal",
        input,
        warnings,
        start,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing(additional: Money) -> ExistingLoanInput {
        ExistingLoanInput {
            current_balance: dec!(200_000),
            annual_rate: dec!(0.05),
            monthly_payment: dec!(1073.64),
            additional_payment: additional,
            max_months: None,
        }
    }

    fn purchase(additional: Money) -> NewPurchaseInput {
        NewPurchaseInput {
            purchase_price: dec!(375_000),
            down_payment: dec!(75_000),
            annual_rate: dec!(0.04),
            term_years: dec!(30),
            additional_payment: additional,
            max_months: None,
        }
    }

    #[test]
    fn test_existing_loan_extra_payment_saves_time_and_interest() {
        let out = analyze_existing_loan(&existing(dec!(200))).unwrap();
        let r = &out.result;
        let baseline = r.baseline.as_ref().unwrap();
        assert!(r.with_additional.months_to_payoff < baseline.months_to_payoff);
        assert!(r.months_saved.unwrap() > 0);
        assert!(r.interest_saved.unwrap() > Decimal::ZERO);
        assert_eq!(r.schedule.len() as Months, r.with_additional.months_to_payoff);
        assert_eq!(r.modified_monthly_payment, dec!(1273.64));
    }

    #[test]
    fn test_existing_loan_total_cost() {
        let out = analyze_existing_loan(&existing(dec!(200))).unwrap();
        let r = &out.result;
        assert_eq!(
            r.total_cost_with_additional,
            dec!(1273.64) * Decimal::from(r.with_additional.months_to_payoff)
        );
        assert_eq!(
            r.total_paid_with_additional,
            dec!(200_000) + r.with_additional.total_interest_paid
        );
        assert!(r.total_paid_with_additional <= r.total_cost_with_additional);
    }

    #[test]
    fn test_existing_loan_without_extra_warns() {
        let out = analyze_existing_loan(&existing(Decimal::ZERO)).unwrap();
        assert_eq!(out.result.months_saved, Some(0));
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("No additional payment")));
    }

    #[test]
    fn test_existing_loan_baseline_absent_when_base_payment_short() {
        let input = ExistingLoanInput {
            current_balance: dec!(100_000),
            annual_rate: dec!(0.06),
            monthly_payment: dec!(400),
            additional_payment: dec!(300),
            max_months: None,
        };
        let out = analyze_existing_loan(&input).unwrap();
        assert!(out.result.baseline.is_none());
        assert!(out.result.months_saved.is_none());
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_existing_loan_insufficient_total_payment_fails() {
        let input = ExistingLoanInput {
            current_balance: dec!(100_000),
            annual_rate: dec!(0.06),
            monthly_payment: dec!(400),
            additional_payment: dec!(100),
            max_months: None,
        };
        assert!(matches!(
            analyze_existing_loan(&input),
            Err(AmortizationError::InsufficientPayment { .. })
        ));
    }

    #[test]
    fn test_new_purchase_level_payment() {
        let out = analyze_new_purchase(&purchase(Decimal::ZERO)).unwrap();
        let r = &out.result;
        assert_eq!(r.principal, dec!(300_000));
        assert_eq!(r.term_months, 360);
        assert!((r.monthly_payment - dec!(1432.25)).abs() < dec!(0.01));
        assert_eq!(r.loan_to_value, dec!(0.8));
        assert_eq!(
            r.total_cost,
            dec!(75_000) + r.monthly_payment * dec!(360)
        );
        assert_eq!(r.with_additional.months_to_payoff, 360);
        assert_eq!(r.schedule.len(), 360);
        assert_eq!(r.schedule.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_new_purchase_with_extra() {
        let out = analyze_new_purchase(&purchase(dec!(500))).unwrap();
        let r = &out.result;
        assert!(r.with_additional.months_to_payoff < 360);
        assert_eq!(r.months_saved, 360 - r.with_additional.months_to_payoff);
        assert!(r.interest_saved > Decimal::ZERO);
        assert_eq!(r.schedule.len() as Months, r.with_additional.months_to_payoff);
    }

    #[test]
    fn test_new_purchase_zero_rate() {
        let input = NewPurchaseInput {
            purchase_price: dec!(24_000),
            down_payment: Decimal::ZERO,
            annual_rate: Decimal::ZERO,
            term_years: dec!(2),
            additional_payment: Decimal::ZERO,
            max_months: None,
        };
        let out = analyze_new_purchase(&input).unwrap();
        assert_eq!(out.result.monthly_payment, dec!(1000));
        assert_eq!(out.result.total_interest, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_new_purchase_down_payment_must_leave_a_loan() {
        let mut input = purchase(Decimal::ZERO);
        input.down_payment = input.purchase_price;
        assert!(matches!(
            analyze_new_purchase(&input),
            Err(AmortizationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_new_purchase_fractional_month_term_rejected() {
        let mut input = purchase(Decimal::ZERO);
        input.term_years = dec!(15.01);
        assert!(matches!(
            analyze_new_purchase(&input),
            Err(AmortizationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_new_purchase_high_ltv_warning() {
        let mut input = purchase(Decimal::ZERO);
        input.down_payment = dec!(18_750);
        let out = analyze_new_purchase(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("Loan-to-value")));
    }

    #[test]
    fn test_new_purchase_term_beyond_decimal_precision_rejected() {
        let input = NewPurchaseInput {
            purchase_price: dec!(100_000),
            down_payment: Decimal::ZERO,
            annual_rate: Decimal::ONE,
            term_years: dec!(100),
            additional_payment: Decimal::ZERO,
            max_months: None,
        };
        match analyze_new_purchase(&input).unwrap_err() {
            AmortizationError::InvalidInput { field, reason } => {
                assert_eq!(field, "term_years");
                assert!(reason.contains("decimal precision"), "got {reason}");
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_new_purchase_overrunning_term_is_flagged() {
        let input = NewPurchaseInput {
            purchase_price: dec!(100_000),
            down_payment: Decimal::ZERO,
            annual_rate: Decimal::ONE,
            term_years: dec!(60),
            additional_payment: Decimal::ZERO,
            max_months: None,
        };
        let out = analyze_new_purchase(&input).unwrap();
        let flagged = out.warnings.iter().any(|w| w.contains("past the 720-month term"));
        assert_eq!(flagged, out.result.with_additional.months_to_payoff > 720);
    }

    #[test]
    fn test_existing_loan_near_max_payments_rejected() {
        let mut input = existing(dec!(70_000_000_000_000_000_000_000_000_000));
        input.monthly_payment = dec!(70_000_000_000_000_000_000_000_000_000);
        assert!(matches!(
            analyze_existing_loan(&input),
            Err(AmortizationError::InvalidInput { .. })
        ));
    }
}
