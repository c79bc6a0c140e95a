//! Month-by-month amortization schedule.
//!
//! The schedule is produced lazily: [`AmortizationSchedule`] owns the loan
//! state and advances it one month per call to `next`. All arithmetic is in
//! full `Decimal` precision; rounding to cents is left to the presentation
//! boundary (see [`crate::presentation`]).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use std::time::Instant;
use tracing::{debug, warn};

use super::validation::{
    checked_amount, require_annual_rate, require_covers_interest, require_max_months,
    require_non_negative, require_positive, MONTHS_PER_YEAR,
};
use super::{DEFAULT_MAX_MONTHS, SETTLEMENT_TOLERANCE};
use crate::error::AmortizationError;
use crate::types::{with_metadata, ComputationOutput, Money, Months, Rate};
use crate::AmortizationResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One row of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// 1-based payment index.
    pub payment_number: Months,
    /// Principal retired by this payment.
    pub principal_paid: Money,
    /// Interest charged for this month.
    pub interest_paid: Money,
    /// Interest paid to date, including this payment.
    pub cumulative_interest: Money,
    /// Balance outstanding after this payment.
    pub remaining_balance: Money,
}

/// Lazy, single-pass amortization schedule.
///
/// Yields `Ok(PaymentRecord)` until the balance reaches zero. If the month cap
/// is reached first, yields a single `Err(IterationLimitExceeded)` and ends.
#[derive(Debug)]
pub struct AmortizationSchedule {
    balance: Money,
    monthly_rate: Rate,
    payment: Money,
    cumulative_interest: Money,
    payment_number: Months,
    max_months: Months,
    finished: bool,
}

impl AmortizationSchedule {
    /// Override the month cap (default [`DEFAULT_MAX_MONTHS`]).
    pub fn with_max_months(mut self, max_months: Months) -> Self {
        self.max_months = max_months;
        self
    }

    /// Monthly payment applied each period (base plus additional).
    pub fn payment(&self) -> Money {
        self.payment
    }

    pub fn monthly_rate(&self) -> Rate {
        self.monthly_rate
    }

    /// Drain the schedule, stopping at the first error.
    pub fn collect_records(self) -> AmortizationResult<Vec<PaymentRecord>> {
        self.collect()
    }
}

impl Iterator for AmortizationSchedule {
    type Item = AmortizationResult<PaymentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.balance <= Decimal::ZERO {
            self.finished = true;
            return None;
        }

        if self.payment_number >= self.max_months {
            self.finished = true;
            warn!(
                max_months = self.max_months,
                remaining_balance = %self.balance,
                "amortization schedule hit month cap"
            );
            return Some(Err(AmortizationError::IterationLimitExceeded {
                function: "build_schedule".into(),
                iterations: self.max_months,
                remaining_balance: self.balance,
            }));
        }

        let interest = self.balance * self.monthly_rate;
        let cumulative_interest = match checked_amount(
            "principal",
            self.cumulative_interest.checked_add(interest),
        ) {
            Ok(total) => total,
            Err(e) => {
                self.finished = true;
                return Some(Err(e));
            }
        };
        let mut principal_paid = (self.payment - interest).min(self.balance);

        self.balance -= principal_paid;
        if self.balance < SETTLEMENT_TOLERANCE {
            principal_paid += self.balance;
            self.balance = Decimal::ZERO;
        }
        self.cumulative_interest = cumulative_interest;
        self.payment_number += 1;

        if self.balance <= Decimal::ZERO {
            self.finished = true;
        }

        Some(Ok(PaymentRecord {
            payment_number: self.payment_number,
            principal_paid,
            interest_paid: interest,
            cumulative_interest: self.cumulative_interest,
            remaining_balance: self.balance,
        }))
    }
}

impl FusedIterator for AmortizationSchedule {}

/// Start an amortization schedule.
///
/// `annual_rate` is a decimal fraction; the monthly rate is `annual_rate / 12`.
/// Each month applies `base_payment + additional_payment`, clipping the final
/// principal payment to the outstanding balance.
pub fn build_schedule(
    principal: Money,
    annual_rate: Rate,
    base_payment: Money,
    additional_payment: Money,
) -> AmortizationResult<AmortizationSchedule> {
    require_positive("principal", principal)?;
    require_annual_rate("annual_rate", annual_rate)?;
    require_positive("base_payment", base_payment)?;
    require_non_negative("additional_payment", additional_payment)?;

    let monthly_rate = annual_rate / MONTHS_PER_YEAR;
    let payment = checked_amount(
        "additional_payment",
        base_payment.checked_add(additional_payment),
    )?;
    require_covers_interest(principal, monthly_rate, payment)?;

    Ok(AmortizationSchedule {
        balance: principal,
        monthly_rate,
        payment,
        cumulative_interest: Decimal::ZERO,
        payment_number: 0,
        max_months: DEFAULT_MAX_MONTHS,
        finished: false,
    })
}

// ---------------------------------------------------------------------------
// Envelope API
// ---------------------------------------------------------------------------

/// Serializable request for a full schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub principal: Money,
    /// Annual rate as a decimal fraction (0.05 = 5%).
    pub annual_rate: Rate,
    pub base_payment: Money,
    #[serde(default)]
    pub additional_payment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_months: Option<Months>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub monthly_payment: Money,
    pub number_of_payments: Months,
    pub total_interest_paid: Money,
    pub total_paid: Money,
    pub schedule: Vec<PaymentRecord>,
}

/// Build and collect a complete schedule inside the standard envelope.
pub fn generate_schedule(
    input: &ScheduleInput,
) -> AmortizationResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let max_months = input.max_months.unwrap_or(DEFAULT_MAX_MONTHS);
    require_max_months(max_months)?;

    let schedule = build_schedule(
        input.principal,
        input.annual_rate,
        input.base_payment,
        input.additional_payment,
    )?
    .with_max_months(max_months);
    let monthly_payment = schedule.payment();
    let records = schedule.collect_records()?;

    let total_interest_paid = records
        .last()
        .map(|r| r.cumulative_interest)
        .unwrap_or(Decimal::ZERO);
    let number_of_payments = records.len() as Months;

    debug!(
        payments = number_of_payments,
        total_interest = %total_interest_paid,
        "amortization schedule complete"
    );

    let mut warnings = Vec::new();
    if input.annual_rate.is_zero() {
        warnings.push("Zero interest rate: every payment is applied to principal".into());
    }

    let output = ScheduleOutput {
        monthly_payment,
        number_of_payments,
        total_interest_paid,
        total_paid: checked_amount("principal", input.principal.checked_add(total_interest_paid))?,
        schedule: records,
    };

    Ok(with_metadata(
        "Fixed-payment monthly amortization (interest = balance x annual_rate / 12)",
        input,
        warnings,
        start,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn thirty_year_records() -> Vec<PaymentRecord> {
        build_schedule(dec!(200_000), dec!(0.05), dec!(1073.64), Decimal::ZERO)
            .unwrap()
            .collect_records()
            .unwrap()
    }

    #[test]
    fn test_thirty_year_first_record() {
        let records = thirty_year_records();
        let first = &records[0];
        assert_eq!(first.payment_number, 1);
        assert_close(first.interest_paid, dec!(833.33), dec!(0.01), "first interest");
        assert_close(first.principal_paid, dec!(240.31), dec!(0.01), "first principal");
        assert_eq!(first.cumulative_interest, first.interest_paid);
    }

    #[test]
    fn test_thirty_year_length_and_final_balance() {
        let records = thirty_year_records();
        assert!(
            (360..=361).contains(&records.len()),
            "Expected ~360 payments, got {}",
            records.len()
        );
        assert_eq!(records.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_balance_never_increases() {
        let records = thirty_year_records();
        for pair in records.windows(2) {
            assert!(pair[0].remaining_balance >= pair[1].remaining_balance);
            assert!(pair[0].cumulative_interest <= pair[1].cumulative_interest);
        }
        assert!(records.iter().all(|r| r.remaining_balance >= Decimal::ZERO));
    }

    #[test]
    fn test_principal_plus_interest_equals_payment() {
        let records = build_schedule(dec!(50_000), dec!(0.07), dec!(600), dec!(150))
            .unwrap()
            .collect_records()
            .unwrap();
        let (last, body) = records.split_last().unwrap();
        for r in body {
            assert_close(
                r.principal_paid + r.interest_paid,
                dec!(750),
                dec!(0.000000001),
                "payment reconstruction",
            );
        }
        assert!(last.principal_paid + last.interest_paid <= dec!(750));
    }

    #[test]
    fn test_payment_numbers_are_sequential() {
        let records = thirty_year_records();
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.payment_number as usize, i + 1);
        }
    }

    #[test]
    fn test_single_payment_clears_small_balance() {
        let records = build_schedule(dec!(100), dec!(0.12), dec!(500), Decimal::ZERO)
            .unwrap()
            .collect_records()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].interest_paid, dec!(1));
        assert_eq!(records[0].principal_paid, dec!(100));
        assert_eq!(records[0].remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_schedule() {
        let records = build_schedule(dec!(1200), dec!(0), dec!(100), Decimal::ZERO)
            .unwrap()
            .collect_records()
            .unwrap();
        assert_eq!(records.len(), 12);
        assert!(records.iter().all(|r| r.interest_paid.is_zero()));
    }

    #[test]
    fn test_insufficient_payment_at_boundary() {
        let err = build_schedule(dec!(100_000), dec!(0.06), dec!(500), Decimal::ZERO).unwrap_err();
        assert!(matches!(err, AmortizationError::InsufficientPayment { .. }));
    }

    #[test]
    fn test_additional_payment_counts_toward_interest_cover() {
        assert!(build_schedule(dec!(100_000), dec!(0.06), dec!(400), dec!(200)).is_ok());
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(matches!(
            build_schedule(dec!(0), dec!(0.05), dec!(100), dec!(0)),
            Err(AmortizationError::InvalidInput { .. })
        ));
        assert!(matches!(
            build_schedule(dec!(1000), dec!(1.5), dec!(100), dec!(0)),
            Err(AmortizationError::InvalidInput { .. })
        ));
        assert!(matches!(
            build_schedule(dec!(1000), dec!(0.05), dec!(-1), dec!(0)),
            Err(AmortizationError::InvalidInput { .. })
        ));
        assert!(matches!(
            build_schedule(dec!(1000), dec!(0.05), dec!(100), dec!(-5)),
            Err(AmortizationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_near_max_payments_rejected_without_panic() {
        let huge = dec!(70_000_000_000_000_000_000_000_000_000);
        match build_schedule(dec!(1000), dec!(0.05), huge, huge).unwrap_err() {
            AmortizationError::InvalidInput { field, .. } => {
                assert_eq!(field, "additional_payment")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_cumulative_interest_overflow_ends_schedule() {
        let principal = dec!(79_000_000_000_000_000_000_000_000_000);
        let payment = dec!(7_000_000_000_000_000_000_000_000_000);
        let mut schedule = build_schedule(principal, Decimal::ONE, payment, Decimal::ZERO).unwrap();
        let err = schedule.by_ref().find_map(Result::err).unwrap();
        assert!(matches!(err, AmortizationError::InvalidInput { .. }));
        assert!(schedule.next().is_none());
    }

    #[test]
    fn test_month_cap_yields_single_error_then_ends() {
        let mut schedule = build_schedule(dec!(100_000), dec!(0.06), dec!(500.01), Decimal::ZERO)
            .unwrap()
            .with_max_months(24);
        let mut ok_count = 0;
        let mut err = None;
        for item in schedule.by_ref() {
            match item {
                Ok(_) => ok_count += 1,
                Err(e) => err = Some(e),
            }
        }
        assert_eq!(ok_count, 24);
        assert!(matches!(
            err,
            Some(AmortizationError::IterationLimitExceeded { iterations: 24, .. })
        ));
        assert!(schedule.next().is_none());
    }

    #[test]
    fn test_default_cap_stops_near_interest_only_payment() {
        // 1 cent above interest takes far longer than 100 years to amortize.
        let result = build_schedule(dec!(100_000), dec!(0.06), dec!(500.01), Decimal::ZERO)
            .unwrap()
            .collect_records();
        assert!(matches!(
            result,
            Err(AmortizationError::IterationLimitExceeded { iterations: 1200, .. })
        ));
    }

    #[test]
    fn test_schedule_is_idempotent() {
        assert_eq!(thirty_year_records(), thirty_year_records());
    }

    #[test]
    fn test_generate_schedule_envelope() {
        let input = ScheduleInput {
            principal: dec!(10_000),
            annual_rate: dec!(0.06),
            base_payment: dec!(500),
            additional_payment: Decimal::ZERO,
            max_months: None,
        };
        let out = generate_schedule(&input).unwrap();
        let r = &out.result;
        assert_eq!(r.monthly_payment, dec!(500));
        assert_eq!(r.number_of_payments as usize, r.schedule.len());
        let summed: Decimal = r.schedule.iter().map(|p| p.interest_paid).sum();
        assert_eq!(r.total_interest_paid, summed);
        assert_eq!(r.total_paid, dec!(10_000) + summed);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_generate_schedule_rejects_zero_cap() {
        let input = ScheduleInput {
            principal: dec!(10_000),
            annual_rate: dec!(0.06),
            base_payment: dec!(500),
            additional_payment: Decimal::ZERO,
            max_months: Some(0),
        };
        assert!(matches!(
            generate_schedule(&input),
            Err(AmortizationError::InvalidInput { .. })
        ));
    }
}
