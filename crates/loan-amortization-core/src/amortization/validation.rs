use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::AmortizationError;
use crate::types::{Money, Rate};
use crate::AmortizationResult;

pub(crate) const MONTHS_PER_YEAR: Decimal = dec!(12);

pub(crate) fn require_positive(field: &str, value: Decimal) -> AmortizationResult<()> {
    if value <= Decimal::ZERO {
        return Err(AmortizationError::InvalidInput {
            field: field.into(),
            reason: "Must be greater than zero".into(),
        });
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: Decimal) -> AmortizationResult<()> {
    if value < Decimal::ZERO {
        return Err(AmortizationError::InvalidInput {
            field: field.into(),
            reason: "Cannot be negative".into(),
        });
    }
    Ok(())
}

pub(crate) fn require_annual_rate(field: &str, rate: Rate) -> AmortizationResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(AmortizationError::InvalidInput {
            field: field.into(),
            reason: "Annual rate must be a decimal fraction between 0 and 1".into(),
        });
    }
    Ok(())
}

pub(crate) fn require_max_months(max_months: u32) -> AmortizationResult<()> {
    if max_months == 0 {
        return Err(AmortizationError::InvalidInput {
            field: "max_months".into(),
            reason: "Month cap must be greater than zero".into(),
        });
    }
    Ok(())
}

/// Unwrap a checked `Decimal` operation, reporting overflow against `field`.
pub(crate) fn checked_amount(field: &str, value: Option<Decimal>) -> AmortizationResult<Decimal> {
    value.ok_or_else(|| AmortizationError::InvalidInput {
        field: field.into(),
        reason: "Amount too large for 28-digit decimal arithmetic".into(),
    })
}

/// Reject a payment that cannot retire any principal in the first month.
///
/// Once the first month amortizes something, interest only shrinks, so the
/// loop is guaranteed to converge; checking month one is sufficient.
pub(crate) fn require_covers_interest(
    balance: Money,
    monthly_rate: Rate,
    payment: Money,
) -> AmortizationResult<()> {
    let first_month_interest = balance * monthly_rate;
    if payment <= first_month_interest {
        return Err(AmortizationError::InsufficientPayment {
            payment,
            first_month_interest,
        });
    }
    Ok(())
}
