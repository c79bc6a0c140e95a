use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use loan_amortization_core::amortization::DEFAULT_MAX_MONTHS;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Schedule and payoff
// ---------------------------------------------------------------------------

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: loan_amortization_core::amortization::schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_amortization_core::amortization::schedule::generate_schedule(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn payoff_projection(input_json: String) -> NapiResult<String> {
    let input: loan_amortization_core::amortization::payoff::PayoffInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_amortization_core::amortization::payoff::analyze_payoff(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct RemainingTermInput {
    principal: Decimal,
    annual_rate: Decimal,
    monthly_payment: Decimal,
    max_months: Option<u32>,
}

#[napi]
pub fn remaining_term(input_json: String) -> NapiResult<String> {
    let input: RemainingTermInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_amortization_core::amortization::payoff::remaining_term_capped(
        input.principal,
        input.annual_rate,
        input.monthly_payment,
        input.max_months.unwrap_or(DEFAULT_MAX_MONTHS),
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan analyses
// ---------------------------------------------------------------------------

#[napi]
pub fn level_payment(input_json: String) -> NapiResult<String> {
    let input: loan_amortization_core::amortization::level_payment::LevelPaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_amortization_core::amortization::level_payment::analyze_level_payment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn existing_loan_analysis(input_json: String) -> NapiResult<String> {
    let input: loan_amortization_core::amortization::analysis::ExistingLoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_amortization_core::amortization::analysis::analyze_existing_loan(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn new_purchase_analysis(input_json: String) -> NapiResult<String> {
    let input: loan_amortization_core::amortization::analysis::NewPurchaseInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_amortization_core::amortization::analysis::analyze_new_purchase(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
