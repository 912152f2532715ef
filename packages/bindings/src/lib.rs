use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use finmath_core::time_value::{self, ScheduleOptions, SolverConfig};
use finmath_core::types::{ContributionTiming, Frequency, LoanTerms};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Requests for the bare time-value operations
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ScheduleRequest {
    terms: LoanTerms,
    /// Defaults to the level payment that retires the loan
    #[serde(default)]
    payment: Option<Decimal>,
    #[serde(default)]
    options: ScheduleOptions,
}

#[derive(Deserialize)]
struct FutureValueRequest {
    present_value: Decimal,
    annual_rate_pct: Decimal,
    periods: u32,
    #[serde(default)]
    frequency: Frequency,
    #[serde(default)]
    contribution: Decimal,
    #[serde(default)]
    timing: ContributionTiming,
}

#[derive(Deserialize)]
struct ImpliedRateRequest {
    present_value: Decimal,
    #[serde(default)]
    payment: Decimal,
    #[serde(default)]
    future_value: Decimal,
    periods: u32,
    #[serde(default)]
    timing: ContributionTiming,
    #[serde(default)]
    solver: SolverConfig,
}

#[derive(Deserialize)]
struct PayoffRequest {
    principal: Decimal,
    annual_rate_pct: Decimal,
    payment: Decimal,
    #[serde(default)]
    frequency: Frequency,
}

// ---------------------------------------------------------------------------
// Time value
// ---------------------------------------------------------------------------

#[napi]
pub fn amortized_payment(input_json: String) -> NapiResult<String> {
    let terms: LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    terms.validate().map_err(to_napi_error)?;
    let payment =
        time_value::amortized_payment(terms.principal, terms.periodic_rate(), terms.periods)
            .map_err(to_napi_error)?;
    serde_json::to_string(&payment).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let request: ScheduleRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let terms = request.terms;
    let payment = match request.payment {
        Some(payment) => payment,
        None => {
            time_value::amortized_payment(terms.principal, terms.periodic_rate(), terms.periods)
                .map_err(to_napi_error)?
        }
    };
    let schedule = time_value::amortization_schedule_with(&terms, payment, &request.options)
        .map_err(to_napi_error)?;
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

#[napi]
pub fn future_value(input_json: String) -> NapiResult<String> {
    let request: FutureValueRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let value = time_value::future_value(
        request.present_value,
        request.frequency.periodic_rate(request.annual_rate_pct),
        request.periods,
        request.contribution,
        request.timing,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&value).map_err(to_napi_error)
}

#[napi]
pub fn implied_rate(input_json: String) -> NapiResult<String> {
    let request: ImpliedRateRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let solved = time_value::implied_rate(
        request.present_value,
        request.payment,
        request.future_value,
        request.periods,
        request.timing,
        &request.solver,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&solved).map_err(to_napi_error)
}

#[napi]
pub fn periods_to_payoff(input_json: String) -> NapiResult<String> {
    let request: PayoffRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let payoff = time_value::periods_to_payoff(
        request.principal,
        request.frequency.periodic_rate(request.annual_rate_pct),
        request.payment,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&payoff).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_loan(input_json: String) -> NapiResult<String> {
    let input: finmath_core::loans::loan::LoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finmath_core::loans::loan::calculate_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_mortgage(input_json: String) -> NapiResult<String> {
    let input: finmath_core::loans::mortgage::MortgageInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        finmath_core::loans::mortgage::calculate_mortgage(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_refinance(input_json: String) -> NapiResult<String> {
    let input: finmath_core::loans::refinance::RefinanceInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        finmath_core::loans::refinance::analyze_refinance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Savings
// ---------------------------------------------------------------------------

#[napi]
pub fn project_growth(input_json: String) -> NapiResult<String> {
    let input: finmath_core::savings::growth::GrowthInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finmath_core::savings::growth::project_growth(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_retirement(input_json: String) -> NapiResult<String> {
    let input: finmath_core::savings::retirement::RetirementInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        finmath_core::savings::retirement::project_retirement(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
