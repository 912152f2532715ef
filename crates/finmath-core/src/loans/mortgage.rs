use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::FinMathError;
use crate::loans::{total_interest, total_paid};
use crate::time_value::{self, ScheduleOptions};
use crate::types::{
    with_metadata, AmortizationRow, ComputationOutput, Frequency, LoanTerms, Money, Rate,
};
use crate::FinMathResult;

/// PMI is charged while the balance is above this share of the home price.
const PMI_LTV_THRESHOLD: Decimal = dec!(0.80);
const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a fixed-rate home mortgage with escrowed costs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageInput {
    pub home_price: Money,
    pub down_payment: Money,
    /// Nominal annual rate in percent
    pub annual_rate_pct: Decimal,
    pub term_years: u32,
    #[serde(default)]
    pub annual_property_tax: Money,
    #[serde(default)]
    pub annual_insurance: Money,
    #[serde(default)]
    pub monthly_hoa: Money,
    /// Annual PMI premium as a percent of the original loan amount
    #[serde(default)]
    pub pmi_rate_pct: Decimal,
    /// Additional principal paid each month
    #[serde(default)]
    pub extra_payment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Output of the mortgage calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageOutput {
    pub loan_amount: Money,
    pub loan_to_value: Rate,
    pub monthly_principal_and_interest: Money,
    pub monthly_property_tax: Money,
    pub monthly_insurance: Money,
    pub monthly_hoa: Money,
    /// PMI due in the first month (zero at or below 80% LTV)
    pub monthly_pmi: Money,
    /// Everything due in the first month, extra principal included
    pub total_monthly_payment: Money,
    pub pmi_months: u32,
    pub total_pmi: Money,
    pub total_interest: Money,
    pub total_of_payments: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub schedule: Vec<AmortizationRow>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Monthly housing cost and full amortization of a fixed-rate mortgage.
pub fn calculate_mortgage(
    input: &MortgageInput,
) -> FinMathResult<ComputationOutput<MortgageOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_mortgage_input(input)?;
    debug!(home_price = %input.home_price, term_years = input.term_years, "calculating mortgage");

    let loan_amount = input.home_price - input.down_payment;
    let loan_to_value = loan_amount / input.home_price;
    let periods = input
        .term_years
        .checked_mul(12)
        .ok_or_else(|| FinMathError::invalid("term_years", "Term is too long"))?;

    let terms = LoanTerms {
        principal: loan_amount,
        annual_rate_pct: input.annual_rate_pct,
        periods,
        frequency: Frequency::Monthly,
    };
    let payment = time_value::amortized_payment(loan_amount, terms.periodic_rate(), periods)?;
    let options = ScheduleOptions {
        extra_payment: input.extra_payment,
        start_date: input.start_date,
    };
    let schedule = time_value::amortization_schedule_with(&terms, payment, &options)?;

    let monthly_pmi_premium = loan_amount * input.pmi_rate_pct / dec!(100) / MONTHS_PER_YEAR;
    let pmi_months = if monthly_pmi_premium > Decimal::ZERO {
        count_pmi_months(loan_amount, input.home_price * PMI_LTV_THRESHOLD, &schedule)
    } else {
        0
    };
    let monthly_pmi = if pmi_months > 0 {
        monthly_pmi_premium
    } else {
        Decimal::ZERO
    };

    if loan_to_value > PMI_LTV_THRESHOLD && input.pmi_rate_pct.is_zero() {
        warnings.push(format!(
            "Loan-to-value of {} is above 80%; lenders usually require PMI",
            loan_to_value.round_dp(4)
        ));
    }

    let monthly_property_tax = input.annual_property_tax / MONTHS_PER_YEAR;
    let monthly_insurance = input.annual_insurance / MONTHS_PER_YEAR;

    let output = MortgageOutput {
        loan_amount,
        loan_to_value,
        monthly_principal_and_interest: payment,
        monthly_property_tax,
        monthly_insurance,
        monthly_hoa: input.monthly_hoa,
        monthly_pmi,
        total_monthly_payment: payment
            + input.extra_payment
            + monthly_property_tax
            + monthly_insurance
            + input.monthly_hoa
            + monthly_pmi,
        pmi_months,
        total_pmi: monthly_pmi_premium * Decimal::from(pmi_months),
        total_interest: total_interest(&schedule),
        total_of_payments: total_paid(&schedule),
        payoff_date: schedule.last().and_then(|row| row.payment_date),
        schedule,
    };

    for warning in &warnings {
        warn!("{warning}");
    }

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Fixed-rate mortgage amortization with escrow and PMI",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_mortgage_input(input: &MortgageInput) -> FinMathResult<()> {
    if input.home_price <= Decimal::ZERO {
        return Err(FinMathError::invalid("home_price", "Home price must be positive"));
    }
    if input.down_payment < Decimal::ZERO {
        return Err(FinMathError::invalid(
            "down_payment",
            "Down payment cannot be negative",
        ));
    }
    if input.down_payment >= input.home_price {
        return Err(FinMathError::invalid(
            "down_payment",
            "Down payment must be less than the home price",
        ));
    }
    if input.term_years == 0 {
        return Err(FinMathError::invalid("term_years", "Term must be at least one year"));
    }
    for (field, value) in [
        ("annual_property_tax", input.annual_property_tax),
        ("annual_insurance", input.annual_insurance),
        ("monthly_hoa", input.monthly_hoa),
        ("pmi_rate_pct", input.pmi_rate_pct),
        ("extra_payment", input.extra_payment),
    ] {
        if value < Decimal::ZERO {
            return Err(FinMathError::invalid(field, "Value cannot be negative"));
        }
    }
    Ok(())
}

/// Months whose opening balance is above the PMI cutoff.
fn count_pmi_months(loan_amount: Money, cutoff: Money, schedule: &[AmortizationRow]) -> u32 {
    let mut opening = loan_amount;
    let mut months = 0;
    for row in schedule {
        if opening <= cutoff {
            break;
        }
        months += 1;
        opening = row.ending_balance;
    }
    months
}
