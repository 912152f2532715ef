use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::FinMathError;
use crate::types::{with_metadata, ComputationOutput, Frequency, Money};
use crate::FinMathResult;

const PCT: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a 401(k)-style salary-deferral projection with employer match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementInput {
    pub current_balance: Money,
    pub annual_salary: Money,
    /// Employee deferral as a percent of salary
    pub contribution_pct: Decimal,
    /// Employer match as a percent of the matched deferral (50 = 50 cents per dollar)
    #[serde(default)]
    pub employer_match_pct: Decimal,
    /// Deferral (percent of salary) above which the employer stops matching
    #[serde(default)]
    pub employer_match_limit_pct: Decimal,
    #[serde(default)]
    pub annual_salary_growth_pct: Decimal,
    pub annual_return_pct: Decimal,
    pub years: u32,
    /// Pay periods per year; deposits land at the end of each
    #[serde(default)]
    pub frequency: Frequency,
}

/// Output of the retirement projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementOutput {
    pub final_balance: Money,
    pub total_employee_contributions: Money,
    pub total_employer_contributions: Money,
    pub total_investment_growth: Money,
    pub year_by_year: Vec<RetirementYear>,
}

/// One year of the projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementYear {
    pub year: u32,
    pub salary: Money,
    pub employee_contribution: Money,
    pub employer_contribution: Money,
    pub investment_growth: Money,
    pub ending_balance: Money,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Project a retirement account funded by payroll deferrals and an employer match.
pub fn project_retirement(
    input: &RetirementInput,
) -> FinMathResult<ComputationOutput<RetirementOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_retirement_input(input)?;
    debug!(years = input.years, "projecting retirement balance");

    let periods_per_year = input.frequency.periods_per_year();
    let rate = input.frequency.periodic_rate(input.annual_return_pct);
    let salary_growth = input.annual_salary_growth_pct / PCT;
    let matched_pct = input.contribution_pct.min(input.employer_match_limit_pct);

    if input.contribution_pct < input.employer_match_limit_pct
        && input.employer_match_pct > Decimal::ZERO
    {
        warnings.push(format!(
            "Deferring {}% leaves {}% of salary in employer matching unclaimed",
            input.contribution_pct,
            input.employer_match_limit_pct - input.contribution_pct
        ));
    }
    if input.employer_match_pct > Decimal::ZERO && input.employer_match_limit_pct.is_zero() {
        warnings.push(format!(
            "Employer match of {}% has a match limit of 0%; no match is credited",
            input.employer_match_pct
        ));
    }

    let out_of_range =
        || FinMathError::invalid("years", "Balance exceeds the representable range");

    let mut balance = input.current_balance;
    let mut salary = input.annual_salary;
    let mut year_by_year = Vec::with_capacity(input.years as usize);
    let mut total_employee = Decimal::ZERO;
    let mut total_employer = Decimal::ZERO;
    let mut total_growth = Decimal::ZERO;

    for year in 1..=input.years {
        if year > 1 {
            salary = salary
                .checked_mul(Decimal::ONE + salary_growth)
                .ok_or_else(out_of_range)?;
        }
        let employee = salary * input.contribution_pct / PCT;
        let employer = salary * matched_pct / PCT * input.employer_match_pct / PCT;
        let deposit = (employee + employer) / Decimal::from(periods_per_year);

        let mut growth = Decimal::ZERO;
        for _ in 0..periods_per_year {
            let interest = balance.checked_mul(rate).ok_or_else(out_of_range)?;
            growth += interest;
            balance = balance
                .checked_add(interest + deposit)
                .ok_or_else(out_of_range)?;
        }

        total_employee += employee;
        total_employer += employer;
        total_growth += growth;

        year_by_year.push(RetirementYear {
            year,
            salary,
            employee_contribution: employee,
            employer_contribution: employer,
            investment_growth: growth,
            ending_balance: balance,
        });
    }

    let output = RetirementOutput {
        final_balance: balance,
        total_employee_contributions: total_employee,
        total_employer_contributions: total_employer,
        total_investment_growth: total_growth,
        year_by_year,
    };

    for warning in &warnings {
        warn!("{warning}");
    }

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Payroll-deferral accumulation with employer match",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_retirement_input(input: &RetirementInput) -> FinMathResult<()> {
    if input.years == 0 {
        return Err(FinMathError::invalid("years", "Horizon must be at least one year"));
    }
    for (field, value) in [
        ("current_balance", input.current_balance),
        ("annual_salary", input.annual_salary),
        ("employer_match_pct", input.employer_match_pct),
        ("annual_salary_growth_pct", input.annual_salary_growth_pct),
        ("annual_return_pct", input.annual_return_pct),
    ] {
        if value < Decimal::ZERO {
            return Err(FinMathError::invalid(field, "Value cannot be negative"));
        }
    }
    for (field, value) in [
        ("contribution_pct", input.contribution_pct),
        ("employer_match_limit_pct", input.employer_match_limit_pct),
    ] {
        if value < Decimal::ZERO || value > PCT {
            return Err(FinMathError::invalid(field, "Must be between 0 and 100 percent"));
        }
    }
    Ok(())
}
