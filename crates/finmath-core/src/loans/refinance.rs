use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::FinMathError;
use crate::loans::total_interest;
use crate::time_value::{self, SolverConfig};
use crate::types::{
    with_metadata, ComputationOutput, ContributionTiming, Frequency, LoanTerms, Money, Rate,
};
use crate::FinMathResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for comparing an existing loan with a replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceInput {
    pub current_balance: Money,
    pub current_annual_rate_pct: Decimal,
    pub remaining_periods: u32,
    pub new_annual_rate_pct: Decimal,
    pub new_periods: u32,
    #[serde(default)]
    pub closing_costs: Money,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub solver: SolverConfig,
}

/// Output of the refinance comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceOutput {
    pub current_payment: Money,
    pub new_payment: Money,
    /// Positive when the new payment is lower
    pub periodic_savings: Money,
    /// Periods of savings needed to recover closing costs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_even_periods: Option<u32>,
    pub remaining_interest_current: Money,
    pub total_interest_new: Money,
    /// Remaining payments on the current loan minus all payments and costs of the new one
    pub lifetime_savings: Money,
    /// Annualized cost of the new loan with closing costs netted from proceeds
    pub new_loan_apr: Rate,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Compare keeping the current loan against refinancing the balance.
pub fn analyze_refinance(
    input: &RefinanceInput,
) -> FinMathResult<ComputationOutput<RefinanceOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let current = LoanTerms {
        principal: input.current_balance,
        annual_rate_pct: input.current_annual_rate_pct,
        periods: input.remaining_periods,
        frequency: input.frequency,
    };
    let replacement = LoanTerms {
        principal: input.current_balance,
        annual_rate_pct: input.new_annual_rate_pct,
        periods: input.new_periods,
        frequency: input.frequency,
    };
    validate_refinance_input(input, &current, &replacement)?;
    debug!(balance = %input.current_balance, "analyzing refinance");

    let current_payment =
        time_value::amortized_payment(current.principal, current.periodic_rate(), current.periods)?;
    let new_payment = time_value::amortized_payment(
        replacement.principal,
        replacement.periodic_rate(),
        replacement.periods,
    )?;

    let remaining_interest_current =
        total_interest(&time_value::amortization_schedule(&current, current_payment)?);
    let total_interest_new =
        total_interest(&time_value::amortization_schedule(&replacement, new_payment)?);

    let periodic_savings = current_payment - new_payment;
    let break_even_periods = if periodic_savings > Decimal::ZERO {
        (input.closing_costs / periodic_savings).ceil().to_u32()
    } else {
        warnings.push(
            "New payment is not lower than the current payment; costs are never recovered".into(),
        );
        None
    };

    if input.new_periods > input.remaining_periods {
        warnings.push(format!(
            "New term extends repayment by {} periods; a lower payment can still cost more overall",
            input.new_periods - input.remaining_periods
        ));
    }

    let lifetime_savings = current_payment * Decimal::from(input.remaining_periods)
        - new_payment * Decimal::from(input.new_periods)
        - input.closing_costs;

    let periods_per_year = Decimal::from(input.frequency.periods_per_year());
    let new_loan_apr = if input.closing_costs > Decimal::ZERO {
        let solved = time_value::implied_rate(
            input.current_balance - input.closing_costs,
            new_payment,
            Decimal::ZERO,
            input.new_periods,
            ContributionTiming::End,
            &input.solver,
        )?;
        solved.rate * periods_per_year
    } else {
        replacement.periodic_rate() * periods_per_year
    };

    let output = RefinanceOutput {
        current_payment,
        new_payment,
        periodic_savings,
        break_even_periods,
        remaining_interest_current,
        total_interest_new,
        lifetime_savings,
        new_loan_apr,
    };

    for warning in &warnings {
        warn!("{warning}");
    }

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Refinance break-even and lifetime cost comparison",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_refinance_input(
    input: &RefinanceInput,
    current: &LoanTerms,
    replacement: &LoanTerms,
) -> FinMathResult<()> {
    current.validate()?;
    replacement.validate()?;
    if input.closing_costs < Decimal::ZERO {
        return Err(FinMathError::invalid(
            "closing_costs",
            "Closing costs cannot be negative",
        ));
    }
    if input.closing_costs >= input.current_balance {
        return Err(FinMathError::invalid(
            "closing_costs",
            "Closing costs must be less than the balance being refinanced",
        ));
    }
    Ok(())
}
