use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::FinMathError;
use crate::loans::{total_interest, total_paid};
use crate::time_value::{self, ScheduleOptions, SolverConfig};
use crate::types::{
    with_metadata, AmortizationRow, ComputationOutput, ContributionTiming, Frequency, LoanTerms,
    Money, Rate,
};
use crate::FinMathResult;

const HIGH_RATE_WARNING_PCT: Decimal = dec!(30);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a level-payment loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Money,
    /// Nominal annual rate in percent
    pub annual_rate_pct: Decimal,
    /// Number of scheduled payments
    pub periods: u32,
    #[serde(default)]
    pub frequency: Frequency,
    /// Additional principal paid with every payment
    #[serde(default)]
    pub extra_payment: Money,
    /// Origination fees deducted from the proceeds (drives the APR)
    #[serde(default)]
    pub fees: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub solver: SolverConfig,
}

/// Output of the loan calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOutput {
    /// Scheduled payment, excluding any extra principal
    pub periodic_payment: Money,
    pub periodic_rate: Rate,
    /// Payments actually made (fewer than scheduled with extra principal)
    pub number_of_payments: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    /// Interest avoided by the extra principal
    pub interest_saved: Money,
    pub periods_saved: u32,
    /// Annualized cost of borrowing on proceeds net of fees
    pub apr: Rate,
    pub effective_annual_rate: Rate,
    pub schedule: Vec<AmortizationRow>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Solve the level payment, build the schedule and summarize the cost of a loan.
pub fn calculate_loan(input: &LoanInput) -> FinMathResult<ComputationOutput<LoanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let terms = LoanTerms {
        principal: input.principal,
        annual_rate_pct: input.annual_rate_pct,
        periods: input.periods,
        frequency: input.frequency,
    };
    validate_loan_input(input, &terms)?;
    debug!(principal = %input.principal, periods = input.periods, "calculating loan");

    let rate = terms.periodic_rate();
    let payment = time_value::amortized_payment(terms.principal, rate, terms.periods)?;

    let options = ScheduleOptions {
        extra_payment: input.extra_payment,
        start_date: input.start_date,
    };
    let schedule = time_value::amortization_schedule_with(&terms, payment, &options)?;
    let interest = total_interest(&schedule);

    let (interest_saved, periods_saved) = if input.extra_payment > Decimal::ZERO {
        let baseline = time_value::amortization_schedule(&terms, payment)?;
        (
            total_interest(&baseline) - interest,
            terms.periods - schedule.len() as u32,
        )
    } else {
        (Decimal::ZERO, 0)
    };

    let apr = if input.fees > Decimal::ZERO {
        let solved = time_value::implied_rate(
            input.principal - input.fees,
            payment,
            Decimal::ZERO,
            terms.periods,
            ContributionTiming::End,
            &input.solver,
        )?;
        solved.rate * Decimal::from(terms.frequency.periods_per_year())
    } else {
        rate * Decimal::from(terms.frequency.periods_per_year())
    };

    if input.annual_rate_pct > HIGH_RATE_WARNING_PCT {
        warnings.push(format!(
            "Annual rate of {}% is unusually high; verify the input is a percentage",
            input.annual_rate_pct
        ));
    }
    if input.fees > input.principal * dec!(0.05) {
        warnings.push(format!(
            "Fees of {} exceed 5% of principal; APR differs materially from the note rate",
            input.fees
        ));
    }

    let output = LoanOutput {
        periodic_payment: payment,
        periodic_rate: rate,
        number_of_payments: schedule.len() as u32,
        total_paid: total_paid(&schedule),
        total_interest: interest,
        payoff_date: schedule.last().and_then(|row| row.payment_date),
        interest_saved,
        periods_saved,
        apr,
        effective_annual_rate: time_value::effective_annual_rate(
            input.annual_rate_pct,
            input.frequency,
        )?,
        schedule,
    };

    for warning in &warnings {
        warn!("{warning}");
    }

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Level-payment amortization with bisection APR",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_loan_input(input: &LoanInput, terms: &LoanTerms) -> FinMathResult<()> {
    terms.validate()?;
    if input.extra_payment < Decimal::ZERO {
        return Err(FinMathError::invalid(
            "extra_payment",
            "Extra payment cannot be negative",
        ));
    }
    if input.fees < Decimal::ZERO {
        return Err(FinMathError::invalid("fees", "Fees cannot be negative"));
    }
    if input.fees >= input.principal {
        return Err(FinMathError::invalid(
            "fees",
            "Fees must be less than the principal",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> LoanInput {
        LoanInput {
            principal: dec!(25000),
            annual_rate_pct: dec!(7.5),
            periods: 60,
            frequency: Frequency::Monthly,
            extra_payment: Decimal::ZERO,
            fees: Decimal::ZERO,
            start_date: None,
            solver: SolverConfig::default(),
        }
    }

    #[test]
    fn test_auto_loan_payment() {
        // 25k at 7.5% over 5 years: ~500.95/month
        let result = calculate_loan(&base_input()).unwrap();
        let out = &result.result;
        assert!((out.periodic_payment - dec!(500.95)).abs() < dec!(0.01));
        assert_eq!(out.number_of_payments, 60);
        assert_eq!(out.periods_saved, 0);
        assert_eq!(out.apr, dec!(0.075));
        assert!((out.total_paid - out.total_interest - dec!(25000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_fees_raise_apr_above_note_rate() {
        let mut input = base_input();
        input.fees = dec!(500);
        let out = calculate_loan(&input).unwrap().result;
        assert!(out.apr > dec!(0.075));
        // 2% fee on a 5-year loan adds roughly 80bp
        assert!(out.apr < dec!(0.085), "apr {}", out.apr);
    }

    #[test]
    fn test_extra_payment_saves_interest() {
        let mut input = base_input();
        input.extra_payment = dec!(100);
        let out = calculate_loan(&input).unwrap().result;
        assert!(out.number_of_payments < 60);
        assert_eq!(out.periods_saved, 60 - out.number_of_payments);
        assert!(out.interest_saved > Decimal::ZERO);
        assert_eq!(out.schedule.last().unwrap().ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_payoff_date_follows_schedule() {
        let mut input = base_input();
        input.start_date = NaiveDate::from_ymd_opt(2025, 3, 1);
        let out = calculate_loan(&input).unwrap().result;
        assert_eq!(out.payoff_date, NaiveDate::from_ymd_opt(2030, 3, 1));
    }

    #[test]
    fn test_fees_at_or_above_principal_rejected() {
        let mut input = base_input();
        input.fees = dec!(25000);
        assert!(matches!(
            calculate_loan(&input),
            Err(FinMathError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_high_rate_warns() {
        let mut input = base_input();
        input.annual_rate_pct = dec!(45);
        let result = calculate_loan(&input).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("unusually high")));
    }

    #[test]
    fn test_input_deserializes_with_defaults() {
        let input: LoanInput = serde_json::from_str(
            r#"{"principal": "10000", "annual_rate_pct": "5", "periods": 36}"#,
        )
        .unwrap();
        assert_eq!(input.frequency, Frequency::Monthly);
        assert_eq!(input.fees, Decimal::ZERO);
        assert_eq!(input.solver, SolverConfig::default());
    }
}
