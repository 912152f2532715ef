use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::warn;

use crate::error::FinMathError;
use crate::time_value;
use crate::types::{
    with_metadata, ComputationOutput, ContributionTiming, Frequency, GrowthPoint, Money, Rate,
};
use crate::FinMathResult;

/// Largest gap tolerated between the stepped series and the closed form.
const SERIES_DRIFT_TOLERANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Whether the growth series has one point per compounding period or per year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesGranularity {
    Period,
    #[default]
    Year,
}

/// Input for a compound-interest projection with regular deposits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthInput {
    pub initial_deposit: Money,
    /// Nominal annual rate in percent
    pub annual_rate_pct: Decimal,
    pub years: u32,
    /// Compounding (and deposit) frequency
    #[serde(default)]
    pub frequency: Frequency,
    /// Deposit made every period
    #[serde(default)]
    pub contribution: Money,
    #[serde(default)]
    pub timing: ContributionTiming,
    #[serde(default)]
    pub granularity: SeriesGranularity,
}

/// Output of the growth projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthOutput {
    pub future_value: Money,
    /// Initial deposit plus every periodic contribution
    pub total_deposits: Money,
    pub total_interest: Money,
    pub effective_annual_rate: Rate,
    pub series: Vec<GrowthPoint>,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Period-by-period balance under compounding with a level contribution.
///
/// Ordinary annuity: b = b·(1+r) + C. Annuity due: b = (b + C)·(1+r).
/// Interest is applied exactly once per period.
pub fn growth_series(
    present_value: Money,
    rate: Rate,
    periods: u32,
    contribution: Money,
    timing: ContributionTiming,
) -> FinMathResult<Vec<GrowthPoint>> {
    if periods == 0 {
        return Err(FinMathError::invalid(
            "periods",
            "Number of periods must be > 0",
        ));
    }
    if rate <= dec!(-1) {
        return Err(FinMathError::invalid("rate", "Rate must be greater than -100%"));
    }

    let out_of_range =
        || FinMathError::invalid("periods", "Balance exceeds the representable range");

    let mut series = Vec::with_capacity(periods as usize);
    let mut balance = present_value;

    for period in 1..=periods {
        let interest = match timing {
            ContributionTiming::End => {
                let interest = balance.checked_mul(rate).ok_or_else(out_of_range)?;
                balance = balance
                    .checked_add(interest)
                    .and_then(|b| b.checked_add(contribution))
                    .ok_or_else(out_of_range)?;
                interest
            }
            ContributionTiming::Start => {
                balance = balance.checked_add(contribution).ok_or_else(out_of_range)?;
                let interest = balance.checked_mul(rate).ok_or_else(out_of_range)?;
                balance = balance.checked_add(interest).ok_or_else(out_of_range)?;
                interest
            }
        };

        series.push(GrowthPoint {
            period,
            contribution,
            interest,
            balance,
        });
    }

    Ok(series)
}

/// Roll a per-period series up into one point per `periods_per_year` block.
pub fn aggregate_by_year(series: &[GrowthPoint], periods_per_year: u32) -> Vec<GrowthPoint> {
    series
        .chunks(periods_per_year.max(1) as usize)
        .enumerate()
        .map(|(i, chunk)| GrowthPoint {
            period: i as u32 + 1,
            contribution: chunk.iter().map(|p| p.contribution).sum(),
            interest: chunk.iter().map(|p| p.interest).sum(),
            balance: chunk.last().map(|p| p.balance).unwrap_or_default(),
        })
        .collect()
}

/// Project the balance of a savings account with regular deposits.
pub fn project_growth(input: &GrowthInput) -> FinMathResult<ComputationOutput<GrowthOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_growth_input(input)?;

    let periods_per_year = input.frequency.periods_per_year();
    let periods = input
        .years
        .checked_mul(periods_per_year)
        .ok_or_else(|| FinMathError::invalid("years", "Horizon is too long"))?;
    let rate = input.frequency.periodic_rate(input.annual_rate_pct);

    let future_value = time_value::future_value(
        input.initial_deposit,
        rate,
        periods,
        input.contribution,
        input.timing,
    )?;
    let per_period = growth_series(
        input.initial_deposit,
        rate,
        periods,
        input.contribution,
        input.timing,
    )?;

    let stepped = per_period
        .last()
        .map(|p| p.balance)
        .unwrap_or(input.initial_deposit);
    if (stepped - future_value).abs() > SERIES_DRIFT_TOLERANCE {
        warn!(%stepped, %future_value, "growth series drifted from closed form");
        warnings.push(format!(
            "Period-by-period balance {stepped} differs from the closed form {future_value}"
        ));
    }

    let total_deposits = input.initial_deposit + input.contribution * Decimal::from(periods);

    let series = match input.granularity {
        SeriesGranularity::Period => per_period,
        SeriesGranularity::Year => aggregate_by_year(&per_period, periods_per_year),
    };

    let output = GrowthOutput {
        future_value,
        total_deposits,
        total_interest: future_value - total_deposits,
        effective_annual_rate: time_value::effective_annual_rate(
            input.annual_rate_pct,
            input.frequency,
        )?,
        series,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Compound growth with level contributions",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_growth_input(input: &GrowthInput) -> FinMathResult<()> {
    if input.initial_deposit < Decimal::ZERO {
        return Err(FinMathError::invalid(
            "initial_deposit",
            "Initial deposit cannot be negative",
        ));
    }
    if input.contribution < Decimal::ZERO {
        return Err(FinMathError::invalid(
            "contribution",
            "Contribution cannot be negative",
        ));
    }
    if input.annual_rate_pct < Decimal::ZERO {
        return Err(FinMathError::invalid(
            "annual_rate_pct",
            "Interest rate cannot be negative",
        ));
    }
    if input.years == 0 {
        return Err(FinMathError::invalid("years", "Horizon must be at least one year"));
    }
    Ok(())
}
