use clap::Args;
use serde_json::Value;

use finmath_core::savings::growth::{self, GrowthInput, SeriesGranularity};
use finmath_core::savings::retirement::{self, RetirementInput};

use super::{
    amount, amount_or_zero, count, percent, percent_or_zero, CmdResult, FrequencyArg, TimingArg,
};
use crate::input;

/// Arguments for a savings projection with regular deposits
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct GrowthArgs {
    /// Opening deposit
    #[arg(long)]
    pub initial_deposit: Option<String>,

    /// Nominal annual rate in percent
    #[arg(long)]
    pub rate: Option<String>,

    /// Horizon in years
    #[arg(long)]
    pub years: Option<String>,

    /// Compounding and deposit frequency
    #[arg(long, value_enum, default_value_t = FrequencyArg::Monthly)]
    pub frequency: FrequencyArg,

    /// Deposit made every period
    #[arg(long)]
    pub contribution: Option<String>,

    /// Deposit at the start or end of each period
    #[arg(long, value_enum, default_value_t = TimingArg::End)]
    pub timing: TimingArg,

    /// Emit one row per compounding period instead of one per year
    #[arg(long)]
    pub by_period: bool,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a 401(k)-style projection with employer match
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RetirementArgs {
    /// Current account balance
    #[arg(long)]
    pub balance: Option<String>,

    /// Annual salary
    #[arg(long)]
    pub salary: Option<String>,

    /// Employee deferral in percent of salary
    #[arg(long)]
    pub contribution: Option<String>,

    /// Employer match in percent of the matched deferral
    #[arg(long = "match")]
    pub employer_match: Option<String>,

    /// Deferral percent above which the employer stops matching
    #[arg(long)]
    pub match_limit: Option<String>,

    /// Annual salary growth in percent
    #[arg(long)]
    pub salary_growth: Option<String>,

    /// Expected annual return in percent
    #[arg(long = "return")]
    pub annual_return: Option<String>,

    /// Years until retirement
    #[arg(long)]
    pub years: Option<String>,

    /// Pay periods per year
    #[arg(long, value_enum, default_value_t = FrequencyArg::Monthly)]
    pub frequency: FrequencyArg,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_growth(args: GrowthArgs) -> CmdResult<Value> {
    let growth_input: GrowthInput = match input::load(args.input.as_deref())? {
        Some(growth_input) => growth_input,
        None => GrowthInput {
            initial_deposit: amount_or_zero(args.initial_deposit.as_deref(), "initial-deposit")?,
            annual_rate_pct: percent(args.rate.as_deref(), "rate")?,
            years: count(args.years.as_deref(), "years")?,
            frequency: args.frequency.into(),
            contribution: amount_or_zero(args.contribution.as_deref(), "contribution")?,
            timing: args.timing.into(),
            granularity: if args.by_period {
                SeriesGranularity::Period
            } else {
                SeriesGranularity::Year
            },
        },
    };

    let result = growth::project_growth(&growth_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_retirement(args: RetirementArgs) -> CmdResult<Value> {
    let retirement_input: RetirementInput = match input::load(args.input.as_deref())? {
        Some(retirement_input) => retirement_input,
        None => RetirementInput {
            current_balance: amount_or_zero(args.balance.as_deref(), "balance")?,
            annual_salary: amount(args.salary.as_deref(), "salary")?,
            contribution_pct: percent(args.contribution.as_deref(), "contribution")?,
            employer_match_pct: percent_or_zero(args.employer_match.as_deref(), "match")?,
            employer_match_limit_pct: percent_or_zero(args.match_limit.as_deref(), "match-limit")?,
            annual_salary_growth_pct: percent_or_zero(
                args.salary_growth.as_deref(),
                "salary-growth",
            )?,
            annual_return_pct: percent(args.annual_return.as_deref(), "return")?,
            years: count(args.years.as_deref(), "years")?,
            frequency: args.frequency.into(),
        },
    };

    let result = retirement::project_retirement(&retirement_input)?;
    Ok(serde_json::to_value(result)?)
}
