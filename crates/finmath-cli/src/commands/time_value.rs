use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use finmath_core::time_value::{self, SolverConfig};
use finmath_core::types::{ContributionTiming, Frequency, LoanTerms, Money};

use super::{amount, amount_or_zero, count, percent, CmdResult, FrequencyArg, TimingArg};
use crate::input;

// ---------------------------------------------------------------------------
// Requests read from --input / stdin
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct FutureValueRequest {
    pub present_value: Money,
    pub annual_rate_pct: Decimal,
    pub periods: u32,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub contribution: Money,
    #[serde(default)]
    pub timing: ContributionTiming,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImpliedRateRequest {
    pub present_value: Money,
    #[serde(default)]
    pub payment: Money,
    #[serde(default)]
    pub future_value: Money,
    pub periods: u32,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub timing: ContributionTiming,
    #[serde(default)]
    pub solver: SolverConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PayoffRequest {
    pub principal: Money,
    pub annual_rate_pct: Decimal,
    pub payment: Money,
    #[serde(default)]
    pub frequency: Frequency,
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Arguments for the level payment on a loan
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PaymentArgs {
    /// Amount borrowed (e.g. '$250,000')
    #[arg(long)]
    pub principal: Option<String>,

    /// Nominal annual rate in percent (e.g. 6.5 or 6.5%)
    #[arg(long)]
    pub rate: Option<String>,

    /// Number of payments
    #[arg(long)]
    pub periods: Option<String>,

    /// Payment frequency
    #[arg(long, value_enum, default_value_t = FrequencyArg::Monthly)]
    pub frequency: FrequencyArg,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the future value of a deposit plus level contributions
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FutureValueArgs {
    /// Amount invested today
    #[arg(long, alias = "pv")]
    pub present_value: Option<String>,

    /// Nominal annual rate in percent
    #[arg(long)]
    pub rate: Option<String>,

    /// Number of compounding periods
    #[arg(long)]
    pub periods: Option<String>,

    /// Compounding frequency
    #[arg(long, value_enum, default_value_t = FrequencyArg::Monthly)]
    pub frequency: FrequencyArg,

    /// Deposit made every period
    #[arg(long)]
    pub contribution: Option<String>,

    /// Deposit at the start or end of each period
    #[arg(long, value_enum, default_value_t = TimingArg::End)]
    pub timing: TimingArg,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for solving the periodic rate of a cash-flow stream
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ImpliedRateArgs {
    /// Present value the payments must equal (e.g. loan proceeds)
    #[arg(long, alias = "pv")]
    pub present_value: Option<String>,

    /// Level payment each period
    #[arg(long)]
    pub payment: Option<String>,

    /// Lump sum received after the final period
    #[arg(long, alias = "fv")]
    pub future_value: Option<String>,

    /// Number of periods
    #[arg(long)]
    pub periods: Option<String>,

    /// Payment frequency, used to annualize the solved rate
    #[arg(long, value_enum, default_value_t = FrequencyArg::Monthly)]
    pub frequency: FrequencyArg,

    /// Payments at the start or end of each period
    #[arg(long, value_enum, default_value_t = TimingArg::End)]
    pub timing: TimingArg,

    /// Lowest per-period rate searched
    #[arg(long)]
    pub lower_bound: Option<Decimal>,

    /// Highest per-period rate searched
    #[arg(long)]
    pub upper_bound: Option<Decimal>,

    /// Bisection iteration cap
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the number of payments needed to retire a balance
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PayoffArgs {
    /// Outstanding balance
    #[arg(long)]
    pub principal: Option<String>,

    /// Nominal annual rate in percent
    #[arg(long)]
    pub rate: Option<String>,

    /// Payment made each period
    #[arg(long)]
    pub payment: Option<String>,

    /// Payment frequency
    #[arg(long, value_enum, default_value_t = FrequencyArg::Monthly)]
    pub frequency: FrequencyArg,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn run_payment(args: PaymentArgs) -> CmdResult<Value> {
    let terms: LoanTerms = match input::load(args.input.as_deref())? {
        Some(terms) => terms,
        None => LoanTerms {
            principal: amount(args.principal.as_deref(), "principal")?,
            annual_rate_pct: percent(args.rate.as_deref(), "rate")?,
            periods: count(args.periods.as_deref(), "periods")?,
            frequency: args.frequency.into(),
        },
    };
    terms.validate()?;

    let rate = terms.periodic_rate();
    let payment = time_value::amortized_payment(terms.principal, rate, terms.periods)?;
    let total_paid = payment * Decimal::from(terms.periods);

    Ok(json!({
        "result": {
            "periodic_payment": payment,
            "periodic_rate": rate,
            "total_paid": total_paid,
            "total_interest": total_paid - terms.principal,
        },
        "methodology": "Level-payment annuity",
        "assumptions": terms,
        "warnings": [],
    }))
}

pub fn run_future_value(args: FutureValueArgs) -> CmdResult<Value> {
    let request: FutureValueRequest = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => FutureValueRequest {
            present_value: amount(args.present_value.as_deref(), "present-value")?,
            annual_rate_pct: percent(args.rate.as_deref(), "rate")?,
            periods: count(args.periods.as_deref(), "periods")?,
            frequency: args.frequency.into(),
            contribution: amount_or_zero(args.contribution.as_deref(), "contribution")?,
            timing: args.timing.into(),
        },
    };

    let rate = request.frequency.periodic_rate(request.annual_rate_pct);
    let future_value = time_value::future_value(
        request.present_value,
        rate,
        request.periods,
        request.contribution,
        request.timing,
    )?;
    let deposits = request.present_value + request.contribution * Decimal::from(request.periods);

    Ok(json!({
        "result": {
            "future_value": future_value,
            "total_deposits": deposits,
            "total_interest": future_value - deposits,
        },
        "methodology": "Closed-form compound growth",
        "assumptions": request,
        "warnings": [],
    }))
}

pub fn run_implied_rate(args: ImpliedRateArgs) -> CmdResult<Value> {
    let request: ImpliedRateRequest = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => {
            let defaults = SolverConfig::default();
            ImpliedRateRequest {
                present_value: amount(args.present_value.as_deref(), "present-value")?,
                payment: amount_or_zero(args.payment.as_deref(), "payment")?,
                future_value: amount_or_zero(args.future_value.as_deref(), "future-value")?,
                periods: count(args.periods.as_deref(), "periods")?,
                frequency: args.frequency.into(),
                timing: args.timing.into(),
                solver: SolverConfig {
                    lower_bound: args.lower_bound.unwrap_or(defaults.lower_bound),
                    upper_bound: args.upper_bound.unwrap_or(defaults.upper_bound),
                    max_iterations: args.max_iterations.unwrap_or(defaults.max_iterations),
                    tolerance: defaults.tolerance,
                },
            }
        }
    };

    let solved = time_value::implied_rate(
        request.present_value,
        request.payment,
        request.future_value,
        request.periods,
        request.timing,
        &request.solver,
    )?;
    let periods_per_year = Decimal::from(request.frequency.periods_per_year());

    Ok(json!({
        "result": {
            "rate": solved.rate,
            "annual_rate": solved.rate * periods_per_year,
            "iterations": solved.iterations,
            "interval_width": solved.interval_width,
        },
        "methodology": "Bisection on present value",
        "assumptions": request,
        "warnings": [],
    }))
}

pub fn run_payoff(args: PayoffArgs) -> CmdResult<Value> {
    let request: PayoffRequest = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => PayoffRequest {
            principal: amount(args.principal.as_deref(), "principal")?,
            annual_rate_pct: percent(args.rate.as_deref(), "rate")?,
            payment: amount(args.payment.as_deref(), "payment")?,
            frequency: args.frequency.into(),
        },
    };

    let rate = request.frequency.periodic_rate(request.annual_rate_pct);
    let payoff = time_value::periods_to_payoff(request.principal, rate, request.payment)?;

    Ok(json!({
        "result": payoff,
        "methodology": "Closed-form payoff period count",
        "assumptions": request,
        "warnings": [],
    }))
}
