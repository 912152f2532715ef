use clap::Args;
use serde_json::Value;

use finmath_core::loans::loan::{self, LoanInput};
use finmath_core::loans::mortgage::{self, MortgageInput};
use finmath_core::loans::refinance::{self, RefinanceInput};
use finmath_core::time_value::SolverConfig;

use super::{
    amount, amount_or_zero, count, date, percent, percent_or_zero, CmdResult, FrequencyArg,
};
use crate::input;

/// Arguments for a level-payment loan with its amortization schedule
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LoanArgs {
    /// Amount borrowed (e.g. '$25,000')
    #[arg(long)]
    pub principal: Option<String>,

    /// Nominal annual rate in percent (e.g. 7.5%)
    #[arg(long)]
    pub rate: Option<String>,

    /// Number of scheduled payments
    #[arg(long)]
    pub periods: Option<String>,

    /// Payment frequency
    #[arg(long, value_enum, default_value_t = FrequencyArg::Monthly)]
    pub frequency: FrequencyArg,

    /// Additional principal paid with every payment
    #[arg(long)]
    pub extra_payment: Option<String>,

    /// Origination fees deducted from the proceeds
    #[arg(long)]
    pub fees: Option<String>,

    /// Origination date (YYYY-MM-DD); the first payment is one period later
    #[arg(long)]
    pub start_date: Option<String>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a fixed-rate home mortgage
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct MortgageArgs {
    /// Purchase price of the home
    #[arg(long)]
    pub home_price: Option<String>,

    /// Cash paid up front
    #[arg(long)]
    pub down_payment: Option<String>,

    /// Nominal annual rate in percent
    #[arg(long)]
    pub rate: Option<String>,

    /// Term in years
    #[arg(long, default_value = "30")]
    pub term_years: String,

    /// Annual property tax
    #[arg(long)]
    pub property_tax: Option<String>,

    /// Annual homeowner's insurance premium
    #[arg(long)]
    pub insurance: Option<String>,

    /// Monthly HOA dues
    #[arg(long)]
    pub hoa: Option<String>,

    /// Annual PMI premium as a percent of the loan amount
    #[arg(long)]
    pub pmi_rate: Option<String>,

    /// Additional principal paid each month
    #[arg(long)]
    pub extra_payment: Option<String>,

    /// Closing date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a refinance break-even comparison
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RefinanceArgs {
    /// Outstanding balance on the current loan
    #[arg(long)]
    pub balance: Option<String>,

    /// Annual rate of the current loan in percent
    #[arg(long)]
    pub current_rate: Option<String>,

    /// Payments left on the current loan
    #[arg(long)]
    pub remaining_periods: Option<String>,

    /// Annual rate of the new loan in percent
    #[arg(long)]
    pub new_rate: Option<String>,

    /// Number of payments on the new loan
    #[arg(long)]
    pub new_periods: Option<String>,

    /// Closing costs of the refinance
    #[arg(long)]
    pub closing_costs: Option<String>,

    /// Payment frequency of both loans
    #[arg(long, value_enum, default_value_t = FrequencyArg::Monthly)]
    pub frequency: FrequencyArg,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_loan(args: LoanArgs) -> CmdResult<Value> {
    let loan_input: LoanInput = match input::load(args.input.as_deref())? {
        Some(loan_input) => loan_input,
        None => LoanInput {
            principal: amount(args.principal.as_deref(), "principal")?,
            annual_rate_pct: percent(args.rate.as_deref(), "rate")?,
            periods: count(args.periods.as_deref(), "periods")?,
            frequency: args.frequency.into(),
            extra_payment: amount_or_zero(args.extra_payment.as_deref(), "extra-payment")?,
            fees: amount_or_zero(args.fees.as_deref(), "fees")?,
            start_date: date(args.start_date.as_deref(), "start-date")?,
            solver: SolverConfig::default(),
        },
    };

    let result = loan::calculate_loan(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_mortgage(args: MortgageArgs) -> CmdResult<Value> {
    let mortgage_input: MortgageInput = match input::load(args.input.as_deref())? {
        Some(mortgage_input) => mortgage_input,
        None => MortgageInput {
            home_price: amount(args.home_price.as_deref(), "home-price")?,
            down_payment: amount_or_zero(args.down_payment.as_deref(), "down-payment")?,
            annual_rate_pct: percent(args.rate.as_deref(), "rate")?,
            term_years: count(Some(&args.term_years), "term-years")?,
            annual_property_tax: amount_or_zero(args.property_tax.as_deref(), "property-tax")?,
            annual_insurance: amount_or_zero(args.insurance.as_deref(), "insurance")?,
            monthly_hoa: amount_or_zero(args.hoa.as_deref(), "hoa")?,
            pmi_rate_pct: percent_or_zero(args.pmi_rate.as_deref(), "pmi-rate")?,
            extra_payment: amount_or_zero(args.extra_payment.as_deref(), "extra-payment")?,
            start_date: date(args.start_date.as_deref(), "start-date")?,
        },
    };

    let result = mortgage::calculate_mortgage(&mortgage_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_refinance(args: RefinanceArgs) -> CmdResult<Value> {
    let refinance_input: RefinanceInput = match input::load(args.input.as_deref())? {
        Some(refinance_input) => refinance_input,
        None => RefinanceInput {
            current_balance: amount(args.balance.as_deref(), "balance")?,
            current_annual_rate_pct: percent(args.current_rate.as_deref(), "current-rate")?,
            remaining_periods: count(args.remaining_periods.as_deref(), "remaining-periods")?,
            new_annual_rate_pct: percent(args.new_rate.as_deref(), "new-rate")?,
            new_periods: count(args.new_periods.as_deref(), "new-periods")?,
            closing_costs: amount_or_zero(args.closing_costs.as_deref(), "closing-costs")?,
            frequency: args.frequency.into(),
            solver: SolverConfig::default(),
        },
    };

    let result = refinance::analyze_refinance(&refinance_input)?;
    Ok(serde_json::to_value(result)?)
}
