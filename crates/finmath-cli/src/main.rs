mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::loans::{LoanArgs, MortgageArgs, RefinanceArgs};
use commands::savings::{GrowthArgs, RetirementArgs};
use commands::time_value::{FutureValueArgs, ImpliedRateArgs, PaymentArgs, PayoffArgs};

/// Loan, mortgage and savings calculations with decimal precision
#[derive(Parser)]
#[command(
    name = "finmath",
    version,
    about = "Loan, mortgage and savings calculations with decimal precision",
    long_about = "A CLI for everyday personal-finance math: level payments, \
                  amortization schedules, mortgages with escrow and PMI, refinance \
                  break-even, compound growth, 401(k) projections and implied rates."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log solver and calculator details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Level payment that retires a loan
    Payment(PaymentArgs),
    /// Loan summary with APR and amortization schedule
    Loan(LoanArgs),
    /// Monthly housing cost and amortization of a mortgage
    Mortgage(MortgageArgs),
    /// Refinance break-even and lifetime savings
    Refinance(RefinanceArgs),
    /// Future value of a deposit plus level contributions
    FutureValue(FutureValueArgs),
    /// Savings growth projection with a yearly or per-period series
    Growth(GrowthArgs),
    /// Periodic rate implied by a present value and payments
    ImpliedRate(ImpliedRateArgs),
    /// Number of payments needed to retire a balance
    Payoff(PayoffArgs),
    /// 401(k)-style retirement projection with employer match
    Retirement(RetirementArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // stdout carries the result; logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::time_value::run_payment(args),
        Commands::Loan(args) => commands::loans::run_loan(args),
        Commands::Mortgage(args) => commands::loans::run_mortgage(args),
        Commands::Refinance(args) => commands::loans::run_refinance(args),
        Commands::FutureValue(args) => commands::time_value::run_future_value(args),
        Commands::Growth(args) => commands::savings::run_growth(args),
        Commands::ImpliedRate(args) => commands::time_value::run_implied_rate(args),
        Commands::Payoff(args) => commands::time_value::run_payoff(args),
        Commands::Retirement(args) => commands::savings::run_retirement(args),
        Commands::Version => {
            println!("finmath {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
