mod commands;
mod input;
mod output;
mod settings;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Deserialize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::amortization::{
    ExistingLoanArgs, LevelPaymentArgs, NewPurchaseArgs, PayoffArgs, RemainingTermArgs,
    ScheduleArgs,
};
use commands::Context;

/// Loan amortization schedules and payoff projections
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Loan amortization schedules and payoff projections",
    long_about = "Builds monthly amortization schedules with decimal precision, projects \
                  payoff time and total interest under an additional principal payment, \
                  and computes level payments for new purchase loans."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (overrides the config file)
    #[arg(long, global = true)]
    output: Option<OutputFormat>,

    /// Path to a TOML settings file (default: ./loancalc.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Month cap for every projection (overrides the config file)
    #[arg(long, global = true)]
    max_months: Option<u32>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Month-by-month amortization schedule at a fixed payment
    Schedule(ScheduleArgs),
    /// Months to payoff and total interest at a (modified) payment
    Payoff(PayoffArgs),
    /// Months remaining at the current payment, with the final payment broken out
    RemainingTerm(RemainingTermArgs),
    /// Level monthly payment for a principal, rate and term
    LevelPayment(LevelPaymentArgs),
    /// Existing loan: payoff comparison with an additional principal payment
    ExistingLoan(ExistingLoanArgs),
    /// New purchase: level payment, total cost and additional-payment comparison
    NewPurchase(NewPurchaseArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = match settings::load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    if let Some(format) = cli.output {
        settings.output = format;
    }
    if let Some(max_months) = cli.max_months {
        settings.max_months = max_months;
    }
    tracing::debug!(?settings, "resolved settings");

    let ctx = Context::new(&settings);
    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::amortization::run_schedule(args, &ctx),
        Commands::Payoff(args) => commands::amortization::run_payoff(args, &ctx),
        Commands::RemainingTerm(args) => commands::amortization::run_remaining_term(args, &ctx),
        Commands::LevelPayment(args) => commands::amortization::run_level_payment(args, &ctx),
        Commands::ExistingLoan(args) => commands::amortization::run_existing_loan(args, &ctx),
        Commands::NewPurchase(args) => commands::amortization::run_new_purchase(args, &ctx),
        Commands::Version => {
            println!("loancalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&settings.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
