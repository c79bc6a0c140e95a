use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_amortization_core::amortization::analysis::{
    self, ExistingLoanInput, NewPurchaseInput,
};
use loan_amortization_core::amortization::level_payment::{
    self, term_years_to_months, LevelPaymentInput,
};
use loan_amortization_core::amortization::payoff::{self, PayoffInput};
use loan_amortization_core::amortization::schedule::{self, ScheduleInput};
use loan_amortization_core::presentation::RoundForDisplay;

use super::{resolve_input, Context};

type CommandResult = Result<Value, Box<dyn std::error::Error>>;

/// Fetch a flag required once flag-based input has been chosen.
fn required<T>(value: Option<T>, flag: &str) -> Result<T, Box<dyn std::error::Error>> {
    value.ok_or_else(|| format!("{flag} is required (or provide --input)").into())
}

// ---------------------------------------------------------------------------
// Args
// ---------------------------------------------------------------------------

/// Arguments for a fixed-payment amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Outstanding principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a decimal (e.g. 0.05 for 5%)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Required monthly payment (interest + principal)
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Additional monthly principal payment
    #[arg(long)]
    pub additional: Option<Decimal>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a payoff projection
#[derive(Args)]
pub struct PayoffArgs {
    /// Outstanding principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a decimal
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Current monthly payment
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Additional monthly principal payment
    #[arg(long)]
    pub additional: Option<Decimal>,

    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the months-remaining projection
#[derive(Args)]
pub struct RemainingTermArgs {
    #[arg(long)]
    pub principal: Decimal,

    #[arg(long)]
    pub annual_rate: Decimal,

    #[arg(long)]
    pub payment: Decimal,
}

/// Arguments for a level payment
#[derive(Args)]
pub struct LevelPaymentArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a decimal
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Loan term in months
    #[arg(long, conflicts_with = "term_years")]
    pub term_months: Option<u32>,

    /// Loan term in years
    #[arg(long)]
    pub term_years: Option<Decimal>,

    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for an existing-loan analysis
#[derive(Args)]
pub struct ExistingLoanArgs {
    /// Current principal remaining
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Current annual interest rate as a decimal
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Current monthly loan payment
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Additional monthly principal payment
    #[arg(long)]
    pub additional: Option<Decimal>,

    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a new-purchase analysis
#[derive(Args)]
pub struct NewPurchaseArgs {
    /// Total purchase price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Down payment
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Annual interest rate as a decimal
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub term_years: Option<Decimal>,

    /// Additional monthly principal payment
    #[arg(long)]
    pub additional: Option<Decimal>,

    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

// ---------------------------------------------------------------------------
// Runners
// ---------------------------------------------------------------------------

pub fn run_schedule(args: ScheduleArgs, ctx: &Context) -> CommandResult {
    let from_flags = match args.principal {
        Some(principal) => Some(ScheduleInput {
            principal,
            annual_rate: required(args.annual_rate, "--annual-rate")?,
            base_payment: required(args.payment, "--payment")?,
            additional_payment: args.additional.unwrap_or(Decimal::ZERO),
            max_months: None,
        }),
        None => None,
    };
    let mut sched_input: ScheduleInput = resolve_input(
        args.input.as_deref(),
        from_flags,
        "--principal/--annual-rate/--payment, --input <file> or stdin required for a schedule",
    )?;
    sched_input.max_months.get_or_insert(ctx.max_months);

    let result = schedule::generate_schedule(&sched_input)?;
    ctx.finish(result)
}

pub fn run_payoff(args: PayoffArgs, ctx: &Context) -> CommandResult {
    let from_flags = match args.principal {
        Some(principal) => Some(PayoffInput {
            principal,
            annual_rate: required(args.annual_rate, "--annual-rate")?,
            monthly_payment: required(args.payment, "--payment")?,
            additional_payment: args.additional.unwrap_or(Decimal::ZERO),
            max_months: None,
        }),
        None => None,
    };
    let mut payoff_input: PayoffInput = resolve_input(
        args.input.as_deref(),
        from_flags,
        "--principal/--annual-rate/--payment, --input <file> or stdin required for a payoff projection",
    )?;
    payoff_input.max_months.get_or_insert(ctx.max_months);

    let result = payoff::analyze_payoff(&payoff_input)?;
    ctx.finish(result)
}

pub fn run_remaining_term(args: RemainingTermArgs, ctx: &Context) -> CommandResult {
    let term = payoff::remaining_term_capped(
        args.principal,
        args.annual_rate,
        args.payment,
        ctx.max_months,
    )?;
    let term = if ctx.round_output { term.rounded() } else { term };
    Ok(serde_json::json!({ "result": term }))
}

pub fn run_level_payment(args: LevelPaymentArgs, ctx: &Context) -> CommandResult {
    let from_flags = match args.principal {
        Some(principal) => {
            let term_months = match (args.term_months, args.term_years) {
                (Some(months), _) => months,
                (None, Some(years)) => term_years_to_months(years)?,
                (None, None) => {
                    return Err(
                        "--term-months or --term-years is required (or provide --input)".into(),
                    );
                }
            };
            Some(LevelPaymentInput {
                principal,
                annual_rate: required(args.annual_rate, "--annual-rate")?,
                term_months,
            })
        }
        None => None,
    };
    let lp_input: LevelPaymentInput = resolve_input(
        args.input.as_deref(),
        from_flags,
        "--principal/--annual-rate/--term-months, --input <file> or stdin required for a level payment",
    )?;

    let result = level_payment::analyze_level_payment(&lp_input)?;
    ctx.finish(result)
}

pub fn run_existing_loan(args: ExistingLoanArgs, ctx: &Context) -> CommandResult {
    let from_flags = match args.balance {
        Some(current_balance) => Some(ExistingLoanInput {
            current_balance,
            annual_rate: required(args.annual_rate, "--annual-rate")?,
            monthly_payment: required(args.payment, "--payment")?,
            additional_payment: args.additional.unwrap_or(Decimal::ZERO),
            max_months: None,
        }),
        None => None,
    };
    let mut loan_input: ExistingLoanInput = resolve_input(
        args.input.as_deref(),
        from_flags,
        "--balance/--annual-rate/--payment, --input <file> or stdin required for existing loan analysis",
    )?;
    loan_input.max_months.get_or_insert(ctx.max_months);

    let result = analysis::analyze_existing_loan(&loan_input)?;
    ctx.finish(result)
}

pub fn run_new_purchase(args: NewPurchaseArgs, ctx: &Context) -> CommandResult {
    let from_flags = match args.price {
        Some(purchase_price) => Some(NewPurchaseInput {
            purchase_price,
            down_payment: args.down_payment.unwrap_or(Decimal::ZERO),
            annual_rate: required(args.annual_rate, "--annual-rate")?,
            term_years: required(args.term_years, "--term-years")?,
            additional_payment: args.additional.unwrap_or(Decimal::ZERO),
            max_months: None,
        }),
        None => None,
    };
    let mut purchase_input: NewPurchaseInput = resolve_input(
        args.input.as_deref(),
        from_flags,
        "--price/--annual-rate/--term-years, --input <file> or stdin required for new purchase analysis",
    )?;
    purchase_input.max_months.get_or_insert(ctx.max_months);

    let result = analysis::analyze_new_purchase(&purchase_input)?;
    ctx.finish(result)
}
