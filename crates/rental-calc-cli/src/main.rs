mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::mortgage::{PaymentArgs, ScheduleArgs};
use commands::rental::PropertyArgs;
use commands::scenarios::SensitivityArgs;

/// Rental property investment analysis
#[derive(Parser)]
#[command(
    name = "rentcalc",
    version,
    about = "Rental property investment analysis",
    long_about = "A CLI for evaluating rental property purchases with decimal precision. \
                  Computes mortgage payments, NOI, cash flow, cap rate, cash-on-cash \
                  return, DSCR and an investment recommendation, plus amortisation \
                  schedules and two-way sensitivity grids."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Full analysis: metrics, validation findings and warnings
    Analyze(PropertyArgs),
    /// Compute the metric set only
    Calculate(PropertyArgs),
    /// Report field errors for the calculator form
    Validate(PropertyArgs),
    /// Monthly payment and lifetime interest for a fixed-rate loan
    Payment(PaymentArgs),
    /// Year-by-year amortisation schedule
    Schedule(ScheduleArgs),
    /// Two-way sensitivity grid over any two form fields
    Sensitivity(SensitivityArgs),
    /// List supported loan types and their terms
    LoanTypes,
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

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::rental::run_analyze(args),
        Commands::Calculate(args) => commands::rental::run_calculate(args),
        Commands::Validate(args) => commands::rental::run_validate(args),
        Commands::Payment(args) => commands::mortgage::run_payment(args),
        Commands::Schedule(args) => commands::mortgage::run_schedule(args),
        Commands::Sensitivity(args) => commands::scenarios::run_sensitivity(args),
        Commands::LoanTypes => commands::rental::run_loan_types(),
        Commands::Version => {
            println!("rentcalc {}", env!("CARGO_PKG_VERSION"));
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
