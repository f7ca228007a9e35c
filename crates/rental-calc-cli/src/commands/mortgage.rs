use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rental_calc_core::rental::amortization::{self, AmortizationInput};
use rental_calc_core::rental::mortgage;
use rental_calc_core::rental::LoanType;

use crate::commands::rental::{load_rates, parse_loan_type};
use crate::input;

/// Arguments for a single payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in years (defaults to the loan type's term)
    #[arg(long)]
    pub term: Option<Decimal>,

    /// Loan product supplying the default term and rate
    #[arg(long, value_parser = parse_loan_type)]
    pub loan_type: Option<LoanType>,

    /// Path to JSON rate table used when --rate is omitted
    #[arg(long)]
    pub rates: Option<String>,
}

/// Arguments for an amortisation schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in whole years (defaults to the loan type's term)
    #[arg(long)]
    pub term: Option<u32>,

    /// Loan product supplying the default term
    #[arg(long, value_parser = parse_loan_type)]
    pub loan_type: Option<LoanType>,

    /// Date of the first payment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let principal = args.principal.ok_or("--principal is required")?;
    let rate = match args.rate {
        Some(rate) => rate,
        None => {
            let path = args
                .rates
                .as_deref()
                .ok_or("--rate is required (or provide --rates)")?;
            let loan_type = args.loan_type.unwrap_or(LoanType::Fixed30);
            load_rates(path)?
                .rate_for(loan_type)
                .ok_or_else(|| format!("no rate for {} in '{}'", loan_type.label(), path))?
        }
    };
    let term = match (args.term, args.loan_type) {
        (Some(term), _) => term,
        (None, Some(loan_type)) => Decimal::from(loan_type.term_years()),
        (None, None) => return Err("--term is required (or provide --loan-type)".into()),
    };

    let summary = mortgage::payment_summary(principal, rate, term)?;
    Ok(serde_json::to_value(summary)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: AmortizationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let term_years = args
            .term
            .or(args.loan_type.map(LoanType::term_years))
            .ok_or("--term is required (or provide --loan-type or --input)")?;
        AmortizationInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_years,
            start_date: args.start_date,
        }
    };
    let result = amortization::amortization_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
