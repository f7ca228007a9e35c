use clap::Args;
use log::warn;
use serde_json::{json, Value};

use rental_calc_core::rental::rates::RateTable;
use rental_calc_core::rental::LoanType;
use rental_calc_core::{analyze, calculate, validate, PropertyInputs};

use crate::input;

/// Arguments shared by every command that evaluates the calculator form
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PropertyArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to JSON rate table used to fill a blank interest rate
    #[arg(long)]
    pub rates: Option<String>,

    /// Start from the calculator's pre-filled values instead of a blank form
    #[arg(long)]
    pub defaults: bool,

    /// Purchase price (accepts "200,000" or "$200000")
    #[arg(long, alias = "price")]
    pub purchase_price: Option<String>,

    /// Down payment
    #[arg(long, alias = "down")]
    pub down_payment: Option<String>,

    /// Closing costs
    #[arg(long)]
    pub closing_costs: Option<String>,

    /// Rehab costs
    #[arg(long)]
    pub rehab_costs: Option<String>,

    /// Explicit loan amount (defaults to price minus down payment)
    #[arg(long)]
    pub loan_amount: Option<String>,

    /// Annual interest rate in percent
    #[arg(long, alias = "rate")]
    pub interest_rate: Option<String>,

    /// Loan term in years
    #[arg(long, alias = "term")]
    pub loan_term: Option<String>,

    /// Loan product, e.g. 30-year-fixed, 5-1-arm
    #[arg(long, value_parser = parse_loan_type)]
    pub loan_type: Option<LoanType>,

    /// Monthly rent
    #[arg(long, alias = "rent")]
    pub monthly_rent: Option<String>,

    /// Other monthly income (parking, laundry)
    #[arg(long)]
    pub other_income: Option<String>,

    /// Monthly property tax
    #[arg(long)]
    pub property_tax: Option<String>,

    /// Monthly insurance
    #[arg(long)]
    pub insurance: Option<String>,

    /// Monthly HOA fees
    #[arg(long, alias = "hoa")]
    pub hoa_fees: Option<String>,

    /// Monthly property management fee
    #[arg(long)]
    pub property_management: Option<String>,

    /// Monthly maintenance
    #[arg(long)]
    pub maintenance: Option<String>,

    /// Monthly capital expenditure reserve
    #[arg(long)]
    pub capex: Option<String>,

    /// Monthly owner-paid utilities
    #[arg(long)]
    pub utilities: Option<String>,

    /// Other monthly expenses
    #[arg(long)]
    pub other_expenses: Option<String>,

    /// Vacancy rate in percent of rent
    #[arg(long, alias = "vacancy")]
    pub vacancy_rate: Option<String>,
}

pub fn parse_loan_type(label: &str) -> Result<LoanType, String> {
    LoanType::from_label(label).ok_or_else(|| {
        let known: Vec<&str> = LoanType::ALL.iter().map(|lt| lt.label()).collect();
        format!("unknown loan type '{}' (expected one of: {})", label, known.join(", "))
    })
}

/// Resolve the form from `--input`, piped stdin, or individual flags, then
/// apply the rate table when one is given.
pub fn load_inputs(args: PropertyArgs) -> Result<PropertyInputs, Box<dyn std::error::Error>> {
    let rates = args.rates.as_deref().map(load_rates).transpose()?;

    let inputs: PropertyInputs = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        from_flags(args)
    };

    Ok(match rates {
        Some(table) => table.apply_defaults(&inputs),
        None => inputs,
    })
}

pub fn load_rates(path: &str) -> Result<RateTable, Box<dyn std::error::Error>> {
    let text = input::file::read_text(path)?;
    Ok(RateTable::from_json(&text)?)
}

fn from_flags(args: PropertyArgs) -> PropertyInputs {
    let mut form = if args.defaults {
        PropertyInputs::default()
    } else {
        PropertyInputs::blank()
    };

    let overrides = [
        (&mut form.purchase_price, args.purchase_price),
        (&mut form.down_payment, args.down_payment),
        (&mut form.closing_costs, args.closing_costs),
        (&mut form.rehab_costs, args.rehab_costs),
        (&mut form.loan_amount, args.loan_amount),
        (&mut form.interest_rate, args.interest_rate),
        (&mut form.loan_term, args.loan_term),
        (&mut form.monthly_rent, args.monthly_rent),
        (&mut form.other_income, args.other_income),
        (&mut form.property_tax, args.property_tax),
        (&mut form.insurance, args.insurance),
        (&mut form.hoa_fees, args.hoa_fees),
        (&mut form.property_management, args.property_management),
        (&mut form.maintenance, args.maintenance),
        (&mut form.capex, args.capex),
        (&mut form.utilities, args.utilities),
        (&mut form.other_expenses, args.other_expenses),
        (&mut form.vacancy_rate, args.vacancy_rate),
    ];
    for (slot, value) in overrides {
        if let Some(text) = value {
            *slot = text;
        }
    }
    if args.loan_type.is_some() {
        form.loan_type = args.loan_type;
    }
    form
}

pub fn run_analyze(args: PropertyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = load_inputs(args)?;
    let result = analyze(&inputs);
    for warning in &result.warnings {
        warn!("{}", warning);
    }
    let headline = result.result.recommendation.headline();
    let mut value = serde_json::to_value(result)?;
    if let Some(envelope) = value.as_object_mut() {
        envelope.insert("headline".into(), json!(headline));
    }
    Ok(value)
}

pub fn run_calculate(args: PropertyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = load_inputs(args)?;
    Ok(serde_json::to_value(calculate(&inputs))?)
}

pub fn run_validate(args: PropertyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = load_inputs(args)?;
    let errors = validate(&inputs);
    Ok(json!({
        "valid": errors.is_empty(),
        "errors": errors,
    }))
}

pub fn run_loan_types() -> Result<Value, Box<dyn std::error::Error>> {
    let rows: Vec<Value> = LoanType::ALL
        .iter()
        .map(|lt| {
            json!({
                "loan_type": lt.label(),
                "name": lt.display_label(),
                "term_years": lt.term_years(),
                "adjustable": lt.is_adjustable(),
            })
        })
        .collect();
    Ok(Value::Array(rows))
}
