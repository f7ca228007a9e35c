use clap::Args;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;

use rental_calc_core::scenarios::sensitivity::{
    self, InputField, OutputMetric, RentalSensitivityInput, SweepRange,
};
use rental_calc_core::PropertyInputs;

use crate::input;

/// Arguments for a two-way sensitivity grid
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to a full sensitivity JSON input (overrides the other flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to JSON file with the base calculator form
    #[arg(long)]
    pub base_inputs: Option<String>,

    /// First sweep in format field:min:max:step
    /// (e.g. "interest_rate:5:8:0.5")
    #[arg(long)]
    pub var1: Option<String>,

    /// Second sweep in format field:min:max:step
    /// (e.g. "monthly_rent:1800:2600:200")
    #[arg(long)]
    pub var2: Option<String>,

    /// Metric reported in each cell, e.g. monthly_cash_flow, cap_rate, dscr
    #[arg(long, default_value = "monthly_cash_flow")]
    pub metric: String,
}

/// Parse a snake_case name into one of the core enums.
fn parse_name<T: DeserializeOwned>(
    name: &str,
    kind: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    serde_json::from_value(Value::String(name.trim().to_string()))
        .map_err(|_| format!("unknown {} '{}'", kind, name).into())
}

fn parse_sweep(text: &str) -> Result<SweepRange, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Sensitivity variable must be field:min:max:step, got '{}'",
            text
        )
        .into());
    }
    let field: InputField = parse_name(parts[0], "input field")?;
    Ok(SweepRange {
        field,
        min: parts[1].parse::<Decimal>()?,
        max: parts[2].parse::<Decimal>()?,
        step: parts[3].parse::<Decimal>()?,
    })
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input: RentalSensitivityInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else {
        let base_inputs: PropertyInputs = match args.base_inputs {
            Some(ref path) => input::file::read_json(path)?,
            None => match input::stdin::read_stdin()? {
                Some(data) => data,
                None => PropertyInputs::default(),
            },
        };
        let var1 = args
            .var1
            .as_deref()
            .ok_or("--var1 is required (or provide --input)")?;
        let var2 = args
            .var2
            .as_deref()
            .ok_or("--var2 is required (or provide --input)")?;
        RentalSensitivityInput {
            base_inputs,
            variable_1: parse_sweep(var1)?,
            variable_2: parse_sweep(var2)?,
            output_metric: parse_name::<OutputMetric>(&args.metric, "metric")?,
        }
    };

    let result = sensitivity::rental_sensitivity(&sens_input)?;
    Ok(serde_json::to_value(result)?)
}
