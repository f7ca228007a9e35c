use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

use rental_calc_core::rental::{amortization, format, mortgage, rates::RateTable, LoanType};
use rental_calc_core::PropertyInputs;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_decimal(value: &str) -> NapiResult<Decimal> {
    Decimal::from_str(value.trim()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Calculator form
// ---------------------------------------------------------------------------

/// Parse the form, filling a blank rate from an optional rate table.
fn read_form(input_json: &str, rates_json: Option<String>) -> NapiResult<PropertyInputs> {
    let inputs: PropertyInputs = serde_json::from_str(input_json).map_err(to_napi_error)?;
    match rates_json {
        Some(json) => {
            let table = RateTable::from_json(&json).map_err(to_napi_error)?;
            Ok(table.apply_defaults(&inputs))
        }
        None => Ok(inputs),
    }
}

#[napi]
pub fn calculate(input_json: String, rates_json: Option<String>) -> NapiResult<String> {
    let inputs = read_form(&input_json, rates_json)?;
    let output = rental_calc_core::calculate(&inputs);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze(input_json: String, rates_json: Option<String>) -> NapiResult<String> {
    let inputs = read_form(&input_json, rates_json)?;
    let output = rental_calc_core::analyze(&inputs);
    let headline = output.result.recommendation.headline();
    let mut value = serde_json::to_value(&output).map_err(to_napi_error)?;
    if let Some(envelope) = value.as_object_mut() {
        envelope.insert("headline".into(), serde_json::json!(headline));
    }
    serde_json::to_string(&value).map_err(to_napi_error)
}

#[napi]
pub fn validate(input_json: String) -> NapiResult<String> {
    let inputs: PropertyInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = rental_calc_core::validate(&inputs);
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Pre-populated calculator form.
#[napi]
pub fn default_inputs() -> NapiResult<String> {
    serde_json::to_string(&PropertyInputs::default()).map_err(to_napi_error)
}

#[napi]
pub fn loan_types() -> NapiResult<String> {
    let rows: Vec<serde_json::Value> = LoanType::ALL
        .iter()
        .map(|lt| {
            serde_json::json!({
                "loan_type": lt.label(),
                "name": lt.display_label(),
                "term_years": lt.term_years(),
                "adjustable": lt.is_adjustable(),
            })
        })
        .collect();
    serde_json::to_string(&rows).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PaymentInput {
    principal: Decimal,
    annual_rate: Decimal,
    term_years: Decimal,
}

#[napi]
pub fn payment_summary(input_json: String) -> NapiResult<String> {
    let input: PaymentInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage::payment_summary(input.principal, input.annual_rate, input.term_years)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: amortization::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::amortization_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn rental_sensitivity(input_json: String) -> NapiResult<String> {
    let input: rental_calc_core::scenarios::sensitivity::RentalSensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = rental_calc_core::scenarios::sensitivity::rental_sensitivity(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[napi]
pub fn format_currency(value: String) -> NapiResult<String> {
    Ok(format::format_currency(parse_decimal(&value)?))
}

#[napi]
pub fn format_percent(value: String) -> NapiResult<String> {
    Ok(format::format_percent(parse_decimal(&value)?))
}

/// Format a result field by name, e.g. `("dscr", "1.47")` -> `1.47x`.
#[napi]
pub fn format_field(field: String, value: String) -> NapiResult<String> {
    let kind = format::display_kind(&field);
    Ok(format::format_value(kind, parse_decimal(&value)?))
}
