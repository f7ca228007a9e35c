use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentalCalcError;
use crate::rental::inputs::PropertyInputs;
use crate::rental::metrics::{calculate, CalculatedResults};
use crate::rental::normalize::{normalize, NormalizedInputs, MAX_INPUT_MAGNITUDE};
use crate::types::*;
use crate::RentalCalcResult;

/// Upper bound on sweep points per axis.
pub const MAX_SWEEP_POINTS: usize = 101;

/// Form field that can be swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    PurchasePrice,
    DownPayment,
    ClosingCosts,
    RehabCosts,
    InterestRate,
    LoanTerm,
    MonthlyRent,
    OtherIncome,
    PropertyTax,
    Insurance,
    PropertyManagement,
    Maintenance,
    Capex,
    VacancyRate,
}

impl InputField {
    pub fn name(self) -> &'static str {
        match self {
            InputField::PurchasePrice => "purchase_price",
            InputField::DownPayment => "down_payment",
            InputField::ClosingCosts => "closing_costs",
            InputField::RehabCosts => "rehab_costs",
            InputField::InterestRate => "interest_rate",
            InputField::LoanTerm => "loan_term",
            InputField::MonthlyRent => "monthly_rent",
            InputField::OtherIncome => "other_income",
            InputField::PropertyTax => "property_tax",
            InputField::Insurance => "insurance",
            InputField::PropertyManagement => "property_management",
            InputField::Maintenance => "maintenance",
            InputField::Capex => "capex",
            InputField::VacancyRate => "vacancy_rate",
        }
    }

    /// Normalised value of this field in the base case.
    fn base_value(self, n: &NormalizedInputs) -> Decimal {
        match self {
            InputField::PurchasePrice => n.purchase_price,
            InputField::DownPayment => n.down_payment,
            InputField::ClosingCosts => n.closing_costs,
            InputField::RehabCosts => n.rehab_costs,
            InputField::InterestRate => n.interest_rate,
            InputField::LoanTerm => n.loan_term_years,
            InputField::MonthlyRent => n.monthly_rent,
            InputField::OtherIncome => n.other_income,
            InputField::PropertyTax => n.property_tax,
            InputField::Insurance => n.insurance,
            InputField::PropertyManagement => n.property_management,
            InputField::Maintenance => n.maintenance,
            InputField::Capex => n.capex,
            InputField::VacancyRate => n.vacancy_rate,
        }
    }

    fn slot(self, inputs: &mut PropertyInputs) -> &mut String {
        match self {
            InputField::PurchasePrice => &mut inputs.purchase_price,
            InputField::DownPayment => &mut inputs.down_payment,
            InputField::ClosingCosts => &mut inputs.closing_costs,
            InputField::RehabCosts => &mut inputs.rehab_costs,
            InputField::InterestRate => &mut inputs.interest_rate,
            InputField::LoanTerm => &mut inputs.loan_term,
            InputField::MonthlyRent => &mut inputs.monthly_rent,
            InputField::OtherIncome => &mut inputs.other_income,
            InputField::PropertyTax => &mut inputs.property_tax,
            InputField::Insurance => &mut inputs.insurance,
            InputField::PropertyManagement => &mut inputs.property_management,
            InputField::Maintenance => &mut inputs.maintenance,
            InputField::Capex => &mut inputs.capex,
            InputField::VacancyRate => &mut inputs.vacancy_rate,
        }
    }

    fn set(self, inputs: &mut PropertyInputs, value: Decimal) {
        *self.slot(inputs) = value.to_string();
    }
}

/// Result metric reported in each grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMetric {
    MonthlyPayment,
    Noi,
    MonthlyCashFlow,
    AnnualCashFlow,
    CapRate,
    CashOnCashReturn,
    Dscr,
    BreakEvenOccupancy,
    PaybackPeriodYears,
    OperatingExpenseRatio,
    ProfitPerThousand,
}

impl OutputMetric {
    /// `None` only for a payback period that is not applicable.
    pub fn value(self, r: &CalculatedResults) -> Option<Decimal> {
        match self {
            OutputMetric::MonthlyPayment => Some(r.monthly_payment),
            OutputMetric::Noi => Some(r.noi),
            OutputMetric::MonthlyCashFlow => Some(r.monthly_cash_flow),
            OutputMetric::AnnualCashFlow => Some(r.annual_cash_flow),
            OutputMetric::CapRate => Some(r.cap_rate),
            OutputMetric::CashOnCashReturn => Some(r.cash_on_cash_return),
            OutputMetric::Dscr => Some(r.dscr),
            OutputMetric::BreakEvenOccupancy => Some(r.break_even_occupancy),
            OutputMetric::PaybackPeriodYears => r.payback_period_years,
            OutputMetric::OperatingExpenseRatio => Some(r.operating_expense_ratio),
            OutputMetric::ProfitPerThousand => Some(r.profit_per_thousand),
        }
    }
}

/// One axis of the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRange {
    pub field: InputField,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// Input for 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalSensitivityInput {
    /// Calculator form the sweeps start from
    pub base_inputs: PropertyInputs,
    pub variable_1: SweepRange,
    pub variable_2: SweepRange,
    pub output_metric: OutputMetric,
}

/// Output of 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalSensitivityOutput {
    pub variable_1_name: String,
    pub variable_2_name: String,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    pub output_metric: OutputMetric,
    /// Matrix[i][j] = metric when variable_1 = variable_1_values[i], variable_2 = variable_2_values[j]
    pub matrix: Vec<Vec<Option<Decimal>>>,
    /// Metric for the unmodified base inputs
    pub base_case_value: Option<Decimal>,
    /// Grid cell closest to the base inputs (row, col)
    pub base_case_position: (usize, usize),
}

/// Generate the sweep values for an axis from min to max with step.
fn generate_sweep_values(range: &SweepRange) -> RentalCalcResult<Vec<Decimal>> {
    let field = format!("variable:{}", range.field.name());
    if range.step <= Decimal::ZERO {
        return Err(RentalCalcError::InvalidInput {
            field,
            reason: "Step must be positive".into(),
        });
    }
    if range.min > range.max {
        return Err(RentalCalcError::InvalidInput {
            field,
            reason: "Min must be <= max".into(),
        });
    }
    if range.min.abs() > MAX_INPUT_MAGNITUDE || range.max.abs() > MAX_INPUT_MAGNITUDE {
        return Err(RentalCalcError::InvalidInput {
            field,
            reason: format!("Min and max must be within ±{MAX_INPUT_MAGNITUDE}"),
        });
    }
    let too_many = |field: String| RentalCalcError::InvalidInput {
        field,
        reason: format!("Sweep exceeds {MAX_SWEEP_POINTS} points; widen the step"),
    };

    let mut values = Vec::new();
    let mut current = Some(range.min);
    while let Some(value) = current.filter(|v| *v <= range.max) {
        if values.len() == MAX_SWEEP_POINTS {
            return Err(too_many(field));
        }
        values.push(value);
        current = value.checked_add(range.step);
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < range.max {
            if values.len() == MAX_SWEEP_POINTS {
                return Err(too_many(field));
            }
            values.push(range.max);
        }
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Recompute the calculator at every point of a two-way grid.
pub fn rental_sensitivity(
    input: &RentalSensitivityInput,
) -> RentalCalcResult<ComputationOutput<RentalSensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.variable_1.field == input.variable_2.field {
        return Err(RentalCalcError::InvalidInput {
            field: "variable_2".into(),
            reason: "Sensitivity variables must be different fields".into(),
        });
    }

    let base = normalize(&input.base_inputs);
    if base.purchase_price <= Decimal::ZERO || base.monthly_rent <= Decimal::ZERO {
        return Err(RentalCalcError::InsufficientData(
            "Base case needs a purchase price and monthly rent".into(),
        ));
    }

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = generate_sweep_values(&input.variable_2)?;

    let mut matrix = Vec::with_capacity(v1_values.len());
    let mut scenario = input.base_inputs.clone();
    for v1 in &v1_values {
        input.variable_1.field.set(&mut scenario, *v1);
        let mut row = Vec::with_capacity(v2_values.len());
        for v2 in &v2_values {
            input.variable_2.field.set(&mut scenario, *v2);
            row.push(input.output_metric.value(&calculate(&scenario)));
        }
        matrix.push(row);
    }

    let base_1 = input.variable_1.field.base_value(&base);
    let base_2 = input.variable_2.field.base_value(&base);
    for (range, base_value) in [(&input.variable_1, base_1), (&input.variable_2, base_2)] {
        if base_value < range.min || base_value > range.max {
            warnings.push(format!(
                "Base {} of {base_value} lies outside the swept range [{}, {}]",
                range.field.name(),
                range.min,
                range.max
            ));
        }
    }

    let base_case_value = input.output_metric.value(&calculate(&input.base_inputs));
    let base_case_position = (
        closest_index(&v1_values, base_1),
        closest_index(&v2_values, base_2),
    );

    debug!(
        "sensitivity grid {}x{} over {} / {}",
        v1_values.len(),
        v2_values.len(),
        input.variable_1.field.name(),
        input.variable_2.field.name()
    );

    let output = RentalSensitivityOutput {
        variable_1_name: input.variable_1.field.name().to_string(),
        variable_2_name: input.variable_2.field.name().to_string(),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: input.output_metric,
        matrix,
        base_case_value,
        base_case_position,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "2-Way Rental Sensitivity Analysis",
        &serde_json::json!({
            "variable_1": input.variable_1.field.name(),
            "variable_2": input.variable_2.field.name(),
            "output_metric": input.output_metric,
        }),
        warnings,
        elapsed,
        output,
    ))
}
