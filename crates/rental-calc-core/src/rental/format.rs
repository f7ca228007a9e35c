//! Display formatting. Every formatter prints exactly 2 decimal places,
//! matching the engine's rounding.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rental::normalize::round2;

/// How a result field should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayKind {
    Currency,
    Percent,
    Multiple,
    Years,
    Plain,
}

/// Classify a result or form field by name.
pub fn display_kind(field: &str) -> DisplayKind {
    match field {
        "loan_amount"
        | "monthly_payment"
        | "gross_monthly_income"
        | "vacancy_loss"
        | "effective_gross_income"
        | "total_monthly_expenses"
        | "noi"
        | "monthly_cash_flow"
        | "annual_cash_flow"
        | "total_cash_invested"
        | "profit_per_thousand"
        | "total_paid"
        | "total_interest"
        | "interest_paid"
        | "principal_paid"
        | "ending_balance"
        | "principal"
        | "purchase_price"
        | "down_payment"
        | "closing_costs"
        | "rehab_costs"
        | "monthly_rent"
        | "other_income"
        | "property_tax"
        | "insurance"
        | "hoa_fees"
        | "property_management"
        | "maintenance"
        | "capex"
        | "utilities"
        | "other_expenses" => DisplayKind::Currency,
        "cap_rate"
        | "cash_on_cash_return"
        | "one_percent_rule_ratio"
        | "rent_to_value_ratio"
        | "break_even_occupancy"
        | "operating_expense_ratio"
        | "interest_rate"
        | "annual_rate"
        | "vacancy_rate" => DisplayKind::Percent,
        "dscr" | "gross_rent_multiplier" => DisplayKind::Multiple,
        "payback_period_years" | "loan_term_years" | "loan_term" => DisplayKind::Years,
        _ => DisplayKind::Plain,
    }
}

/// Group the integer digits of an already-rounded value with commas.
fn group_thousands(value: Decimal) -> String {
    let text = format!("{:.2}", value.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{grouped}.{frac_part}")
}

/// `$1,078.03`, `-$511.97`
pub fn format_currency(value: Decimal) -> String {
    let rounded = round2(value);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}${}", group_thousands(rounded))
}

/// `9.54%`
pub fn format_percent(value: Decimal) -> String {
    format!("{:.2}%", round2(value))
}

/// `1.57x`
pub fn format_multiple(value: Decimal) -> String {
    format!("{:.2}x", round2(value))
}

/// `2.72 yrs`, or `N/A` when not applicable.
pub fn format_years(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{:.2} yrs", round2(v)),
        None => "N/A".to_string(),
    }
}

/// Format by kind. Plain values print with 2 dp and no decoration.
pub fn format_value(kind: DisplayKind, value: Decimal) -> String {
    match kind {
        DisplayKind::Currency => format_currency(value),
        DisplayKind::Percent => format_percent(value),
        DisplayKind::Multiple => format_multiple(value),
        DisplayKind::Years => format_years(Some(value)),
        DisplayKind::Plain => format!("{:.2}", round2(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency() {
        assert_eq!(format_currency(dec!(1078.03)), "$1,078.03");
        assert_eq!(format_currency(dec!(180000)), "$180,000.00");
        assert_eq!(format_currency(dec!(-511.97)), "-$511.97");
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(999.995)), "$1,000.00");
        assert_eq!(format_currency(dec!(1234567.891)), "$1,234,567.89");
    }

    #[test]
    fn test_currency_negative_rounds_to_zero() {
        assert_eq!(format_currency(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn test_percent_and_multiple() {
        assert_eq!(format_percent(dec!(10.14)), "10.14%");
        assert_eq!(format_percent(dec!(1.1)), "1.10%");
        assert_eq!(format_percent(dec!(36.7182)), "36.72%");
        assert_eq!(format_multiple(dec!(1.5677)), "1.57x");
    }

    #[test]
    fn test_years() {
        assert_eq!(format_years(Some(dec!(2.72))), "2.72 yrs");
        assert_eq!(format_years(None), "N/A");
    }

    #[test]
    fn test_display_kind() {
        assert_eq!(display_kind("monthly_cash_flow"), DisplayKind::Currency);
        assert_eq!(display_kind("cap_rate"), DisplayKind::Percent);
        assert_eq!(display_kind("dscr"), DisplayKind::Multiple);
        assert_eq!(display_kind("payback_period_years"), DisplayKind::Years);
        assert_eq!(display_kind("recommendation"), DisplayKind::Plain);
    }

    #[test]
    fn test_format_value_dispatch() {
        assert_eq!(format_value(DisplayKind::Currency, dec!(-5)), "-$5.00");
        assert_eq!(format_value(DisplayKind::Plain, dec!(3)), "3.00");
    }
}
