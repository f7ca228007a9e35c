use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::rental::inputs::{LoanType, PropertyInputs};
use crate::types::{Money, Percent, Years};

/// Largest magnitude accepted from a text field. Anything bigger is treated
/// as malformed so the metric chain can never overflow 96-bit mantissas.
pub const MAX_INPUT_MAGNITUDE: Decimal = dec!(1000000000000);

/// Decimal places kept for monetary values.
pub const MONEY_DP: u32 = 2;

/// Decimal places kept for percentage inputs (interest, vacancy).
pub const RATE_DP: u32 = 4;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Strip thousands separators, a leading currency sign and a trailing
/// percent sign. Returns `None` when nothing numeric remains.
fn clean(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let body = body.strip_prefix('$').unwrap_or(body);
    let digits: String = body.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() {
        return None;
    }
    Some(if negative { format!("-{digits}") } else { digits })
}

fn try_parse(text: &str) -> Option<Decimal> {
    let cleaned = clean(text)?;
    let value = Decimal::from_str(&cleaned).ok()?;
    if value.abs() > MAX_INPUT_MAGNITUDE {
        return None;
    }
    Some(value)
}

/// Parse a free-form form value. Empty or malformed text is 0, never an error.
pub fn parse_amount(text: &str) -> Decimal {
    try_parse(text).unwrap_or(Decimal::ZERO)
}

/// True when the text is blank or parses cleanly.
pub fn is_well_formed(text: &str) -> bool {
    text.trim().is_empty() || try_parse(text).is_some()
}

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Round to cents, half away from zero (0.005 -> 0.01).
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RATE_DP, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Normalised inputs
// ---------------------------------------------------------------------------

/// Parsed and rounded form values with the loan term and amount resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedInputs {
    pub purchase_price: Money,
    pub down_payment: Money,
    pub closing_costs: Money,
    pub rehab_costs: Money,
    /// Explicit loan amount, or price minus down payment. May be negative;
    /// validation reports that case.
    pub loan_amount: Money,
    pub interest_rate: Percent,
    pub loan_term_years: Years,
    pub loan_type: Option<LoanType>,
    pub monthly_rent: Money,
    pub other_income: Money,
    pub property_tax: Money,
    pub insurance: Money,
    pub hoa_fees: Money,
    pub property_management: Money,
    pub maintenance: Money,
    pub capex: Money,
    pub utilities: Money,
    pub other_expenses: Money,
    pub vacancy_rate: Percent,
}

fn money(text: &str) -> Money {
    round2(parse_amount(text))
}

fn rate(text: &str) -> Percent {
    round_rate(parse_amount(text))
}

/// Resolve the amortisation term: explicit text wins, then the loan type.
pub fn resolve_loan_term(inputs: &PropertyInputs) -> Years {
    if !inputs.loan_term.trim().is_empty() {
        return rate(&inputs.loan_term);
    }
    inputs
        .loan_type
        .map(|lt| Decimal::from(lt.term_years()))
        .unwrap_or(Decimal::ZERO)
}

/// Resolve the loan principal: explicit text wins, then price minus down.
pub fn resolve_loan_amount(inputs: &PropertyInputs) -> Money {
    if !inputs.loan_amount.trim().is_empty() {
        return money(&inputs.loan_amount);
    }
    round2(money(&inputs.purchase_price) - money(&inputs.down_payment))
}

pub fn normalize(inputs: &PropertyInputs) -> NormalizedInputs {
    NormalizedInputs {
        purchase_price: money(&inputs.purchase_price),
        down_payment: money(&inputs.down_payment),
        closing_costs: money(&inputs.closing_costs),
        rehab_costs: money(&inputs.rehab_costs),
        loan_amount: resolve_loan_amount(inputs),
        interest_rate: rate(&inputs.interest_rate),
        loan_term_years: resolve_loan_term(inputs),
        loan_type: inputs.loan_type,
        monthly_rent: money(&inputs.monthly_rent),
        other_income: money(&inputs.other_income),
        property_tax: money(&inputs.property_tax),
        insurance: money(&inputs.insurance),
        hoa_fees: money(&inputs.hoa_fees),
        property_management: money(&inputs.property_management),
        maintenance: money(&inputs.maintenance),
        capex: money(&inputs.capex),
        utilities: money(&inputs.utilities),
        other_expenses: money(&inputs.other_expenses),
        vacancy_rate: rate(&inputs.vacancy_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_thousands_separators() {
        assert_eq!(parse_amount("200,000"), dec!(200000));
        assert_eq!(parse_amount("1,234,567.89"), dec!(1234567.89));
        assert_eq!(parse_amount("  2200 "), dec!(2200));
    }

    #[test]
    fn test_parse_currency_and_percent_signs() {
        assert_eq!(parse_amount("$1,500"), dec!(1500));
        assert_eq!(parse_amount("5.99%"), dec!(5.99));
        assert_eq!(parse_amount("-$250"), dec!(-250));
    }

    #[test]
    fn test_parse_malformed_is_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("12abc"), Decimal::ZERO);
        assert_eq!(parse_amount("$"), Decimal::ZERO);
        assert_eq!(parse_amount("1.2.3"), Decimal::ZERO);
    }

    #[test]
    fn test_parse_rejects_huge_values() {
        assert_eq!(parse_amount("1000000000000"), dec!(1000000000000));
        assert_eq!(parse_amount("1000000000000.01"), Decimal::ZERO);
        assert!(!is_well_formed("99999999999999999999"));
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed(""));
        assert!(is_well_formed("   "));
        assert!(is_well_formed("1,000"));
        assert!(!is_well_formed("ten"));
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
        assert_eq!(round2(dec!(1.004)), dec!(1.00));
        assert_eq!(round2(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round2(dec!(2.675)), dec!(2.68));
    }

    #[test]
    fn test_loan_amount_derived_from_price_and_down() {
        let inputs = PropertyInputs::default();
        assert_eq!(resolve_loan_amount(&inputs), dec!(180000));
    }

    #[test]
    fn test_explicit_loan_amount_wins() {
        let inputs = PropertyInputs {
            loan_amount: "150,000".into(),
            ..PropertyInputs::default()
        };
        assert_eq!(resolve_loan_amount(&inputs), dec!(150000));
    }

    #[test]
    fn test_negative_derived_loan_not_clamped() {
        let inputs = PropertyInputs {
            down_payment: "250,000".into(),
            ..PropertyInputs::default()
        };
        assert_eq!(resolve_loan_amount(&inputs), dec!(-50000));
    }

    #[test]
    fn test_loan_term_falls_back_to_loan_type() {
        let inputs = PropertyInputs {
            loan_term: "".into(),
            loan_type: Some(LoanType::Fixed15),
            ..PropertyInputs::default()
        };
        assert_eq!(resolve_loan_term(&inputs), dec!(15));

        let explicit = PropertyInputs {
            loan_term: "20".into(),
            loan_type: Some(LoanType::Fixed15),
            ..PropertyInputs::default()
        };
        assert_eq!(resolve_loan_term(&explicit), dec!(20));

        let neither = PropertyInputs {
            loan_term: "".into(),
            loan_type: None,
            ..PropertyInputs::default()
        };
        assert_eq!(resolve_loan_term(&neither), Decimal::ZERO);
    }

    #[test]
    fn test_normalize_rounds_money_to_cents() {
        let inputs = PropertyInputs {
            monthly_rent: "2200.456".into(),
            interest_rate: "6.12345".into(),
            ..PropertyInputs::default()
        };
        let n = normalize(&inputs);
        assert_eq!(n.monthly_rent, dec!(2200.46));
        assert_eq!(n.interest_rate, dec!(6.1235));
    }
}
