use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RentalCalcError;
use crate::rental::inputs::{LoanType, PropertyInputs};
use crate::types::Percent;
use crate::RentalCalcResult;

/// Default annual rates per loan type, as supplied by whatever rate source
/// the caller uses. The engine never fetches rates itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable {
    rates: BTreeMap<LoanType, Percent>,
}

impl RateTable {
    pub fn new() -> Self {
        RateTable::default()
    }

    /// Parse a JSON object such as `{"30-year-fixed": "6.85", "5-1-arm": "6.10"}`.
    pub fn from_json(json: &str) -> RentalCalcResult<Self> {
        let table: RateTable = serde_json::from_str(json)?;
        if let Some((loan_type, rate)) = table
            .rates
            .iter()
            .find(|(_, r)| **r < Decimal::ZERO || **r > Decimal::ONE_HUNDRED)
        {
            return Err(RentalCalcError::InvalidInput {
                field: loan_type.label().into(),
                reason: format!("Rate {rate} must be between 0 and 100"),
            });
        }
        Ok(table)
    }

    pub fn with_rate(mut self, loan_type: LoanType, rate: Percent) -> Self {
        self.rates.insert(loan_type, rate);
        self
    }

    pub fn rate_for(&self, loan_type: LoanType) -> Option<Percent> {
        self.rates.get(&loan_type).copied()
    }

    /// Pre-populate blank financing fields.
    ///
    /// A blank interest rate takes the table's rate for the form's loan type
    /// (30-year fixed when none is selected); a blank term takes the loan
    /// type's canonical term. Fields the user filled in are left alone.
    pub fn apply_defaults(&self, inputs: &PropertyInputs) -> PropertyInputs {
        let loan_type = inputs.loan_type.unwrap_or(LoanType::Fixed30);
        let mut filled = inputs.clone();

        if filled.interest_rate.trim().is_empty() {
            if let Some(rate) = self.rate_for(loan_type) {
                filled.interest_rate = rate.to_string();
            }
        }
        if filled.loan_term.trim().is_empty() {
            filled.loan_term = loan_type.term_years().to_string();
        }
        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_json() {
        let table = RateTable::from_json(r#"{"30-year-fixed": "6.85", "5-1-arm": "6.10"}"#).unwrap();
        assert_eq!(table.rate_for(LoanType::Fixed30), Some(dec!(6.85)));
        assert_eq!(table.rate_for(LoanType::Arm5_1), Some(dec!(6.1)));
        assert_eq!(table.rate_for(LoanType::Fixed15), None);
    }

    #[test]
    fn test_from_json_rejects_unknown_loan_type() {
        assert!(RateTable::from_json(r#"{"balloon-7": "5"}"#).is_err());
    }

    #[test]
    fn test_from_json_rejects_out_of_range_rate() {
        match RateTable::from_json(r#"{"15-year-fixed": "120"}"#) {
            Err(RentalCalcError::InvalidInput { field, .. }) => assert_eq!(field, "15-year-fixed"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_defaults_fills_blank_rate_and_term() {
        let table = RateTable::new().with_rate(LoanType::Fixed15, dec!(5.25));
        let inputs = PropertyInputs {
            interest_rate: "".into(),
            loan_term: "".into(),
            loan_type: Some(LoanType::Fixed15),
            ..PropertyInputs::default()
        };
        let filled = table.apply_defaults(&inputs);
        assert_eq!(filled.interest_rate, "5.25");
        assert_eq!(filled.loan_term, "15");
    }

    #[test]
    fn test_apply_defaults_keeps_user_values() {
        let table = RateTable::new().with_rate(LoanType::Fixed30, dec!(7.0));
        let inputs = PropertyInputs::default();
        assert_eq!(table.apply_defaults(&inputs), inputs);
    }

    #[test]
    fn test_apply_defaults_without_loan_type_uses_thirty_year() {
        let table = RateTable::new().with_rate(LoanType::Fixed30, dec!(6.5));
        let inputs = PropertyInputs {
            interest_rate: "".into(),
            loan_type: None,
            ..PropertyInputs::default()
        };
        assert_eq!(table.apply_defaults(&inputs).interest_rate, "6.5");
    }
}
