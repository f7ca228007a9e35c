use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use crate::rental::inputs::PropertyInputs;
use crate::rental::mortgage::number_of_payments;
use crate::rental::normalize::{is_well_formed, normalize, resolve_loan_amount};

/// Field name -> human readable message. Empty means the form is valid.
pub type FieldErrors = BTreeMap<String, String>;

const MAX_INTEREST_RATE: Decimal = dec!(50);
const MAX_LOAN_TERM_YEARS: Decimal = dec!(50);

/// Check the raw form and report which fields to flag.
///
/// Advisory only: `calculate` still runs on whatever was entered.
pub fn validate(inputs: &PropertyInputs) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for (field, text) in text_fields(inputs) {
        if !is_well_formed(text) {
            errors.insert(field.to_string(), "Must be a number".to_string());
        }
    }

    let n = normalize(inputs);
    let mut flag = |field: &str, failed: bool, message: &str| {
        if failed && !errors.contains_key(field) {
            errors.insert(field.to_string(), message.to_string());
        }
    };

    flag(
        "purchase_price",
        n.purchase_price <= Decimal::ZERO,
        "Purchase price must be greater than 0",
    );
    flag(
        "monthly_rent",
        n.monthly_rent <= Decimal::ZERO,
        "Monthly rent must be greater than 0",
    );
    flag(
        "down_payment",
        n.down_payment < Decimal::ZERO,
        "Down payment cannot be negative",
    );
    flag(
        "interest_rate",
        n.interest_rate < Decimal::ZERO || n.interest_rate > MAX_INTEREST_RATE,
        "Interest rate must be between 0 and 50",
    );
    flag(
        "loan_term",
        number_of_payments(n.loan_term_years) == 0 || n.loan_term_years > MAX_LOAN_TERM_YEARS,
        "Loan term must be at least one month and at most 50 years",
    );
    flag(
        "vacancy_rate",
        n.vacancy_rate < Decimal::ZERO || n.vacancy_rate > dec!(100),
        "Vacancy rate must be between 0 and 100",
    );

    let other_money = [
        ("closing_costs", n.closing_costs),
        ("rehab_costs", n.rehab_costs),
        ("other_income", n.other_income),
        ("property_tax", n.property_tax),
        ("insurance", n.insurance),
        ("hoa_fees", n.hoa_fees),
        ("property_management", n.property_management),
        ("maintenance", n.maintenance),
        ("capex", n.capex),
        ("utilities", n.utilities),
        ("other_expenses", n.other_expenses),
    ];
    for (field, value) in other_money {
        flag(field, value < Decimal::ZERO, "Cannot be negative");
    }

    if inputs.loan_amount.trim().is_empty() {
        flag(
            "loan_amount",
            resolve_loan_amount(inputs) < Decimal::ZERO,
            "Down payment cannot exceed the purchase price",
        );
    } else {
        flag(
            "loan_amount",
            n.loan_amount < Decimal::ZERO,
            "Loan amount cannot be negative",
        );
    }

    errors
}

fn text_fields(inputs: &PropertyInputs) -> [(&'static str, &str); 18] {
    [
        ("purchase_price", inputs.purchase_price.as_str()),
        ("down_payment", inputs.down_payment.as_str()),
        ("closing_costs", inputs.closing_costs.as_str()),
        ("rehab_costs", inputs.rehab_costs.as_str()),
        ("loan_amount", inputs.loan_amount.as_str()),
        ("interest_rate", inputs.interest_rate.as_str()),
        ("loan_term", inputs.loan_term.as_str()),
        ("monthly_rent", inputs.monthly_rent.as_str()),
        ("other_income", inputs.other_income.as_str()),
        ("property_tax", inputs.property_tax.as_str()),
        ("insurance", inputs.insurance.as_str()),
        ("hoa_fees", inputs.hoa_fees.as_str()),
        ("property_management", inputs.property_management.as_str()),
        ("maintenance", inputs.maintenance.as_str()),
        ("capex", inputs.capex.as_str()),
        ("utilities", inputs.utilities.as_str()),
        ("other_expenses", inputs.other_expenses.as_str()),
        ("vacancy_rate", inputs.vacancy_rate.as_str()),
    ]
}
