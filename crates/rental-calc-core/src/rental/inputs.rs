use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Loan types
// ---------------------------------------------------------------------------

/// Mortgage product offered in the calculator form.
///
/// Each product maps to a canonical amortisation term. Adjustable products
/// amortise over their full nominal term at the initial rate; rate resets
/// are not modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoanType {
    #[serde(rename = "30-year-fixed")]
    Fixed30,
    #[serde(rename = "20-year-fixed")]
    Fixed20,
    #[serde(rename = "15-year-fixed")]
    Fixed15,
    #[serde(rename = "10-year-fixed")]
    Fixed10,
    #[serde(rename = "5-1-arm")]
    Arm5_1,
    #[serde(rename = "7-1-arm")]
    Arm7_1,
    #[serde(rename = "10-1-arm")]
    Arm10_1,
    #[serde(rename = "fha-30")]
    Fha30,
    #[serde(rename = "va-30")]
    Va30,
}

impl LoanType {
    pub const ALL: [LoanType; 9] = [
        LoanType::Fixed30,
        LoanType::Fixed20,
        LoanType::Fixed15,
        LoanType::Fixed10,
        LoanType::Arm5_1,
        LoanType::Arm7_1,
        LoanType::Arm10_1,
        LoanType::Fha30,
        LoanType::Va30,
    ];

    /// Canonical amortisation term in years.
    pub fn term_years(self) -> u32 {
        match self {
            LoanType::Fixed20 => 20,
            LoanType::Fixed15 => 15,
            LoanType::Fixed10 => 10,
            LoanType::Fixed30
            | LoanType::Arm5_1
            | LoanType::Arm7_1
            | LoanType::Arm10_1
            | LoanType::Fha30
            | LoanType::Va30 => 30,
        }
    }

    pub fn display_label(self) -> &'static str {
        match self {
            LoanType::Fixed30 => "30-Year Fixed",
            LoanType::Fixed20 => "20-Year Fixed",
            LoanType::Fixed15 => "15-Year Fixed",
            LoanType::Fixed10 => "10-Year Fixed",
            LoanType::Arm5_1 => "5/1 Adjustable",
            LoanType::Arm7_1 => "7/1 Adjustable",
            LoanType::Arm10_1 => "10/1 Adjustable",
            LoanType::Fha30 => "FHA 30-Year",
            LoanType::Va30 => "VA 30-Year",
        }
    }

    /// Serialized label, e.g. `5-1-arm`.
    pub fn label(self) -> &'static str {
        match self {
            LoanType::Fixed30 => "30-year-fixed",
            LoanType::Fixed20 => "20-year-fixed",
            LoanType::Fixed15 => "15-year-fixed",
            LoanType::Fixed10 => "10-year-fixed",
            LoanType::Arm5_1 => "5-1-arm",
            LoanType::Arm7_1 => "7-1-arm",
            LoanType::Arm10_1 => "10-1-arm",
            LoanType::Fha30 => "fha-30",
            LoanType::Va30 => "va-30",
        }
    }

    pub fn is_adjustable(self) -> bool {
        matches!(self, LoanType::Arm5_1 | LoanType::Arm7_1 | LoanType::Arm10_1)
    }

    pub fn from_label(label: &str) -> Option<LoanType> {
        let wanted = label.trim();
        LoanType::ALL
            .into_iter()
            .find(|lt| lt.label().eq_ignore_ascii_case(wanted))
    }
}

// ---------------------------------------------------------------------------
// Raw inputs
// ---------------------------------------------------------------------------

/// Raw calculator form values.
///
/// Every numeric field is kept as the text the user typed (thousands
/// separators allowed). Blank fields are valid and normalise to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default = "PropertyInputs::blank")]
pub struct PropertyInputs {
    // Acquisition
    #[serde(deserialize_with = "text_or_number")]
    pub purchase_price: String,
    #[serde(deserialize_with = "text_or_number")]
    pub down_payment: String,
    #[serde(deserialize_with = "text_or_number")]
    pub closing_costs: String,
    #[serde(deserialize_with = "text_or_number")]
    pub rehab_costs: String,

    // Financing
    /// Blank means purchase price minus down payment.
    #[serde(deserialize_with = "text_or_number")]
    pub loan_amount: String,
    /// Annual nominal rate in percent
    #[serde(deserialize_with = "text_or_number")]
    pub interest_rate: String,
    /// Term in years; blank falls back to the loan type's term
    #[serde(deserialize_with = "text_or_number")]
    pub loan_term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_type: Option<LoanType>,

    // Monthly income
    #[serde(deserialize_with = "text_or_number")]
    pub monthly_rent: String,
    #[serde(deserialize_with = "text_or_number")]
    pub other_income: String,

    // Monthly operating expenses
    #[serde(deserialize_with = "text_or_number")]
    pub property_tax: String,
    #[serde(deserialize_with = "text_or_number")]
    pub insurance: String,
    #[serde(deserialize_with = "text_or_number")]
    pub hoa_fees: String,
    #[serde(deserialize_with = "text_or_number")]
    pub property_management: String,
    #[serde(deserialize_with = "text_or_number")]
    pub maintenance: String,
    #[serde(deserialize_with = "text_or_number")]
    pub capex: String,
    #[serde(deserialize_with = "text_or_number")]
    pub utilities: String,
    #[serde(deserialize_with = "text_or_number")]
    pub other_expenses: String,

    /// Percent of gross rent lost to vacancy
    #[serde(deserialize_with = "text_or_number")]
    pub vacancy_rate: String,
}

impl PropertyInputs {
    /// Completely blank form.
    pub fn blank() -> Self {
        PropertyInputs {
            purchase_price: String::new(),
            down_payment: String::new(),
            closing_costs: String::new(),
            rehab_costs: String::new(),
            loan_amount: String::new(),
            interest_rate: String::new(),
            loan_term: String::new(),
            loan_type: None,
            monthly_rent: String::new(),
            other_income: String::new(),
            property_tax: String::new(),
            insurance: String::new(),
            hoa_fees: String::new(),
            property_management: String::new(),
            maintenance: String::new(),
            capex: String::new(),
            utilities: String::new(),
            other_expenses: String::new(),
            vacancy_rate: String::new(),
        }
    }
}

impl Default for PropertyInputs {
    /// Values the calculator form is pre-populated with.
    fn default() -> Self {
        PropertyInputs {
            purchase_price: "200,000".into(),
            down_payment: "20,000".into(),
            interest_rate: "5.99".into(),
            loan_term: "30".into(),
            loan_type: Some(LoanType::Fixed30),
            monthly_rent: "2,200".into(),
            property_tax: "100".into(),
            insurance: "100".into(),
            maintenance: "200".into(),
            capex: "100".into(),
            vacancy_rate: "5".into(),
            ..PropertyInputs::blank()
        }
    }
}

/// Accept either a JSON string or a JSON number for a form field.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}
