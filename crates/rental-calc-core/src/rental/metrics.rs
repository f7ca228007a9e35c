use log::{debug, trace};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::rental::inputs::PropertyInputs;
use crate::rental::mortgage::monthly_payment;
use crate::rental::normalize::{normalize, round2, NormalizedInputs};
use crate::rental::recommendation::{classify, InvestmentTier, ONE_PERCENT_RULE};
use crate::rental::validation::validate;
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Percent, Years};

/// DSCR most lenders require on investment property.
const LENDER_MIN_DSCR: Decimal = dec!(1.25);
/// Break-even occupancy above which a small vacancy spike turns cash flow negative.
const HIGH_BREAK_EVEN_OCCUPANCY: Decimal = dec!(85);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything derived from one evaluation of the calculator form.
///
/// Currency values are in dollars per month unless prefixed `annual_`;
/// percentages are in percentage points. Every value is rounded to 2 dp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedResults {
    // Financing
    pub loan_amount: Money,
    pub loan_term_years: Years,
    pub monthly_payment: Money,

    // Income and expenses
    pub gross_monthly_income: Money,
    pub vacancy_loss: Money,
    pub effective_gross_income: Money,
    pub total_monthly_expenses: Money,
    /// Net operating income (monthly, before debt service)
    pub noi: Money,

    // Cash flow
    pub monthly_cash_flow: Money,
    pub annual_cash_flow: Money,
    pub total_cash_invested: Money,

    // Returns
    pub cap_rate: Percent,
    pub cash_on_cash_return: Percent,
    pub one_percent_rule_ratio: Percent,
    pub passes_one_percent_rule: bool,
    pub rent_to_value_ratio: Percent,

    // Risk
    pub dscr: Multiple,
    pub gross_rent_multiplier: Multiple,
    pub break_even_occupancy: Percent,
    /// `None` when annual cash flow is not positive
    pub payback_period_years: Option<Years>,
    pub operating_expense_ratio: Percent,
    /// Monthly cash flow per $1,000 of cash invested
    pub profit_per_thousand: Money,

    pub recommendation: InvestmentTier,
    pub is_good_investment: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate the calculator form.
///
/// Total and deterministic: malformed text counts as zero and every ratio
/// with a zero denominator has a fixed fallback, so this never fails.
pub fn calculate(inputs: &PropertyInputs) -> CalculatedResults {
    derive_metrics(&normalize(inputs))
}

/// Evaluate the form and wrap the results with validation findings and
/// advisory warnings.
pub fn analyze(inputs: &PropertyInputs) -> ComputationOutput<CalculatedResults> {
    let start = Instant::now();

    let errors = validate(inputs);
    let results = calculate(inputs);

    let mut warnings: Vec<String> = errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect();
    warnings.extend(metric_warnings(&results));

    debug!(
        "analyzed property: noi={} cash_flow={} tier={:?} ({} warnings)",
        results.noi,
        results.monthly_cash_flow,
        results.recommendation,
        warnings.len()
    );

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Rental Property Cash Flow Analysis (monthly NOI, amortised debt service)",
        inputs,
        warnings,
        elapsed,
        results,
    )
}

/// Derive every metric from normalised inputs.
///
/// The order is fixed: each step only reads quantities produced (and
/// rounded) by earlier steps.
pub fn derive_metrics(n: &NormalizedInputs) -> CalculatedResults {
    let payment = monthly_payment(n.loan_amount, n.interest_rate, n.loan_term_years);

    // 1-3. Income
    let gross_monthly_income = round2(n.monthly_rent + n.other_income);
    let vacancy_loss = round2(n.monthly_rent * n.vacancy_rate / dec!(100));
    let effective_gross_income = round2(gross_monthly_income - vacancy_loss);

    // 4-5. Operating expenses exclude debt service
    let total_monthly_expenses = round2(
        n.property_tax
            + n.insurance
            + n.hoa_fees
            + n.property_management
            + n.maintenance
            + n.capex
            + n.utilities
            + n.other_expenses,
    );
    let noi = round2(effective_gross_income - total_monthly_expenses);

    // 6-8. Cash flow
    let monthly_cash_flow = round2(noi - payment);
    let annual_cash_flow = round2(monthly_cash_flow * dec!(12));
    let total_cash_invested = round2(n.down_payment + n.closing_costs + n.rehab_costs);

    // 9-11. Returns
    let cap_rate = percent_of(noi * dec!(12), n.purchase_price);
    let cash_on_cash_return = percent_of(annual_cash_flow, total_cash_invested);
    let one_percent_rule_ratio = percent_of(n.monthly_rent, n.purchase_price);

    // 12. DSCR is not applicable without debt service
    let dscr = ratio_of(noi, payment);

    // 13-16. Risk
    let break_even_occupancy = percent_of(payment + total_monthly_expenses, gross_monthly_income);
    let payback_period_years = if annual_cash_flow > Decimal::ZERO {
        Some(round2(total_cash_invested / annual_cash_flow))
    } else {
        None
    };
    let operating_expense_ratio = percent_of(total_monthly_expenses, gross_monthly_income);
    let profit_per_thousand = if total_cash_invested.is_zero() {
        Decimal::ZERO
    } else {
        round2(monthly_cash_flow / (total_cash_invested / dec!(1000)))
    };

    let rent_to_value_ratio = one_percent_rule_ratio;
    let gross_rent_multiplier = ratio_of(n.purchase_price, n.monthly_rent * dec!(12));

    let recommendation = classify(cash_on_cash_return, one_percent_rule_ratio, monthly_cash_flow);

    trace!(
        "payment={payment} egi={effective_gross_income} expenses={total_monthly_expenses} \
         cap_rate={cap_rate} coc={cash_on_cash_return}"
    );

    CalculatedResults {
        loan_amount: n.loan_amount,
        loan_term_years: n.loan_term_years,
        monthly_payment: payment,
        gross_monthly_income,
        vacancy_loss,
        effective_gross_income,
        total_monthly_expenses,
        noi,
        monthly_cash_flow,
        annual_cash_flow,
        total_cash_invested,
        cap_rate,
        cash_on_cash_return,
        one_percent_rule_ratio,
        passes_one_percent_rule: one_percent_rule_ratio >= ONE_PERCENT_RULE,
        rent_to_value_ratio,
        dscr,
        gross_rent_multiplier,
        break_even_occupancy,
        payback_period_years,
        operating_expense_ratio,
        profit_per_thousand,
        recommendation,
        is_good_investment: recommendation.is_good_investment(),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `numerator / denominator * 100`, or 0 for a zero denominator.
fn percent_of(numerator: Decimal, denominator: Decimal) -> Percent {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        round2(numerator / denominator * dec!(100))
    }
}

/// `numerator / denominator`, or 0 for a zero denominator.
fn ratio_of(numerator: Decimal, denominator: Decimal) -> Multiple {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        round2(numerator / denominator)
    }
}

fn metric_warnings(r: &CalculatedResults) -> Vec<String> {
    let mut warnings = Vec::new();

    if r.monthly_cash_flow < Decimal::ZERO {
        warnings.push(format!(
            "Negative monthly cash flow of {} — the property does not carry itself",
            r.monthly_cash_flow
        ));
    }
    if !r.monthly_payment.is_zero() && r.dscr < LENDER_MIN_DSCR {
        warnings.push(format!(
            "DSCR of {:.2} is below {LENDER_MIN_DSCR:.2}x — most lenders will not finance this",
            r.dscr
        ));
    }
    if !r.passes_one_percent_rule {
        warnings.push(format!(
            "Monthly rent is {}% of price — fails the 1% rule",
            r.one_percent_rule_ratio
        ));
    }
    if r.break_even_occupancy > HIGH_BREAK_EVEN_OCCUPANCY {
        warnings.push(format!(
            "Break-even occupancy of {}% exceeds {HIGH_BREAK_EVEN_OCCUPANCY}% — little vacancy headroom",
            r.break_even_occupancy
        ));
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reference_scenario() {
        let r = calculate(&PropertyInputs::default());

        assert_eq!(r.loan_amount, dec!(180000));
        assert_eq!(r.monthly_payment, dec!(1078.03));
        assert_eq!(r.gross_monthly_income, dec!(2200));
        assert_eq!(r.vacancy_loss, dec!(110.00));
        assert_eq!(r.effective_gross_income, dec!(2090.00));
        assert_eq!(r.total_monthly_expenses, dec!(500.00));
        assert_eq!(r.noi, dec!(1590.00));
        assert_eq!(r.monthly_cash_flow, dec!(511.97));
        assert_eq!(r.annual_cash_flow, dec!(6143.64));
        assert_eq!(r.total_cash_invested, dec!(20000));
        assert_eq!(r.one_percent_rule_ratio, dec!(1.10));
        assert!(r.passes_one_percent_rule);
        assert_eq!(r.cap_rate, dec!(9.54));
    }

    #[test]
    fn test_reference_scenario_secondary_metrics() {
        let r = calculate(&PropertyInputs::default());

        // 6143.64 / 20000 = 30.7182%
        assert_eq!(r.cash_on_cash_return, dec!(30.72));
        // 1590 / 1078.03 = 1.4749
        assert_eq!(r.dscr, dec!(1.47));
        // (1078.03 + 500) / 2200 = 71.73%
        assert_eq!(r.break_even_occupancy, dec!(71.73));
        // 20000 / 6143.64 = 3.2554 years
        assert_eq!(r.payback_period_years, Some(dec!(3.26)));
        // 500 / 2200 = 22.73%
        assert_eq!(r.operating_expense_ratio, dec!(22.73));
        // 511.97 / 20 = 25.5985
        assert_eq!(r.profit_per_thousand, dec!(25.60));
        // 200000 / 26400 = 7.5757
        assert_eq!(r.gross_rent_multiplier, dec!(7.58));
        assert_eq!(r.rent_to_value_ratio, dec!(1.10));
        assert_eq!(r.recommendation, InvestmentTier::Excellent);
        assert!(r.is_good_investment);
    }

    #[test]
    fn test_vacancy_applies_to_rent_only() {
        let inputs = PropertyInputs {
            other_income: "300".into(),
            ..PropertyInputs::default()
        };
        let r = calculate(&inputs);
        assert_eq!(r.gross_monthly_income, dec!(2500));
        assert_eq!(r.vacancy_loss, dec!(110.00));
        assert_eq!(r.effective_gross_income, dec!(2390.00));
    }

    #[test]
    fn test_all_expense_lines_counted() {
        let inputs = PropertyInputs {
            property_tax: "1".into(),
            insurance: "2".into(),
            hoa_fees: "3".into(),
            property_management: "4".into(),
            maintenance: "5".into(),
            capex: "6".into(),
            utilities: "7".into(),
            other_expenses: "8".into(),
            ..PropertyInputs::default()
        };
        assert_eq!(calculate(&inputs).total_monthly_expenses, dec!(36));
    }

    #[test]
    fn test_other_expenses_not_in_cash_invested() {
        let inputs = PropertyInputs {
            closing_costs: "5,000".into(),
            rehab_costs: "10,000".into(),
            other_expenses: "2,500".into(),
            ..PropertyInputs::default()
        };
        assert_eq!(calculate(&inputs).total_cash_invested, dec!(35000));
    }

    #[test]
    fn test_zero_price_guards() {
        let inputs = PropertyInputs {
            purchase_price: "0".into(),
            down_payment: "0".into(),
            ..PropertyInputs::default()
        };
        let r = calculate(&inputs);
        assert_eq!(r.cap_rate, Decimal::ZERO);
        assert_eq!(r.one_percent_rule_ratio, Decimal::ZERO);
        assert_eq!(r.gross_rent_multiplier, Decimal::ZERO);
        assert_eq!(r.monthly_payment, Decimal::ZERO);
        assert_eq!(r.dscr, Decimal::ZERO);
        assert_eq!(r.cash_on_cash_return, Decimal::ZERO);
        assert_eq!(r.profit_per_thousand, Decimal::ZERO);
    }

    #[test]
    fn test_zero_income_guards() {
        let inputs = PropertyInputs {
            monthly_rent: "".into(),
            ..PropertyInputs::default()
        };
        let r = calculate(&inputs);
        assert_eq!(r.break_even_occupancy, Decimal::ZERO);
        assert_eq!(r.operating_expense_ratio, Decimal::ZERO);
        assert_eq!(r.payback_period_years, None);
        assert_eq!(r.recommendation, InvestmentTier::Poor);
    }

    #[test]
    fn test_negative_cash_flow_has_no_payback() {
        let inputs = PropertyInputs {
            monthly_rent: "1,200".into(),
            ..PropertyInputs::default()
        };
        let r = calculate(&inputs);
        assert!(r.monthly_cash_flow < Decimal::ZERO);
        assert_eq!(r.payback_period_years, None);
        assert_eq!(r.recommendation, InvestmentTier::Poor);
        assert!(!r.is_good_investment);
    }

    #[test]
    fn test_all_cash_purchase() {
        let inputs = PropertyInputs {
            down_payment: "200,000".into(),
            ..PropertyInputs::default()
        };
        let r = calculate(&inputs);
        assert_eq!(r.loan_amount, Decimal::ZERO);
        assert_eq!(r.monthly_payment, Decimal::ZERO);
        assert_eq!(r.dscr, Decimal::ZERO);
        assert_eq!(r.monthly_cash_flow, r.noi);
    }

    #[test]
    fn test_blank_form_is_all_zero() {
        let r = calculate(&PropertyInputs::blank());
        assert_eq!(r.noi, Decimal::ZERO);
        assert_eq!(r.monthly_cash_flow, Decimal::ZERO);
        assert_eq!(r.cap_rate, Decimal::ZERO);
        assert_eq!(r.payback_period_years, None);
        assert_eq!(r.recommendation, InvestmentTier::Poor);
    }

    #[test]
    fn test_garbage_text_never_panics() {
        let inputs = PropertyInputs {
            purchase_price: "lots".into(),
            monthly_rent: "9".repeat(40),
            interest_rate: "-3".into(),
            loan_term: "∞".into(),
            vacancy_rate: "1e5".into(),
            ..PropertyInputs::default()
        };
        let r = calculate(&inputs);
        assert_eq!(r.monthly_payment, Decimal::ZERO);
        assert_eq!(r.cap_rate, Decimal::ZERO);
    }

    #[test]
    fn test_extreme_values_never_panic() {
        let inputs = PropertyInputs {
            purchase_price: "0.01".into(),
            down_payment: "-1,000,000,000,000".into(),
            closing_costs: "1,000,000,000,000".into(),
            rehab_costs: "0.01".into(),
            interest_rate: "1,000,000,000,000".into(),
            loan_term: "1,000,000,000,000".into(),
            monthly_rent: "1,000,000,000,000".into(),
            vacancy_rate: "-1,000,000,000,000".into(),
            ..PropertyInputs::default()
        };
        let r = calculate(&inputs);
        assert!(r.monthly_payment > Decimal::ZERO);
        assert!(r.payback_period_years.is_none() || r.annual_cash_flow > Decimal::ZERO);
    }

    #[test]
    fn test_analyze_collects_validation_and_metric_warnings() {
        let inputs = PropertyInputs {
            monthly_rent: "1,200".into(),
            vacancy_rate: "150".into(),
            ..PropertyInputs::default()
        };
        let out = analyze(&inputs);
        assert!(out.warnings.iter().any(|w| w.starts_with("vacancy_rate:")));
        assert!(out.warnings.iter().any(|w| w.contains("Negative monthly cash flow")));
        assert!(out.warnings.iter().any(|w| w.contains("1% rule")));
        assert_eq!(out.result, calculate(&inputs));
    }

    #[test]
    fn test_analyze_clean_deal_has_no_warnings() {
        let out = analyze(&PropertyInputs::default());
        assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
        assert!(out.methodology.contains("Rental Property"));
        assert_eq!(out.assumptions["monthly_rent"], "2,200");
    }

    #[test]
    fn test_low_dscr_warning() {
        let inputs = PropertyInputs {
            monthly_rent: "1,700".into(),
            ..PropertyInputs::default()
        };
        let out = analyze(&inputs);
        // NOI = 1615 - 500 = 1115; DSCR = 1115 / 1078.03 = 1.03
        assert_eq!(out.result.dscr, dec!(1.03));
        assert!(out.warnings.iter().any(|w| w.contains("DSCR of 1.03")));
        assert!(out.warnings.iter().any(|w| w.contains("Break-even occupancy of 92.83%")));
    }
}
