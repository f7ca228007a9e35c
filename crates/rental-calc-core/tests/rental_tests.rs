use rental_calc_core::rental::amortization::{amortization_schedule, AmortizationInput};
use rental_calc_core::rental::mortgage::{monthly_payment, payment_summary};
use rental_calc_core::rental::rates::RateTable;
use rental_calc_core::rental::{InvestmentTier, LoanType};
use rental_calc_core::{analyze, calculate, validate, PropertyInputs};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Reference scenario
// ===========================================================================

#[test]
fn test_reference_scenario_end_to_end() {
    let r = calculate(&PropertyInputs::default());

    assert_eq!(r.loan_amount, dec!(180000));
    assert_eq!(r.monthly_payment, dec!(1078.03));
    assert_eq!(r.vacancy_loss, dec!(110.00));
    assert_eq!(r.effective_gross_income, dec!(2090.00));
    assert_eq!(r.total_monthly_expenses, dec!(500.00));
    assert_eq!(r.noi, dec!(1590.00));
    assert_eq!(r.monthly_cash_flow, dec!(511.97));
    assert_eq!(r.one_percent_rule_ratio, dec!(1.10));
    assert!(r.passes_one_percent_rule);
    assert_eq!(r.cap_rate, dec!(9.54));
    assert_eq!(r.recommendation, InvestmentTier::Excellent);
    assert_eq!(r.recommendation.headline(), "Excellent investment opportunity");
}

#[test]
fn test_reference_scenario_from_json() {
    let json = r#"{
        "purchase_price": 200000,
        "down_payment": "20,000",
        "interest_rate": 5.99,
        "loan_term": "30",
        "loan_type": "30-year-fixed",
        "monthly_rent": "$2,200",
        "property_tax": 100,
        "insurance": 100,
        "maintenance": 200,
        "capex": 100,
        "vacancy_rate": "5%"
    }"#;
    let inputs: PropertyInputs = serde_json::from_str(json).unwrap();
    assert_eq!(calculate(&inputs), calculate(&PropertyInputs::default()));
}

// ===========================================================================
// Determinism and rounding
// ===========================================================================

#[test]
fn test_calculate_is_deterministic() {
    let inputs = PropertyInputs {
        closing_costs: "4,321.09".into(),
        hoa_fees: "75".into(),
        vacancy_rate: "7.5".into(),
        ..PropertyInputs::default()
    };
    let first = calculate(&inputs);
    for _ in 0..5 {
        assert_eq!(calculate(&inputs), first);
    }
}

#[test]
fn test_all_money_outputs_have_two_decimals() {
    let inputs = PropertyInputs {
        purchase_price: "187,333.337".into(),
        monthly_rent: "1,999.999".into(),
        interest_rate: "6.125".into(),
        vacancy_rate: "3.333".into(),
        ..PropertyInputs::default()
    };
    let r = calculate(&inputs);
    for value in [
        r.monthly_payment,
        r.vacancy_loss,
        r.effective_gross_income,
        r.noi,
        r.monthly_cash_flow,
        r.annual_cash_flow,
        r.cap_rate,
        r.cash_on_cash_return,
        r.dscr,
        r.break_even_occupancy,
        r.operating_expense_ratio,
        r.profit_per_thousand,
    ] {
        assert!(value.scale() <= 2, "{value} has more than 2 dp");
    }
}

#[test]
fn test_rounded_inputs_reproduce_results() {
    let raw = PropertyInputs {
        purchase_price: "200000.004".into(),
        monthly_rent: "2200.001".into(),
        ..PropertyInputs::default()
    };
    let rounded = PropertyInputs {
        purchase_price: "200000.00".into(),
        monthly_rent: "2200.00".into(),
        ..PropertyInputs::default()
    };
    assert_eq!(calculate(&raw), calculate(&rounded));
}

// ===========================================================================
// Invariants
// ===========================================================================

#[test]
fn test_zero_principal_invariance() {
    for (rate, term) in [("0", "30"), ("5.99", "15"), ("12", "10"), ("", "")] {
        let inputs = PropertyInputs {
            down_payment: "200,000".into(),
            interest_rate: rate.into(),
            loan_term: term.into(),
            ..PropertyInputs::default()
        };
        let r = calculate(&inputs);
        assert_eq!(r.monthly_payment, Decimal::ZERO);
        assert_eq!(r.monthly_cash_flow, r.noi);
        assert_eq!(r.dscr, Decimal::ZERO);
    }
}

#[test]
fn test_cap_rate_sign_follows_noi() {
    for rent in ["400", "500", "526.32", "2,200"] {
        let inputs = PropertyInputs {
            monthly_rent: rent.into(),
            ..PropertyInputs::default()
        };
        let r = calculate(&inputs);
        assert_eq!(
            r.cap_rate.is_sign_negative() && !r.cap_rate.is_zero(),
            r.noi < Decimal::ZERO,
            "rent {rent}: cap {} noi {}",
            r.cap_rate,
            r.noi
        );
    }
}

#[test]
fn test_income_and_cash_flow_fall_with_vacancy() {
    let mut previous: Option<(Decimal, Decimal)> = None;
    for vacancy in 0..=100 {
        let inputs = PropertyInputs {
            vacancy_rate: vacancy.to_string(),
            ..PropertyInputs::default()
        };
        let r = calculate(&inputs);
        let (egi, cash_flow) = (r.effective_gross_income, r.monthly_cash_flow);
        if let Some((prev_egi, prev_cash_flow)) = previous {
            assert!(egi < prev_egi, "vacancy {vacancy}%: income {egi} >= {prev_egi}");
            assert!(
                cash_flow <= prev_cash_flow,
                "vacancy {vacancy}%: {cash_flow} > {prev_cash_flow}"
            );
        }
        previous = Some((egi, cash_flow));
    }
}

#[test]
fn test_zero_price_uses_fallbacks() {
    let inputs = PropertyInputs {
        purchase_price: "".into(),
        down_payment: "".into(),
        ..PropertyInputs::default()
    };
    let r = calculate(&inputs);
    assert_eq!(r.cap_rate, Decimal::ZERO);
    assert_eq!(r.one_percent_rule_ratio, Decimal::ZERO);
    assert!(!r.passes_one_percent_rule);
    assert_eq!(r.gross_rent_multiplier, Decimal::ZERO);
    assert_eq!(validate(&inputs)["purchase_price"], "Purchase price must be greater than 0");
}

#[test]
fn test_payback_only_for_positive_cash_flow() {
    for rent in ["1,000", "1,578.03", "1,800", "3,000"] {
        let inputs = PropertyInputs {
            monthly_rent: rent.into(),
            vacancy_rate: "0".into(),
            ..PropertyInputs::default()
        };
        let r = calculate(&inputs);
        match r.payback_period_years {
            Some(years) => {
                assert!(r.annual_cash_flow > Decimal::ZERO);
                assert!(years > Decimal::ZERO);
            }
            None => assert!(r.annual_cash_flow <= Decimal::ZERO),
        }
    }
}

// ===========================================================================
// Loan type, rates and schedule
// ===========================================================================

#[test]
fn test_loan_type_term_drives_payment() {
    let inputs = PropertyInputs {
        loan_term: "".into(),
        loan_type: Some(LoanType::Fixed15),
        ..PropertyInputs::default()
    };
    let r = calculate(&inputs);
    assert_eq!(r.loan_term_years, dec!(15));
    assert_eq!(r.monthly_payment, monthly_payment(dec!(180000), dec!(5.99), dec!(15)));
    assert!(r.monthly_payment > dec!(1078.03));
}

#[test]
fn test_rate_table_prefills_blank_rate() {
    let table = RateTable::from_json(r#"{"30-year-fixed": "5.99", "15-year-fixed": "5.25"}"#).unwrap();
    let inputs = PropertyInputs {
        interest_rate: "".into(),
        ..PropertyInputs::default()
    };
    let r = calculate(&table.apply_defaults(&inputs));
    assert_eq!(r, calculate(&PropertyInputs::default()));
}

#[test]
fn test_schedule_agrees_with_payment_summary() {
    let summary = payment_summary(dec!(180000), dec!(5.99), dec!(30)).unwrap();
    let schedule = amortization_schedule(&AmortizationInput {
        principal: dec!(180000),
        annual_rate: dec!(5.99),
        term_years: 30,
        start_date: None,
    })
    .unwrap()
    .result;

    assert_eq!(schedule.monthly_payment, summary.monthly_payment);
    assert_eq!(u64::from(schedule.number_of_payments), summary.number_of_payments);
    // Cent-level interest rounding drifts a few dollars over 360 months
    assert!((schedule.total_interest - summary.total_interest).abs() < dec!(5));
}

#[test]
fn test_analyze_envelope() {
    let out = analyze(&PropertyInputs::default());
    assert_eq!(out.result, calculate(&PropertyInputs::default()));
    assert_eq!(out.metadata.precision, "rust_decimal_128bit_2dp");
    assert!(out.warnings.is_empty());

    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["result"]["monthly_cash_flow"], "511.97");
    assert_eq!(json["result"]["recommendation"], "excellent");
}
