use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RentalCalcError;
use crate::rental::normalize::{round2, MAX_INPUT_MAGNITUDE};
use crate::types::{Money, Percent, Years};
use crate::RentalCalcResult;

/// Highest annual rate accepted by the loan-level operations.
pub const MAX_ANNUAL_RATE: Percent = dec!(100);

/// Longest term accepted by the loan-level operations.
pub const MAX_TERM_YEARS: u32 = 50;

/// Monthly periodic rate from an annual nominal percentage: R / 100 / 12.
pub fn monthly_rate(annual_rate: Percent) -> Decimal {
    annual_rate / dec!(1200)
}

/// Number of monthly payments for a term in years, rounded to whole months.
pub fn number_of_payments(term_years: Years) -> u64 {
    if term_years <= Decimal::ZERO {
        return 0;
    }
    term_years
        .checked_mul(dec!(12))
        .and_then(|months| months.round().to_u64())
        .unwrap_or(0)
}

/// Standard fixed-rate mortgage payment: P * i(1+i)^n / ((1+i)^n - 1)
///
/// Returns exactly zero when there is nothing to amortise (principal, rate or
/// term not positive), which is how an all-cash purchase is represented.
/// Inputs above `MAX_INPUT_MAGNITUDE` also give zero, the same as malformed
/// form text. Adjustable products go through the same formula at their
/// initial rate.
pub fn monthly_payment(principal: Money, annual_rate: Percent, term_years: Years) -> Money {
    if principal <= Decimal::ZERO || annual_rate <= Decimal::ZERO || term_years <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if [principal, annual_rate, term_years]
        .iter()
        .any(|v| *v > MAX_INPUT_MAGNITUDE)
    {
        return Decimal::ZERO;
    }
    let n = number_of_payments(term_years);
    if n == 0 {
        return Decimal::ZERO;
    }

    let i = monthly_rate(annual_rate);
    round2(amortising_payment(principal, i, n))
}

fn amortising_payment(principal: Money, i: Decimal, n: u64) -> Money {
    // Interest-only limit: what the formula tends to as (1+i)^n grows without bound
    let interest_only = match principal.checked_mul(i) {
        Some(v) => v,
        None => return Decimal::ZERO,
    };

    let compound = match (Decimal::ONE + i).checked_powu(n) {
        Some(c) => c,
        None => return interest_only,
    };
    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return principal / Decimal::from(n);
    }

    match interest_only.checked_mul(compound) {
        Some(numerator) => numerator / denominator,
        None => interest_only,
    }
}

/// Headline figures for a single loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub monthly_payment: Money,
    pub number_of_payments: u64,
    pub total_paid: Money,
    pub total_interest: Money,
}

/// Payment, count and totals for one loan.
///
/// A non-positive principal, rate or term gives an all-zero summary. Values
/// above the loan-level bounds are rejected rather than silently zeroed.
pub fn payment_summary(
    principal: Money,
    annual_rate: Percent,
    term_years: Years,
) -> RentalCalcResult<PaymentSummary> {
    validate_loan_bounds(principal, annual_rate, term_years)?;

    let payment = monthly_payment(principal, annual_rate, term_years);
    let n = if payment.is_zero() {
        0
    } else {
        number_of_payments(term_years)
    };
    let total_paid = round2(payment * Decimal::from(n));
    let total_interest = if n == 0 {
        Decimal::ZERO
    } else {
        round2(total_paid - principal)
    };
    Ok(PaymentSummary {
        monthly_payment: payment,
        number_of_payments: n,
        total_paid,
        total_interest,
    })
}

fn validate_loan_bounds(
    principal: Money,
    annual_rate: Percent,
    term_years: Years,
) -> RentalCalcResult<()> {
    if principal > MAX_INPUT_MAGNITUDE {
        return Err(RentalCalcError::InvalidInput {
            field: "principal".into(),
            reason: format!("Principal must be at most {MAX_INPUT_MAGNITUDE}"),
        });
    }
    if annual_rate > MAX_ANNUAL_RATE {
        return Err(RentalCalcError::InvalidInput {
            field: "annual_rate".into(),
            reason: format!("Interest rate must be at most {MAX_ANNUAL_RATE}"),
        });
    }
    if term_years > Decimal::from(MAX_TERM_YEARS) {
        return Err(RentalCalcError::InvalidInput {
            field: "term_years".into(),
            reason: format!("Term must be at most {MAX_TERM_YEARS} years"),
        });
    }
    Ok(())
}
