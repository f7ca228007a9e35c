use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentalCalcError;
use crate::rental::mortgage::{monthly_payment, monthly_rate, MAX_ANNUAL_RATE, MAX_TERM_YEARS};
use crate::rental::normalize::{round2, MAX_INPUT_MAGNITUDE};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::RentalCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub principal: Money,
    /// Annual nominal rate in percent
    pub annual_rate: Percent,
    pub term_years: u32,
    /// Date of the first payment; enables `payoff_date`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Totals for one loan year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub interest_paid: Money,
    pub principal_paid: Money,
    pub ending_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub monthly_payment: Money,
    pub number_of_payments: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    pub years: Vec<AmortizationYear>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Year-by-year amortisation of a fixed-rate loan.
///
/// Interest is charged in cents each month; the final payment absorbs any
/// residual so the balance ends at exactly zero.
pub fn amortization_schedule(
    input: &AmortizationInput,
) -> RentalCalcResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let months = input.term_years * 12;
    let i = monthly_rate(input.annual_rate);
    let payment = if input.annual_rate.is_zero() {
        round2(input.principal / Decimal::from(months))
    } else {
        monthly_payment(input.principal, input.annual_rate, Decimal::from(input.term_years))
    };

    let mut balance = input.principal;
    let mut years: Vec<AmortizationYear> = Vec::with_capacity(input.term_years as usize);
    let mut total_paid = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut payments_made: u32 = 0;

    for year in 1..=input.term_years {
        let mut interest_paid = Decimal::ZERO;
        let mut principal_paid = Decimal::ZERO;

        for month in 1..=12 {
            if balance <= Decimal::ZERO {
                break;
            }
            let interest = round2(balance * i);
            let is_last = year == input.term_years && month == 12;
            let principal_part = if is_last || payment - interest > balance {
                balance
            } else {
                payment - interest
            };

            interest_paid += interest;
            principal_paid += principal_part;
            balance -= principal_part;
            payments_made += 1;
        }

        total_interest += interest_paid;
        total_paid += interest_paid + principal_paid;
        years.push(AmortizationYear {
            year,
            interest_paid,
            principal_paid,
            ending_balance: balance,
        });
    }

    if payment - round2(input.principal * i) <= Decimal::ZERO && !input.principal.is_zero() {
        warnings.push("Payment does not cover monthly interest; loan will not amortise".into());
    }
    if input.annual_rate > dec!(15) {
        warnings.push(format!(
            "Interest rate of {}% is well above typical mortgage rates",
            input.annual_rate
        ));
    }

    let payoff_date = match input.start_date {
        Some(first) if payments_made > 0 => Some(payoff_date(first, payments_made)?),
        _ => None,
    };

    let output = AmortizationSchedule {
        monthly_payment: payment,
        number_of_payments: payments_made,
        total_paid: round2(total_paid),
        total_interest: round2(total_interest),
        years,
        payoff_date,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Rate Mortgage Amortisation (monthly compounding)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &AmortizationInput) -> RentalCalcResult<()> {
    if input.principal < Decimal::ZERO || input.principal > MAX_INPUT_MAGNITUDE {
        return Err(RentalCalcError::InvalidInput {
            field: "principal".into(),
            reason: format!("Principal must be between 0 and {MAX_INPUT_MAGNITUDE}"),
        });
    }
    if input.annual_rate < Decimal::ZERO || input.annual_rate > MAX_ANNUAL_RATE {
        return Err(RentalCalcError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Interest rate must be between 0 and 100".into(),
        });
    }
    if input.term_years == 0 || input.term_years > MAX_TERM_YEARS {
        return Err(RentalCalcError::InvalidInput {
            field: "term_years".into(),
            reason: format!("Term must be between 1 and {MAX_TERM_YEARS} years"),
        });
    }
    Ok(())
}

/// Date of the last payment when the first falls on `first_payment`.
fn payoff_date(first_payment: NaiveDate, payments: u32) -> RentalCalcResult<NaiveDate> {
    let offset = payments.saturating_sub(1);
    first_payment
        .checked_add_months(Months::new(offset))
        .ok_or_else(|| {
            RentalCalcError::DateError(format!(
                "payoff date overflows {offset} months after {first_payment}"
            ))
        })
}
