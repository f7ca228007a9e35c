use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent};

/// Cash-on-cash return above which a deal can be excellent.
const EXCELLENT_COC: Decimal = dec!(15);
/// Cash-on-cash return above which a deal is good.
const GOOD_COC: Decimal = dec!(8);
/// 1% rule threshold, in percent of purchase price.
pub const ONE_PERCENT_RULE: Decimal = dec!(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl InvestmentTier {
    pub fn is_good_investment(self) -> bool {
        matches!(self, InvestmentTier::Excellent | InvestmentTier::Good)
    }

    /// One-line verdict shown next to the tier.
    pub fn headline(self) -> &'static str {
        match self {
            InvestmentTier::Excellent => "Excellent investment opportunity",
            InvestmentTier::Good => "Good investment with solid returns",
            InvestmentTier::Fair => "Fair investment, returns are modest",
            InvestmentTier::Poor => "Poor investment, cash flow does not support the price",
        }
    }
}

/// Assign a tier by ordered rules; the first rule that matches wins.
pub fn classify(
    cash_on_cash_return: Percent,
    one_percent_rule_ratio: Percent,
    monthly_cash_flow: Money,
) -> InvestmentTier {
    let positive_cash_flow = monthly_cash_flow > Decimal::ZERO;

    if cash_on_cash_return > EXCELLENT_COC
        && one_percent_rule_ratio >= ONE_PERCENT_RULE
        && positive_cash_flow
    {
        InvestmentTier::Excellent
    } else if cash_on_cash_return > GOOD_COC && positive_cash_flow {
        InvestmentTier::Good
    } else if cash_on_cash_return > Decimal::ZERO && positive_cash_flow {
        InvestmentTier::Fair
    } else {
        InvestmentTier::Poor
    }
}
