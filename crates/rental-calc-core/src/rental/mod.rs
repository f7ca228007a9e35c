pub mod amortization;
pub mod format;
pub mod inputs;
pub mod metrics;
pub mod mortgage;
pub mod normalize;
pub mod rates;
pub mod recommendation;
pub mod validation;

pub use inputs::{LoanType, PropertyInputs};
pub use metrics::{analyze, calculate, CalculatedResults};
pub use recommendation::InvestmentTier;
pub use validation::{validate, FieldErrors};
