pub mod error;
pub mod rental;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use error::RentalCalcError;
pub use rental::{analyze, calculate, validate, CalculatedResults, FieldErrors, PropertyInputs};
pub use types::*;

/// Standard result type for all rental-calc operations
pub type RentalCalcResult<T> = Result<T, RentalCalcError>;
