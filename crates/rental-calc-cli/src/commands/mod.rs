pub mod mortgage;
pub mod rental;
pub mod scenarios;
