pub mod evaluations;
pub mod reports;
