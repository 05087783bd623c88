//! Error types for the forecasting engine

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("invalid input: {field} must be a non-negative amount (got {value})")]
    InvalidInput { field: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, ForecastError>;
