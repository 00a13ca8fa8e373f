//! Error type shared by scheme construction, the factory and checked queries.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HashingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Query radius {radius} exceeds construction radius {max_radius}")]
    RadiusExceeded { radius: f64, max_radius: f64 },
}

impl HashingError {
    pub fn invalid_argument(msg: impl ToString) -> Self {
        Self::InvalidArgument(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HashingError>;
