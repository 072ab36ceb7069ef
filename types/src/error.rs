//! Validation errors for the core types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Exchange ratios must be at least 1 in both directions.
    #[error("exchange ratio must be at least 1, got {0}")]
    InvalidRatio(u64),
}
