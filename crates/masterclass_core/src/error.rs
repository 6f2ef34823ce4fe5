//! Errors raised by primitive construction and context lookup

use thiserror::Error;

/// Developer-facing misuse errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PrimitiveError {
    /// A part looked up a root that was never provided
    #[error("{part} must be used within {root}")]
    MissingContext {
        part: &'static str,
        root: &'static str,
    },

    #[error("invalid range: min ({min}) is greater than max ({max})")]
    InvalidRange { min: f64, max: f64 },

    #[error("invalid step {0}: step must be finite and greater than zero")]
    InvalidStep(f64),
}

pub type Result<T> = std::result::Result<T, PrimitiveError>;
