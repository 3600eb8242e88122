//! Error types for solver operations.

use rr_core::CoreError;
use thiserror::Error;

/// Errors that can occur while finding a root.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Domain error: {what}")]
    Domain { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    /// Domain errors are recoverable inside the line search.
    pub fn is_domain(&self) -> bool {
        matches!(self, SolverError::Domain { .. })
    }
}

impl From<CoreError> for SolverError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { what, value } => SolverError::Domain {
                what: format!("non-finite {what}: {value}"),
            },
            CoreError::InvalidArg { what } => SolverError::ProblemSetup {
                what: what.to_string(),
            },
            CoreError::LengthMismatch {
                what,
                expected,
                actual,
            } => SolverError::ProblemSetup {
                what: format!("{what} length mismatch: {actual} != {expected}"),
            },
        }
    }
}
