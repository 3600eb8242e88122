//! Error taxonomy for model operations.

use rr_core::CoreError;
use rr_solver::SolverError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A parameter violates the model's domain; detected before solving.
    #[error("Invalid parameter {name}: {reason}")]
    Parameter { name: &'static str, reason: String },

    /// The root finder did not converge.
    #[error("Convergence failed ({context}): {what}")]
    Convergence { context: &'static str, what: String },

    /// An iterate left the region where the model equations are defined.
    #[error("Domain error ({context}): {what}")]
    Domain { context: &'static str, what: String },

    #[error("Steady state does not satisfy the supplied parameters (residual norm {residual_norm:e})")]
    SteadyStateMismatch { residual_norm: f64 },

    #[error("Solver setup error ({context}): {what}")]
    Setup { context: &'static str, what: String },

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
    /// Attach the name of the failing operation to a solver error.
    pub fn from_solver(e: SolverError, context: &'static str) -> Self {
        match e {
            // A singular Jacobian ends the solve just like an exhausted budget.
            SolverError::ConvergenceFailed { what } | SolverError::Numeric { what } => {
                ModelError::Convergence { context, what }
            }
            SolverError::Domain { what } => ModelError::Domain { context, what },
            SolverError::ProblemSetup { what } => ModelError::Setup { context, what },
        }
    }

    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        ModelError::Parameter {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_errors_map_to_taxonomy() {
        let e = ModelError::from_solver(
            SolverError::Numeric {
                what: "singular".to_string(),
            },
            "transition",
        );
        assert!(matches!(e, ModelError::Convergence { context: "transition", .. }));

        let e = ModelError::from_solver(
            SolverError::Domain {
                what: "K < 0".to_string(),
            },
            "steady state",
        );
        assert!(matches!(e, ModelError::Domain { .. }));
        assert!(format!("{e}").contains("steady state"));
    }
}
