//! High-level solver interface.

use crate::error::{SolverError, SolverResult};
use crate::newton::{NewtonConfig, NewtonResult, newton_solve};
use crate::problem::RootProblem;
use nalgebra::DVector;
use tracing::info;

/// Find a root of `problem` starting from `x0`.
///
/// This function:
/// 1. Validates the configuration and the initial guess
/// 2. Wraps the problem's residual with a length check
/// 3. Runs damped Newton with the configured finite difference Jacobian
///
/// Non-convergence is an error; a returned result always has `converged == true`.
pub fn solve<P>(problem: &P, x0: DVector<f64>, config: &NewtonConfig) -> SolverResult<NewtonResult>
where
    P: RootProblem + ?Sized,
{
    config.validate()?;

    let dim = problem.dimension();
    if dim == 0 {
        return Err(SolverError::ProblemSetup {
            what: "System has zero dimension".to_string(),
        });
    }
    if x0.len() != dim {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "Initial guess dimension mismatch: expected {}, got {}",
                dim,
                x0.len()
            ),
        });
    }
    if let Some(i) = x0.iter().position(|v| !v.is_finite()) {
        return Err(SolverError::ProblemSetup {
            what: format!("Initial guess entry {} is not finite", i),
        });
    }

    let residual_fn = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
        let r = problem.residual(x)?;
        if r.len() != dim {
            return Err(SolverError::ProblemSetup {
                what: format!("Residual length mismatch: {} != {}", r.len(), dim),
            });
        }
        Ok(r)
    };

    let jacobian_fn = |x: &DVector<f64>| -> SolverResult<nalgebra::DMatrix<f64>> {
        config.jacobian.evaluate(x, &residual_fn, config.fd_epsilon)
    };

    let result = newton_solve(x0, &residual_fn, jacobian_fn, config)?;

    info!(
        dimension = dim,
        iterations = result.iterations,
        residual_norm = result.residual_norm,
        "root found"
    );

    Ok(result)
}
