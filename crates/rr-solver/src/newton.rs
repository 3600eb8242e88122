//! Damped Newton solver with domain-aware backtracking.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::JacobianMethod;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

/// Newton solver configuration.
#[derive(Clone, Debug)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: f64,
    /// Relative tolerance for residual norm (against the initial residual)
    pub rel_tol: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
    /// Finite difference scheme for the Jacobian
    pub jacobian: JacobianMethod,
    /// Relative finite difference step
    pub fd_epsilon: f64,
}

/// Defaults suit problems seeded within a few Newton steps of the root.
/// Distant seeds can need a larger `max_iterations`.
impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-10,
            rel_tol: 1e-12,
            line_search_beta: 0.5,
            max_line_search_iters: 30,
            jacobian: JacobianMethod::Forward,
            fd_epsilon: 1e-7,
        }
    }
}

impl NewtonConfig {
    pub fn validate(&self) -> SolverResult<()> {
        if self.max_iterations == 0 {
            return Err(setup("max_iterations must be greater than zero"));
        }
        if !(self.abs_tol.is_finite() && self.abs_tol >= 0.0) {
            return Err(setup("abs_tol must be finite and non-negative"));
        }
        if !(self.rel_tol.is_finite() && self.rel_tol >= 0.0) {
            return Err(setup("rel_tol must be finite and non-negative"));
        }
        if !(self.line_search_beta > 0.0 && self.line_search_beta < 1.0) {
            return Err(setup("line_search_beta must lie in (0, 1)"));
        }
        if !(self.fd_epsilon.is_finite() && self.fd_epsilon > 0.0) {
            return Err(setup("fd_epsilon must be finite and positive"));
        }
        Ok(())
    }
}

fn setup(what: &str) -> SolverError {
    SolverError::ProblemSetup {
        what: what.to_string(),
    }
}

/// Consecutive non-improving steps tolerated before the solve is abandoned.
pub const MAX_STALLED_STEPS: usize = 3;

/// Newton iteration result.
#[derive(Clone, Debug)]
pub struct NewtonResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of iterations
    pub iterations: usize,
    /// Converged flag
    pub converged: bool,
}

/// Newton solver with backtracking line search.
///
/// A trial point whose residual evaluation fails with a domain error is
/// treated like a trial that does not reduce the residual: the step is
/// shortened. If no trial in the line search is admissible the solve fails
/// with [`SolverError::Domain`]. When no trial reduces the residual the
/// shortest admissible trial is taken anyway; after [`MAX_STALLED_STEPS`] such
/// steps in a row the solve fails with [`SolverError::ConvergenceFailed`].
pub fn newton_solve<F, J>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
    J: Fn(&DVector<f64>) -> SolverResult<DMatrix<f64>>,
{
    let mut x = x0;
    let mut r = evaluate(&residual_fn, &x)?;
    let mut r_norm = r.norm();
    let r0_norm = r_norm;
    let mut stalled_steps = 0;

    for iter in 0..config.max_iterations {
        // Check convergence
        if is_converged(r_norm, r0_norm, config) {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
                converged: true,
            });
        }

        let jac = jacobian_fn(&x)?;

        // Solve J * dx = -r
        let dx = jac.lu().solve(&(-r.clone())).ok_or_else(|| SolverError::Numeric {
            what: format!("Jacobian solve failed at iteration {}", iter),
        })?;
        if dx.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::Numeric {
                what: format!("Non-finite Newton step at iteration {}", iter),
            });
        }

        let mut alpha = 1.0;
        let mut accepted = None;
        let mut fallback = None;
        let mut last_domain_error = None;

        for _ in 0..=config.max_line_search_iters {
            let x_trial = &x + alpha * &dx;
            match evaluate(&residual_fn, &x_trial) {
                Ok(r_trial) => {
                    let trial_norm = r_trial.norm();
                    if trial_norm < r_norm {
                        accepted = Some((x_trial, r_trial, trial_norm));
                        break;
                    }
                    fallback = Some((x_trial, r_trial, trial_norm));
                }
                Err(e) if e.is_domain() => {
                    debug!(iteration = iter, step = alpha, error = %e, "trial point rejected");
                    last_domain_error = Some(e);
                }
                Err(e) => return Err(e),
            }

            // Backtrack
            alpha *= config.line_search_beta;
        }

        let (x_new, r_new, r_new_norm) = match (accepted, fallback) {
            (Some(step), _) => {
                stalled_steps = 0;
                step
            }
            (None, Some(step)) => {
                stalled_steps += 1;
                warn!(
                    iteration = iter,
                    residual_norm = r_norm,
                    stalled_steps,
                    "line search did not reduce the residual"
                );
                if stalled_steps >= MAX_STALLED_STEPS {
                    return Err(SolverError::ConvergenceFailed {
                        what: format!(
                            "Line search stagnated at iteration {}, residual = {:e}",
                            iter, r_norm
                        ),
                    });
                }
                step
            }
            (None, None) => {
                return Err(last_domain_error.unwrap_or_else(|| SolverError::Domain {
                    what: format!("No admissible step at iteration {}", iter),
                }));
            }
        };

        debug!(
            iteration = iter + 1,
            residual_norm = r_new_norm,
            step = alpha,
            "newton step"
        );

        // Update solution
        x = x_new;
        r = r_new;
        r_norm = r_new_norm;
    }

    if is_converged(r_norm, r0_norm, config) {
        return Ok(NewtonResult {
            x,
            residual_norm: r_norm,
            iterations: config.max_iterations,
            converged: true,
        });
    }

    Err(SolverError::ConvergenceFailed {
        what: format!(
            "Maximum iterations {} reached, residual = {:e}",
            config.max_iterations, r_norm
        ),
    })
}

fn is_converged(r_norm: f64, r0_norm: f64, config: &NewtonConfig) -> bool {
    r_norm <= config.abs_tol || r_norm <= config.rel_tol * r0_norm
}

/// Evaluate the residual and reject non-finite entries as domain errors.
fn evaluate<F>(residual_fn: &F, x: &DVector<f64>) -> SolverResult<DVector<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let r = residual_fn(x)?;
    if let Some(i) = r.iter().position(|v| !v.is_finite()) {
        return Err(SolverError::Domain {
            what: format!("non-finite residual in equation {}", i),
        });
    }
    Ok(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jacobian::finite_difference_jacobian;

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0, x > 0
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let x0 = DVector::from_element(1, 3.0);
        let config = NewtonConfig::default();
        let result = newton_solve(x0, residual, jacobian, &config).unwrap();

        assert!(result.converged);
        assert!((result.x[0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn backtracks_out_of_domain() {
        // ln(x) = 1 from x = 10: the full Newton step lands at x < 0
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            if x[0] <= 0.0 {
                return Err(SolverError::Domain {
                    what: "log of non-positive value".to_string(),
                });
            }
            Ok(DVector::from_element(1, x[0].ln() - 1.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 1.0 / x[0]))
        };

        let x0 = DVector::from_element(1, 10.0);
        let result = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap();

        assert!(result.converged);
        assert!((result.x[0] - std::f64::consts::E).abs() < 1e-9);
    }

    #[test]
    fn nan_residual_is_a_domain_error() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0].sqrt()))
        };
        let jacobian = |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 1.0))
        };

        let x0 = DVector::from_element(1, -1.0);
        let err = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap_err();
        assert!(err.is_domain());
    }

    #[test]
    fn singular_jacobian_reports_numeric_error() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] + 1.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let x0 = DVector::from_element(1, 0.0);
        let err = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap_err();
        assert!(matches!(err, SolverError::Numeric { .. }));
    }

    #[test]
    fn iteration_budget_exhausted() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0].exp() - 2.0))
        };
        let jacobian = |x: &DVector<f64>| finite_difference_jacobian(x, residual, 1e-7);

        let config = NewtonConfig {
            max_iterations: 2,
            ..NewtonConfig::default()
        };
        let x0 = DVector::from_element(1, 5.0);
        let err = newton_solve(x0, residual, jacobian, &config).unwrap_err();
        assert!(matches!(err, SolverError::ConvergenceFailed { .. }));
    }

    #[test]
    fn repeated_non_improving_steps_stop_early() {
        // Jacobian with the wrong sign: every Newton direction points uphill
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] - 1.0))
        };
        let jacobian = |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, -1.0))
        };

        let x0 = DVector::from_element(1, 2.0);
        let err = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap_err();
        match err {
            SolverError::ConvergenceFailed { what } => {
                assert!(what.contains("stagnated"), "{what}");
                assert!(what.contains(&format!("iteration {}", MAX_STALLED_STEPS - 1)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn config_validation() {
        assert!(NewtonConfig::default().validate().is_ok());

        let bad = NewtonConfig {
            line_search_beta: 1.0,
            ..NewtonConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(SolverError::ProblemSetup { .. })
        ));

        let bad = NewtonConfig {
            max_iterations: 0,
            ..NewtonConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
