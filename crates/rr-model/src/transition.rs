//! Transition path by relaxation.
//!
//! Unknowns are stacked as `x = [K[0..n), C[0..n), r[0..n), w[0..n)]` and the
//! residual rows use the same block layout:
//!
//! | rows          | equation                                                   |
//! |---------------|------------------------------------------------------------|
//! | `0`           | `K[0] - K0`                                                |
//! | `j`, j >= 1   | `K[j] - K[j-1] - (r[j-1] K[j-1] + w[j-1] L - C[j-1])`      |
//! | `n`           | `C[n-1] - C*`                                              |
//! | `n+j`, j >= 1 | `C[j] - C[j-1] - C[j-1] (r[j-1] - rho) / sigma`            |
//! | `2n+j`        | `r[j] - (alpha K[j]^(alpha-1) (A L)^(1-alpha) - delta)`    |
//! | `3n+j`        | `w[j] - (1-alpha) K[j]^alpha (A L)^(-alpha)`               |
//!
//! The first row of the capital and consumption blocks has no predecessor
//! node, so those two rows carry the boundary conditions. All 4n equations
//! are solved simultaneously from a flat steady-state guess.
//!
//! Cost: the Jacobian is dense 4n x 4n (4n residual evaluations per Newton
//! iteration) and each iteration factorizes it, so a solve is O(n^3).

use crate::error::{ModelError, ModelResult};
use crate::params::ModelParameters;
use crate::path::TimePath;
use crate::steady::{
    STEADY_STATE_SEED, SteadySolution, SteadyState, solve_steady_state, steady_state_residuals,
};
use crate::technology::{check_capital, interest_rate, wage};
use nalgebra::DVector;
use rr_solver::{NewtonConfig, RootProblem, SolverError, SolverResult, solve};
use tracing::info;

/// Largest steady-state residual norm accepted as "computed from these parameters".
///
/// This is the floor; [`steady_state_tolerance`] widens it for solver
/// configurations that stop the steady-state search earlier.
pub const STEADY_STATE_MISMATCH_TOL: f64 = 1e-6;

/// Mismatch tolerance for a steady state computed with `config`.
///
/// A steady-state solve stops once its residual norm falls below `abs_tol`
/// or below `rel_tol` times the norm at [`STEADY_STATE_SEED`], so anything
/// within ten times the looser of the two still counts as a solution.
pub fn steady_state_tolerance(params: &ModelParameters, config: &NewtonConfig) -> f64 {
    let seed_norm = steady_state_residuals(params, &STEADY_STATE_SEED)
        .map(|r| r.iter().map(|v| v * v).sum::<f64>().sqrt())
        .unwrap_or(0.0);
    STEADY_STATE_MISMATCH_TOL
        .max(10.0 * config.abs_tol)
        .max(10.0 * config.rel_tol * seed_norm)
}

/// The discretized boundary-value problem.
pub struct TransitionProblem<'a> {
    params: &'a ModelParameters,
    steady: &'a SteadyState,
}

impl<'a> TransitionProblem<'a> {
    /// Validate the parameters and check that `steady` solves their
    /// steady-state equations to within [`STEADY_STATE_MISMATCH_TOL`].
    pub fn new(params: &'a ModelParameters, steady: &'a SteadyState) -> ModelResult<Self> {
        Self::with_mismatch_tolerance(params, steady, STEADY_STATE_MISMATCH_TOL)
    }

    pub fn with_mismatch_tolerance(
        params: &'a ModelParameters,
        steady: &'a SteadyState,
        mismatch_tol: f64,
    ) -> ModelResult<Self> {
        params.validate()?;

        let residual_norm = steady.residual_norm(params).unwrap_or(f64::INFINITY);
        if residual_norm.is_nan() || residual_norm > mismatch_tol {
            return Err(ModelError::SteadyStateMismatch { residual_norm });
        }

        Ok(Self { params, steady })
    }

    pub fn params(&self) -> &ModelParameters {
        self.params
    }

    pub fn steady(&self) -> &SteadyState {
        self.steady
    }
}

impl RootProblem for TransitionProblem<'_> {
    fn dimension(&self) -> usize {
        self.params.unknowns()
    }

    fn residual(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let p = self.params;
        let n = p.nodes;
        if x.len() != 4 * n {
            return Err(SolverError::ProblemSetup {
                what: format!("transition has {} unknowns, got {}", 4 * n, x.len()),
            });
        }

        let (k, rest) = x.as_slice().split_at(n);
        let (c, rest) = rest.split_at(n);
        let (r, w) = rest.split_at(n);

        for (j, &kj) in k.iter().enumerate() {
            check_capital(kj, j)?;
        }

        let mut f = DVector::zeros(4 * n);

        f[0] = k[0] - p.initial_capital;
        f[n] = c[n - 1] - self.steady.consumption;

        for j in 1..n {
            f[j] = k[j] - k[j - 1] - (r[j - 1] * k[j - 1] + w[j - 1] * p.labor - c[j - 1]);
            f[n + j] = c[j] - c[j - 1] - c[j - 1] / p.sigma * (r[j - 1] - p.rho);
        }

        for j in 0..n {
            f[2 * n + j] = r[j] - interest_rate(p, k[j]);
            f[3 * n + j] = w[j] - wage(p, k[j]);
        }

        Ok(f)
    }
}

/// Initial guess: every variable at its steady-state level at every node.
pub fn initial_guess(params: &ModelParameters, steady: &SteadyState) -> DVector<f64> {
    let n = params.nodes;
    let values = steady.as_array();
    DVector::from_fn(4 * n, |i, _| values[i / n])
}

/// Transition path together with solver diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionSolution {
    pub path: TimePath,
    /// Residual norm at convergence
    pub residual_norm: f64,
    /// Number of Newton iterations
    pub iterations: usize,
}

/// Solve for the path from `params.initial_capital` to `steady`.
///
/// `steady` must have been computed from the same parameters; a residual
/// norm above [`steady_state_tolerance`] is rejected with
/// [`ModelError::SteadyStateMismatch`]. Either the whole path converges or
/// the call fails.
pub fn solve_transition(
    params: &ModelParameters,
    steady: &SteadyState,
    config: &NewtonConfig,
) -> ModelResult<TransitionSolution> {
    let mismatch_tol = steady_state_tolerance(params, config);
    let problem = TransitionProblem::with_mismatch_tolerance(params, steady, mismatch_tol)?;
    let x0 = initial_guess(params, steady);

    let result =
        solve(&problem, x0, config).map_err(|e| ModelError::from_solver(e, "transition"))?;

    let path = TimePath::new(params.nodes, result.x.as_slice().to_vec())?;

    info!(
        nodes = params.nodes,
        initial_capital = params.initial_capital,
        iterations = result.iterations,
        residual_norm = result.residual_norm,
        "transition path solved"
    );

    Ok(TransitionSolution {
        path,
        residual_norm: result.residual_norm,
        iterations: result.iterations,
    })
}

/// Transition path with the default solver configuration.
pub fn transition(params: &ModelParameters, steady: &SteadyState) -> ModelResult<TimePath> {
    solve_transition(params, steady, &NewtonConfig::default()).map(|s| s.path)
}

/// Steady state first, then the transition towards it, with one configuration.
pub fn transition_from_parameters(
    params: &ModelParameters,
    config: &NewtonConfig,
) -> ModelResult<(SteadySolution, TransitionSolution)> {
    let steady = solve_steady_state(params, config)?;
    let transition = solve_transition(params, &steady.state, config)?;
    Ok((steady, transition))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steady::steady_state;

    fn small_params() -> ModelParameters {
        ModelParameters::default().with_nodes(5)
    }

    #[test]
    fn initial_guess_repeats_steady_state_blockwise() {
        let p = small_params();
        let ss = steady_state(&p).unwrap();
        let x0 = initial_guess(&p, &ss);

        assert_eq!(x0.len(), 20);
        assert_eq!(x0[0], ss.capital);
        assert_eq!(x0[4], ss.capital);
        assert_eq!(x0[5], ss.consumption);
        assert_eq!(x0[10], ss.interest_rate);
        assert_eq!(x0[19], ss.wage);
    }

    #[test]
    fn flat_path_is_a_root_when_starting_at_steady_state() {
        let base = small_params();
        let ss = steady_state(&base).unwrap();
        let p = base.with_initial_capital(ss.capital);

        let problem = TransitionProblem::new(&p, &ss).unwrap();
        let f = problem.residual(&initial_guess(&p, &ss)).unwrap();
        assert!(f.norm() < 1e-8, "residual norm {}", f.norm());
    }

    #[test]
    fn only_the_initial_condition_is_violated_by_the_flat_guess() {
        let p = small_params();
        let ss = steady_state(&p).unwrap();
        let problem = TransitionProblem::new(&p, &ss).unwrap();
        let f = problem.residual(&initial_guess(&p, &ss)).unwrap();

        assert!((f[0] - (ss.capital - p.initial_capital)).abs() < 1e-12);
        assert!(f.rows(1, f.len() - 1).amax() < 1e-8);
    }

    #[test]
    fn negative_capital_is_a_domain_error() {
        let p = small_params();
        let ss = steady_state(&p).unwrap();
        let problem = TransitionProblem::new(&p, &ss).unwrap();

        let mut x = initial_guess(&p, &ss);
        x[3] = -0.5;
        let err = problem.residual(&x).unwrap_err();
        assert!(err.is_domain());
    }

    #[test]
    fn mismatched_steady_state_is_rejected() {
        let p = small_params();
        let other = ModelParameters {
            rho: 0.04,
            ..p
        };
        let ss = steady_state(&other).unwrap();

        let err = solve_transition(&p, &ss, &NewtonConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::SteadyStateMismatch { .. }));
    }

    #[test]
    fn loose_tolerances_accept_their_own_steady_state() {
        let p = small_params();
        let config = NewtonConfig {
            abs_tol: 1e-4,
            ..NewtonConfig::default()
        };

        let (steady, solution) = transition_from_parameters(&p, &config).unwrap();
        assert!(steady.residual_norm <= 1e-4);
        assert!(solution.residual_norm <= 1e-4);
        assert!((solution.path.capital()[0] - p.initial_capital).abs() < 1e-3);
    }

    #[test]
    fn loose_tolerances_still_reject_foreign_steady_state() {
        let p = small_params();
        let config = NewtonConfig {
            abs_tol: 1e-4,
            ..NewtonConfig::default()
        };
        let other = steady_state(&ModelParameters { rho: 0.04, ..p }).unwrap();

        let err = solve_transition(&p, &other, &config).unwrap_err();
        assert!(matches!(err, ModelError::SteadyStateMismatch { .. }));
    }

    #[test]
    fn mismatch_tolerance_follows_the_solver_configuration() {
        let p = small_params();
        let defaults = NewtonConfig::default();
        assert_eq!(steady_state_tolerance(&p, &defaults), STEADY_STATE_MISMATCH_TOL);

        let loose = NewtonConfig {
            abs_tol: 1e-4,
            ..defaults.clone()
        };
        assert!((steady_state_tolerance(&p, &loose) - 1e-3).abs() < 1e-15);

        let relative = NewtonConfig {
            rel_tol: 1e-3,
            ..defaults
        };
        assert!(steady_state_tolerance(&p, &relative) > 1e-3);
    }

    #[test]
    fn wrong_unknown_count_is_a_setup_error() {
        let p = small_params();
        let ss = steady_state(&p).unwrap();
        let problem = TransitionProblem::new(&p, &ss).unwrap();
        assert_eq!(problem.dimension(), 20);

        let err = problem.residual(&DVector::zeros(7)).unwrap_err();
        assert!(matches!(err, SolverError::ProblemSetup { .. }));
    }

    #[test]
    fn two_node_path_matches_hand_solution() {
        let p = ModelParameters::default().with_nodes(2);
        let ss = steady_state(&p).unwrap();
        let path = transition(&p, &ss).unwrap();

        // C[1] = C* and C[1] = C[0] (1 + (r[0] - rho) / sigma) with r[0] = r(K0)
        let k0 = p.initial_capital;
        let r0 = interest_rate(&p, k0);
        let w0 = wage(&p, k0);
        let c0 = ss.consumption / (1.0 + (r0 - p.rho) / p.sigma);
        let k1 = k0 + r0 * k0 + w0 * p.labor - c0;

        assert!((path.capital()[0] - k0).abs() < 1e-9);
        assert!((path.consumption()[0] - c0).abs() < 1e-8);
        assert!((path.consumption()[1] - ss.consumption).abs() < 1e-9);
        assert!((path.capital()[1] - k1).abs() < 1e-8);
    }
}
