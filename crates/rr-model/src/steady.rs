//! Steady state of the Ramsey model.

use crate::error::{ModelError, ModelResult};
use crate::params::ModelParameters;
use crate::path::Variable;
use crate::technology::{check_capital, interest_rate, wage};
use nalgebra::DVector;
use rr_solver::{NewtonConfig, RootProblem, SolverError, SolverResult, solve};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Fixed initial guess (K, C, r, w) for the steady-state search.
pub const STEADY_STATE_SEED: [f64; 4] = [1.0, 1.0, 1.0, 1.0];

/// Long-run fixed point of the dynamic system.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SteadyState {
    pub capital: f64,
    pub consumption: f64,
    pub interest_rate: f64,
    pub wage: f64,
}

impl SteadyState {
    pub fn as_array(&self) -> [f64; 4] {
        [self.capital, self.consumption, self.interest_rate, self.wage]
    }

    pub fn get(&self, variable: Variable) -> f64 {
        self.as_array()[variable.block()]
    }

    /// Norm of the steady-state equations evaluated at `self`.
    pub fn residual_norm(&self, params: &ModelParameters) -> SolverResult<f64> {
        let r = steady_state_residuals(params, &self.as_array())?;
        Ok(r.iter().map(|v| v * v).sum::<f64>().sqrt())
    }
}

/// Steady state together with solver diagnostics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteadySolution {
    pub state: SteadyState,
    /// Residual norm at convergence
    pub residual_norm: f64,
    /// Number of Newton iterations
    pub iterations: usize,
}

/// Steady-state equations at x = (K, C, r, w):
///
/// - budget: r K + w L - C
/// - consumption growth: (r - rho) / sigma
/// - interest rate: r - (alpha K^(alpha-1) (A L)^(1-alpha) - delta)
/// - wage: w - (1-alpha) K^alpha (A L)^(-alpha)
pub fn steady_state_residuals(params: &ModelParameters, x: &[f64; 4]) -> SolverResult<[f64; 4]> {
    let [k, c, r, w] = *x;
    check_capital(k, 0)?;

    Ok([
        r * k + w * params.labor - c,
        (r - params.rho) / params.sigma,
        r - interest_rate(params, k),
        w - wage(params, k),
    ])
}

/// Four-equation root-finding problem for the steady state.
pub struct SteadyStateProblem<'a> {
    params: &'a ModelParameters,
}

impl<'a> SteadyStateProblem<'a> {
    pub fn new(params: &'a ModelParameters) -> Self {
        Self { params }
    }
}

impl RootProblem for SteadyStateProblem<'_> {
    fn dimension(&self) -> usize {
        4
    }

    fn residual(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        if x.len() != 4 {
            return Err(SolverError::ProblemSetup {
                what: format!("steady state has 4 unknowns, got {}", x.len()),
            });
        }
        let r = steady_state_residuals(self.params, &[x[0], x[1], x[2], x[3]])?;
        Ok(DVector::from_row_slice(&r))
    }
}

/// Solve for the steady state starting from [`STEADY_STATE_SEED`].
///
/// The seed is far from K* for large capital shares. With the default
/// 50-iteration budget the search converges for alpha below roughly 0.7;
/// alpha = 0.7 needs about 100 iterations and alpha = 0.75 several hundred,
/// so raise `max_iterations` for such calibrations. Running out of iterations
/// is reported as [`ModelError::Convergence`].
pub fn solve_steady_state(
    params: &ModelParameters,
    config: &NewtonConfig,
) -> ModelResult<SteadySolution> {
    params.validate()?;

    let problem = SteadyStateProblem::new(params);
    let x0 = DVector::from_row_slice(&STEADY_STATE_SEED);
    let result =
        solve(&problem, x0, config).map_err(|e| ModelError::from_solver(e, "steady state"))?;

    let state = SteadyState {
        capital: result.x[0],
        consumption: result.x[1],
        interest_rate: result.x[2],
        wage: result.x[3],
    };

    info!(
        capital = state.capital,
        consumption = state.consumption,
        interest_rate = state.interest_rate,
        wage = state.wage,
        iterations = result.iterations,
        "steady state solved"
    );

    Ok(SteadySolution {
        state,
        residual_norm: result.residual_norm,
        iterations: result.iterations,
    })
}

/// Steady state with the default solver configuration.
pub fn steady_state(params: &ModelParameters) -> ModelResult<SteadyState> {
    solve_steady_state(params, &NewtonConfig::default()).map(|s| s.state)
}
