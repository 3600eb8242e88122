//! Firm side of the model: Cobb-Douglas production and factor prices.

use crate::params::ModelParameters;
use rr_solver::{SolverError, SolverResult};

/// Output Y = K^alpha (A L)^(1-alpha).
pub fn output(params: &ModelParameters, capital: f64) -> f64 {
    capital.powf(params.alpha) * params.effective_labor().powf(1.0 - params.alpha)
}

/// Net return on capital r = alpha K^(alpha-1) (A L)^(1-alpha) - delta.
pub fn interest_rate(params: &ModelParameters, capital: f64) -> f64 {
    params.alpha
        * capital.powf(params.alpha - 1.0)
        * params.effective_labor().powf(1.0 - params.alpha)
        - params.delta
}

/// Wage w = (1-alpha) K^alpha (A L)^(-alpha).
pub fn wage(params: &ModelParameters, capital: f64) -> f64 {
    (1.0 - params.alpha) * capital.powf(params.alpha) * params.effective_labor().powf(-params.alpha)
}

/// Reject capital values for which K^(alpha-1) is not a finite real number.
pub(crate) fn check_capital(capital: f64, node: usize) -> SolverResult<()> {
    if capital > 0.0 && capital.is_finite() {
        Ok(())
    } else {
        Err(SolverError::Domain {
            what: format!("capital at node {} is {}, must be positive", node, capital),
        })
    }
}
