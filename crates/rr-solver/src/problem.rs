//! Problem definition for root finding.

use crate::error::SolverResult;
use nalgebra::DVector;

/// A square nonlinear system `F(x) = 0`.
///
/// Implementors must be `Sync`: Jacobian columns are evaluated in parallel.
pub trait RootProblem: Sync {
    /// Number of unknowns (and of residual equations).
    fn dimension(&self) -> usize;

    /// Evaluate the residual vector at `x`.
    ///
    /// Return [`SolverError::Domain`](crate::SolverError::Domain) when `x`
    /// lies outside the region where the residual is defined.
    fn residual(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>>;
}

impl<P: RootProblem + ?Sized> RootProblem for &P {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn residual(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        (**self).residual(x)
    }
}
