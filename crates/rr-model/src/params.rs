//! Model parameters.

use crate::error::{ModelError, ModelResult};
use rr_core::ensure_finite;
use serde::{Deserialize, Serialize};

/// Parameters of the Ramsey model and of its discretization.
///
/// Plain value type: every operation takes the parameters it needs explicitly
/// and nothing mutates them in place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelParameters {
    /// Discount rate (rho)
    pub rho: f64,
    /// Intertemporal elasticity parameter (sigma)
    pub sigma: f64,
    /// Capital share (alpha)
    pub alpha: f64,
    /// Depreciation rate (delta)
    pub delta: f64,
    /// Productivity (A)
    pub productivity: f64,
    /// Labor supply (L)
    pub labor: f64,
    /// Number of time nodes (n)
    pub nodes: usize,
    /// Initial capital stock (K0)
    pub initial_capital: f64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            rho: 0.02,
            sigma: 1.0,
            alpha: 0.35,
            delta: 0.08,
            productivity: 1.0,
            labor: 1.0,
            nodes: 101,
            initial_capital: 6.0,
        }
    }
}

impl ModelParameters {
    pub fn with_initial_capital(self, initial_capital: f64) -> Self {
        Self {
            initial_capital,
            ..self
        }
    }

    pub fn with_nodes(self, nodes: usize) -> Self {
        Self { nodes, ..self }
    }

    /// Effective labor A * L.
    pub fn effective_labor(&self) -> f64 {
        self.productivity * self.labor
    }

    /// Number of unknowns in the discretized transition system.
    pub fn unknowns(&self) -> usize {
        4 * self.nodes
    }

    /// Check the domain invariants.
    ///
    /// Beyond sigma > 0, alpha in (0, 1), delta >= 0 and n >= 2, productivity,
    /// labor and initial capital must be positive so that the fractional
    /// powers are real, and rho + delta must be positive so that a finite
    /// steady-state capital stock exists.
    pub fn validate(&self) -> ModelResult<()> {
        let fields = [
            ("rho", self.rho),
            ("sigma", self.sigma),
            ("alpha", self.alpha),
            ("delta", self.delta),
            ("productivity", self.productivity),
            ("labor", self.labor),
            ("initial_capital", self.initial_capital),
        ];
        for (name, value) in fields {
            ensure_finite(value, name)
                .map_err(|_| ModelError::parameter(name, format!("{value} is not finite")))?;
        }

        if self.sigma <= 0.0 {
            return Err(ModelError::parameter("sigma", "must be positive"));
        }
        if self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(ModelError::parameter("alpha", "must lie in (0, 1)"));
        }
        if self.delta < 0.0 {
            return Err(ModelError::parameter("delta", "must be non-negative"));
        }
        if self.productivity <= 0.0 {
            return Err(ModelError::parameter("productivity", "must be positive"));
        }
        if self.labor <= 0.0 {
            return Err(ModelError::parameter("labor", "must be positive"));
        }
        if self.nodes < 2 {
            return Err(ModelError::parameter(
                "nodes",
                format!("need at least 2 time nodes, got {}", self.nodes),
            ));
        }
        if self.initial_capital <= 0.0 {
            return Err(ModelError::parameter("initial_capital", "must be positive"));
        }
        if self.rho + self.delta <= 0.0 {
            return Err(ModelError::parameter(
                "rho",
                "rho + delta must be positive for a steady state to exist",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_calibration_is_valid() {
        let p = ModelParameters::default();
        assert!(p.validate().is_ok());
        assert_eq!(p.unknowns(), 404);
    }

    #[test]
    fn rejects_out_of_domain_values() {
        let base = ModelParameters::default();
        let cases = [
            (ModelParameters { sigma: 0.0, ..base }, "sigma"),
            (ModelParameters { sigma: -1.0, ..base }, "sigma"),
            (ModelParameters { alpha: 0.0, ..base }, "alpha"),
            (ModelParameters { alpha: 1.0, ..base }, "alpha"),
            (ModelParameters { delta: -0.1, ..base }, "delta"),
            (ModelParameters { labor: 0.0, ..base }, "labor"),
            (ModelParameters { productivity: -2.0, ..base }, "productivity"),
            (base.with_nodes(1), "nodes"),
            (base.with_initial_capital(0.0), "initial_capital"),
            (ModelParameters { rho: -0.1, ..base }, "rho"),
            (ModelParameters { rho: f64::NAN, ..base }, "rho"),
            (ModelParameters { alpha: f64::INFINITY, ..base }, "alpha"),
        ];

        for (params, expected) in cases {
            match params.validate() {
                Err(ModelError::Parameter { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected parameter error for {expected}, got {other:?}"),
            }
        }
    }
}
