//! Scenario schema definitions.

use rr_model::{JacobianMethod, ModelParameters, NewtonConfig};
use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

/// One parameter set plus the solver settings used for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: ModelParameters,
    #[serde(default)]
    pub solver: SolverDef,
}

impl Scenario {
    /// The standard calibration under the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: LATEST_VERSION,
            name: name.into(),
            description: None,
            parameters: ModelParameters::default(),
            solver: SolverDef::default(),
        }
    }

    pub fn newton_config(&self) -> NewtonConfig {
        self.solver.to_newton_config()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum JacobianDef {
    #[default]
    Forward,
    Central,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SolverDef {
    pub max_iterations: usize,
    pub abs_tol: f64,
    pub rel_tol: f64,
    pub line_search_beta: f64,
    pub max_line_search_iters: usize,
    pub jacobian: JacobianDef,
    pub fd_epsilon: f64,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self::from(&NewtonConfig::default())
    }
}

impl From<&NewtonConfig> for SolverDef {
    fn from(config: &NewtonConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            abs_tol: config.abs_tol,
            rel_tol: config.rel_tol,
            line_search_beta: config.line_search_beta,
            max_line_search_iters: config.max_line_search_iters,
            jacobian: match config.jacobian {
                JacobianMethod::Forward => JacobianDef::Forward,
                JacobianMethod::Central => JacobianDef::Central,
            },
            fd_epsilon: config.fd_epsilon,
        }
    }
}

impl SolverDef {
    pub fn to_newton_config(&self) -> NewtonConfig {
        NewtonConfig {
            max_iterations: self.max_iterations,
            abs_tol: self.abs_tol,
            rel_tol: self.rel_tol,
            line_search_beta: self.line_search_beta,
            max_line_search_iters: self.max_line_search_iters,
            jacobian: match self.jacobian {
                JacobianDef::Forward => JacobianMethod::Forward,
                JacobianDef::Central => JacobianMethod::Central,
            },
            fd_epsilon: self.fd_epsilon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_def_mirrors_newton_defaults() {
        let def = SolverDef::default();
        let config = def.to_newton_config();
        let defaults = NewtonConfig::default();
        assert_eq!(config.max_iterations, defaults.max_iterations);
        assert_eq!(config.abs_tol, defaults.abs_tol);
        assert_eq!(config.jacobian, defaults.jacobian);
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let yaml = r#"
version: 1
name: faster-discounting
parameters:
  rho: 0.04
  nodes: 51
solver:
  jacobian: central
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scenario.parameters.rho, 0.04);
        assert_eq!(scenario.parameters.nodes, 51);
        assert_eq!(scenario.parameters.alpha, 0.35);
        assert_eq!(scenario.parameters.initial_capital, 6.0);
        assert_eq!(scenario.solver.jacobian, JacobianDef::Central);
        assert_eq!(scenario.solver.max_iterations, 50);
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let yaml = r#"
version: 1
name: typo
parameters:
  sigmaa: 2.0
"#;
        assert!(serde_yaml::from_str::<Scenario>(yaml).is_err());
    }
}
