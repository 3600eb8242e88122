//! Discretized transition path.

use crate::error::{ModelError, ModelResult};
use crate::params::ModelParameters;
use crate::technology;
use rr_core::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four endogenous variables, in their block order within a [`TimePath`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Capital,
    Consumption,
    InterestRate,
    Wage,
}

impl Variable {
    pub const ALL: [Variable; 4] = [
        Variable::Capital,
        Variable::Consumption,
        Variable::InterestRate,
        Variable::Wage,
    ];

    /// Block position in the flattened path vector.
    pub fn block(self) -> usize {
        match self {
            Variable::Capital => 0,
            Variable::Consumption => 1,
            Variable::InterestRate => 2,
            Variable::Wage => 3,
        }
    }

    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            Variable::Capital => "Capital",
            Variable::Consumption => "Consumption",
            Variable::InterestRate => "Interest rate",
            Variable::Wage => "Wage rate",
        }
    }

    /// Stable snake_case key used in files.
    pub fn key(self) -> &'static str {
        match self {
            Variable::Capital => "capital",
            Variable::Consumption => "consumption",
            Variable::InterestRate => "interest_rate",
            Variable::Wage => "wage",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Variable {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variable::ALL
            .into_iter()
            .find(|v| v.key() == s)
            .ok_or(CoreError::InvalidArg {
                what: "variable (expected capital, consumption, interest_rate or wage)",
            })
    }
}

/// Values of all variables at one time node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeValues {
    pub node: usize,
    pub capital: f64,
    pub consumption: f64,
    pub interest_rate: f64,
    pub wage: f64,
}

/// Solved trajectory: `[K[0..n), C[0..n), r[0..n), w[0..n)]`.
#[derive(Clone, Debug, PartialEq)]
pub struct TimePath {
    nodes: usize,
    values: Vec<f64>,
}

impl TimePath {
    pub fn new(nodes: usize, values: Vec<f64>) -> ModelResult<Self> {
        if nodes < 2 {
            return Err(ModelError::parameter(
                "nodes",
                format!("need at least 2 time nodes, got {}", nodes),
            ));
        }
        if values.len() != 4 * nodes {
            return Err(CoreError::LengthMismatch {
                what: "time path",
                expected: 4 * nodes,
                actual: values.len(),
            }
            .into());
        }
        Ok(Self { nodes, values })
    }

    /// Number of time nodes n.
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// Flat length 4n.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    /// Flat index of `variable` at node `j`.
    pub fn flat_index(&self, variable: Variable, node: usize) -> usize {
        variable.block() * self.nodes + node
    }

    /// Flat index of the consumption value pinned to the steady state.
    pub fn terminal_consumption_index(&self) -> usize {
        self.flat_index(Variable::Consumption, self.nodes - 1)
    }

    pub fn series(&self, variable: Variable) -> &[f64] {
        let start = variable.block() * self.nodes;
        &self.values[start..start + self.nodes]
    }

    pub fn capital(&self) -> &[f64] {
        self.series(Variable::Capital)
    }

    pub fn consumption(&self) -> &[f64] {
        self.series(Variable::Consumption)
    }

    pub fn interest_rate(&self) -> &[f64] {
        self.series(Variable::InterestRate)
    }

    pub fn wage(&self) -> &[f64] {
        self.series(Variable::Wage)
    }

    pub fn node(&self, node: usize) -> Option<NodeValues> {
        if node >= self.nodes {
            return None;
        }
        Some(NodeValues {
            node,
            capital: self.capital()[node],
            consumption: self.consumption()[node],
            interest_rate: self.interest_rate()[node],
            wage: self.wage()[node],
        })
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = NodeValues> + '_ {
        (0..self.nodes).filter_map(move |j| self.node(j))
    }

    /// Output Y along the path.
    pub fn output(&self, params: &ModelParameters) -> Vec<f64> {
        self.capital()
            .iter()
            .map(|&k| technology::output(params, k))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TimePath {
        // n = 3: K, C, r, w blocks
        TimePath::new(
            3,
            vec![
                1.0, 2.0, 3.0, // K
                0.5, 0.6, 0.7, // C
                0.1, 0.09, 0.08, // r
                1.1, 1.2, 1.3, // w
            ],
        )
        .unwrap()
    }

    #[test]
    fn blocks_and_nodes() {
        let path = sample();
        assert_eq!(path.nodes(), 3);
        assert_eq!(path.len(), 12);
        assert_eq!(path.capital(), &[1.0, 2.0, 3.0]);
        assert_eq!(path.wage(), &[1.1, 1.2, 1.3]);
        assert_eq!(path.terminal_consumption_index(), 5);
        assert_eq!(path.as_slice()[path.terminal_consumption_index()], 0.7);

        let node = path.node(1).unwrap();
        assert_eq!(node.consumption, 0.6);
        assert_eq!(node.interest_rate, 0.09);
        assert!(path.node(3).is_none());
        assert_eq!(path.iter_nodes().count(), 3);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = TimePath::new(3, vec![0.0; 11]).unwrap_err();
        assert!(matches!(err, ModelError::Core(CoreError::LengthMismatch { .. })));
        assert!(TimePath::new(1, vec![0.0; 4]).is_err());
    }

    #[test]
    fn variable_keys_round_trip() {
        for v in Variable::ALL {
            assert_eq!(v.key().parse::<Variable>().unwrap(), v);
        }
        assert!("output".parse::<Variable>().is_err());
        assert_eq!(Variable::Wage.to_string(), "Wage rate");
    }
}
