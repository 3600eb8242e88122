//! Result data types.

use rr_model::{ModelParameters, SteadyState, TimePath};
use serde::{Deserialize, Serialize};

use crate::ResultsResult;

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_name: String,
    pub timestamp: String,
    pub run_type: RunType,
    pub solver_version: String,
    pub parameters: ModelParameters,
    pub steady_state: SteadyState,
    pub residual_norm: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunType {
    Steady,
    Transition { nodes: usize },
}

impl RunType {
    pub fn label(&self) -> &'static str {
        match self {
            RunType::Steady => "steady",
            RunType::Transition { .. } => "transition",
        }
    }
}

/// One line of `path.jsonl`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    pub node: usize,
    pub capital: f64,
    pub consumption: f64,
    pub interest_rate: f64,
    pub wage: f64,
    pub output: f64,
}

impl PathRecord {
    pub const CSV_HEADER: &'static str = "node,capital,consumption,interest_rate,wage,output";

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.node, self.capital, self.consumption, self.interest_rate, self.wage, self.output
        )
    }
}

/// Flatten a solved path into per-node records, with output derived from capital.
pub fn path_records(path: &TimePath, params: &ModelParameters) -> Vec<PathRecord> {
    let output = path.output(params);
    path.iter_nodes()
        .zip(output)
        .map(|(values, output)| PathRecord {
            node: values.node,
            capital: values.capital,
            consumption: values.consumption,
            interest_rate: values.interest_rate,
            wage: values.wage,
            output,
        })
        .collect()
}

/// Rebuild the flat path from stored records.
pub fn path_from_records(records: &[PathRecord]) -> ResultsResult<TimePath> {
    let n = records.len();
    let mut values = vec![0.0; 4 * n];
    for (j, record) in records.iter().enumerate() {
        values[j] = record.capital;
        values[n + j] = record.consumption;
        values[2 * n + j] = record.interest_rate;
        values[3 * n + j] = record.wage;
    }
    Ok(TimePath::new(n, values)?)
}
