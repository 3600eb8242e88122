//! Content-based hashing for run IDs.

use rr_model::ModelParameters;
use rr_project::SolverDef;
use sha2::{Digest, Sha256};

/// Run id for one scenario's parameter set, solver settings, run type and
/// solver version.
///
/// The scenario name is part of the id, so two scenario files sharing a
/// directory and a calibration keep separate runs.
pub fn compute_run_id(
    scenario_name: &str,
    parameters: &ModelParameters,
    solver: &SolverDef,
    run_type: &crate::types::RunType,
    solver_version: &str,
) -> String {
    let mut hasher = Sha256::new();

    // Length prefix keeps ("ab", "c") and ("a", "bc") apart.
    hasher.update((scenario_name.len() as u64).to_le_bytes());
    hasher.update(scenario_name.as_bytes());

    let parameters_json = serde_json::to_string(parameters).unwrap_or_default();
    hasher.update(parameters_json.as_bytes());

    let solver_json = serde_json::to_string(solver).unwrap_or_default();
    hasher.update(solver_json.as_bytes());

    let run_type_json = serde_json::to_string(run_type).unwrap_or_default();
    hasher.update(run_type_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    format!("{:x}", hasher.finalize())
}
