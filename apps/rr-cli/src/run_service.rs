//! Run execution and caching.

use rr_core::timing::Timer;
use rr_model::{solve_steady_state, solve_transition};
use rr_results::{
    PathRecord, RunManifest, RunStore, RunType, compute_run_id, path_records,
};
use std::path::Path;
use tracing::{debug, info};

use crate::error::CliResult;

pub const SOLVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Steady,
    Transition,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: SOLVER_VERSION.to_string(),
        }
    }
}

pub struct RunRequest<'a> {
    pub scenario_path: &'a Path,
    pub mode: RunMode,
    pub options: RunOptions,
}

#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub load_time_s: f64,
    pub steady_time_s: f64,
    pub transition_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

/// Return the cached run for the request, solving and storing it when absent.
pub fn ensure_run(request: &RunRequest<'_>) -> CliResult<RunResponse> {
    let total = Timer::start("total");
    let mut timing = RunTimingSummary::default();

    let load = Timer::start("load");
    let scenario = rr_project::load(request.scenario_path)?;
    timing.load_time_s = load.stop();

    let params = scenario.parameters;
    let run_type = match request.mode {
        RunMode::Steady => RunType::Steady,
        RunMode::Transition => RunType::Transition {
            nodes: params.nodes,
        },
    };
    let run_id = compute_run_id(
        &scenario.name,
        &params,
        &scenario.solver,
        &run_type,
        &request.options.solver_version,
    );
    let store = RunStore::for_scenario(request.scenario_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        let cache = Timer::start("cache");
        let manifest = store.load_manifest(&run_id)?;
        timing.load_cache_time_s = cache.stop();
        timing.total_time_s = total.stop();
        debug!(run_id = %run_id, "cache hit");
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
        });
    }

    let config = scenario.newton_config();

    let steady_timer = Timer::start("steady");
    let steady = solve_steady_state(&params, &config)?;
    timing.steady_time_s = steady_timer.stop();

    let (records, residual_norm, iterations) = match request.mode {
        RunMode::Steady => (Vec::new(), steady.residual_norm, steady.iterations),
        RunMode::Transition => {
            let transition_timer = Timer::start("transition");
            let solution = solve_transition(&params, &steady.state, &config)?;
            timing.transition_time_s = transition_timer.stop();
            (
                path_records(&solution.path, &params),
                solution.residual_norm,
                solution.iterations,
            )
        }
    };

    let manifest = RunManifest {
        run_id: run_id.clone(),
        scenario_name: scenario.name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        run_type,
        solver_version: request.options.solver_version.clone(),
        parameters: params,
        steady_state: steady.state,
        residual_norm,
        iterations,
    };

    let save = Timer::start("save");
    store.save_run(&manifest, &records)?;
    timing.save_time_s = save.stop();
    timing.total_time_s = total.stop();

    info!(
        run_id = %run_id,
        kind = manifest.run_type.label(),
        iterations,
        residual_norm,
        "run stored"
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
    })
}

pub fn load_run(
    scenario_path: &Path,
    run_id: &str,
) -> CliResult<(RunManifest, Vec<PathRecord>)> {
    let store = RunStore::for_scenario(scenario_path)?;
    Ok(store.load_run(run_id)?)
}

pub fn list_runs(scenario_path: &Path) -> CliResult<Vec<RunManifest>> {
    let scenario = rr_project::load(scenario_path)?;
    let store = RunStore::for_scenario(scenario_path)?;
    Ok(store.list_runs(&scenario.name)?)
}
