//! Scaling benchmarks for the transition solve.

use rr_core::timing::{Timer, median_s};
use rr_model::{ModelError, ModelParameters, solve_steady_state, solve_transition};
use rr_project::{JacobianDef, SolverDef};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    #[error("Benchmark needs at least one run")]
    NoRuns,

    #[error("Solve failed: {0}")]
    Model(#[from] ModelError),
}

/// A benchmark scenario definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkScenario {
    /// Unique identifier for this benchmark.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub nodes: usize,
    pub initial_capital: f64,
    pub jacobian: JacobianDef,
    pub notes: Option<String>,
}

impl BenchmarkScenario {
    fn new(id: &str, name: &str, nodes: usize) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            nodes,
            initial_capital: ModelParameters::default().initial_capital,
            jacobian: JacobianDef::Forward,
            notes: None,
        }
    }

    pub fn parameters(&self) -> ModelParameters {
        ModelParameters::default()
            .with_nodes(self.nodes)
            .with_initial_capital(self.initial_capital)
    }

    pub fn solver(&self) -> SolverDef {
        SolverDef {
            jacobian: self.jacobian,
            ..SolverDef::default()
        }
    }
}

/// A single run's timing breakdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    pub total_time_s: f64,
    pub steady_time_s: f64,
    pub transition_time_s: f64,
    pub iterations: usize,
    pub residual_norm: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub total_time_median_s: f64,
    pub total_time_min_s: f64,
    pub total_time_max_s: f64,
    pub transition_time_median_s: f64,
    pub iterations_median: usize,
    pub worst_residual_norm: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub scenario: BenchmarkScenario,
    pub runs: Vec<RunMetrics>,
    pub aggregate: AggregateMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSuite {
    pub timestamp: String,
    pub results: Vec<BenchmarkResult>,
}

/// Solve `scenario` from scratch `runs` times.
pub fn run_scenario(
    scenario: &BenchmarkScenario,
    runs: usize,
) -> Result<BenchmarkResult, BenchError> {
    if runs == 0 {
        return Err(BenchError::NoRuns);
    }

    let params = scenario.parameters();
    let config = scenario.solver().to_newton_config();

    let mut metrics = Vec::with_capacity(runs);
    for _ in 0..runs {
        let total = Timer::start("total");

        let steady_timer = Timer::start("steady");
        let steady = solve_steady_state(&params, &config)?;
        let steady_time_s = steady_timer.stop();

        let transition_timer = Timer::start("transition");
        let solution = solve_transition(&params, &steady.state, &config)?;
        let transition_time_s = transition_timer.stop();

        metrics.push(RunMetrics {
            total_time_s: total.stop(),
            steady_time_s,
            transition_time_s,
            iterations: solution.iterations,
            residual_norm: solution.residual_norm,
        });
    }

    let aggregate = compute_aggregates(&metrics);
    Ok(BenchmarkResult {
        scenario: scenario.clone(),
        runs: metrics,
        aggregate,
    })
}

fn compute_aggregates(runs: &[RunMetrics]) -> AggregateMetrics {
    if runs.is_empty() {
        return AggregateMetrics::default();
    }

    let totals: Vec<f64> = runs.iter().map(|r| r.total_time_s).collect();
    let transitions: Vec<f64> = runs.iter().map(|r| r.transition_time_s).collect();
    let mut iterations: Vec<usize> = runs.iter().map(|r| r.iterations).collect();
    iterations.sort_unstable();

    AggregateMetrics {
        total_time_median_s: median_s(&totals),
        total_time_min_s: totals.iter().copied().fold(f64::INFINITY, f64::min),
        total_time_max_s: totals.iter().copied().fold(0.0, f64::max),
        transition_time_median_s: median_s(&transitions),
        iterations_median: iterations[iterations.len() / 2],
        worst_residual_norm: runs.iter().map(|r| r.residual_norm).fold(0.0, f64::max),
    }
}

/// Grid-size sweep over the standard calibration.
pub fn default_benchmarks() -> Vec<BenchmarkScenario> {
    let mut benchmarks: Vec<BenchmarkScenario> = [25, 51, 101, 201]
        .into_iter()
        .map(|n| BenchmarkScenario::new(&format!("n{}", n), &format!("{} nodes", n), n))
        .collect();

    let mut central = BenchmarkScenario::new("n101-central", "101 nodes, central Jacobian", 101);
    central.jacobian = JacobianDef::Central;
    central.notes = Some("Twice the residual evaluations per Jacobian".to_string());
    benchmarks.push(central);

    let mut above = BenchmarkScenario::new("n101-k8", "101 nodes, K0 = 8", 101);
    above.initial_capital = 8.0;
    above.notes = Some("Capital starts above the steady state".to_string());
    benchmarks.push(above);

    benchmarks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_benchmarks_are_defined() {
        let benchmarks = default_benchmarks();
        assert!(!benchmarks.is_empty());
        assert!(benchmarks.iter().all(|b| !b.id.is_empty()));
        assert!(benchmarks.iter().all(|b| b.parameters().validate().is_ok()));
    }

    #[test]
    fn aggregate_metrics_compute_correctly() {
        let metrics = vec![
            RunMetrics {
                total_time_s: 1.0,
                transition_time_s: 0.8,
                iterations: 5,
                residual_norm: 1e-12,
                ..Default::default()
            },
            RunMetrics {
                total_time_s: 3.0,
                transition_time_s: 2.4,
                iterations: 5,
                residual_norm: 1e-11,
                ..Default::default()
            },
            RunMetrics {
                total_time_s: 2.0,
                transition_time_s: 1.6,
                iterations: 6,
                residual_norm: 1e-13,
                ..Default::default()
            },
        ];

        let agg = compute_aggregates(&metrics);
        assert_eq!(agg.total_time_median_s, 2.0);
        assert_eq!(agg.total_time_min_s, 1.0);
        assert_eq!(agg.total_time_max_s, 3.0);
        assert_eq!(agg.transition_time_median_s, 1.6);
        assert_eq!(agg.iterations_median, 5);
        assert_eq!(agg.worst_residual_norm, 1e-11);
    }

    #[test]
    fn small_scenario_runs() {
        let scenario = BenchmarkScenario::new("tiny", "tiny", 11);
        let result = run_scenario(&scenario, 2).unwrap();
        assert_eq!(result.runs.len(), 2);
        assert!(result.aggregate.worst_residual_norm < 1e-6);

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"tiny\""));
    }

    #[test]
    fn zero_runs_rejected() {
        let scenario = BenchmarkScenario::new("tiny", "tiny", 11);
        assert!(matches!(run_scenario(&scenario, 0), Err(BenchError::NoRuns)));
    }
}
