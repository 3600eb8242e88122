//! Standalone benchmark runner.

use rr_bench::{BenchmarkSuite, default_benchmarks, run_scenario};
use std::fs;
use std::path::PathBuf;

const RUNS: usize = 5;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let crate_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = crate_path
        .parent()
        .and_then(|p| p.parent())
        .ok_or("Could not determine repo root")?
        .to_path_buf();

    println!("Ramsey Transition Benchmarks");
    println!("============================\n");

    let benchmarks = default_benchmarks();
    println!("Running {} benchmarks, {} runs each...\n", benchmarks.len(), RUNS);

    let mut results = Vec::new();

    for (idx, scenario) in benchmarks.iter().enumerate() {
        print!("[{}/{}] {} ... ", idx + 1, benchmarks.len(), scenario.name);
        std::io::Write::flush(&mut std::io::stdout())?;

        match run_scenario(scenario, RUNS) {
            Ok(result) => {
                println!("OK ({:.3}s median)", result.aggregate.total_time_median_s);
                results.push(result);
            }
            Err(e) => {
                println!("FAILED");
                eprintln!("  Error: {}", e);
            }
        }
    }

    println!("\n============================");
    println!("Summary");
    println!("============================\n");

    for result in &results {
        let agg = &result.aggregate;
        println!("{}", result.scenario.name);
        println!(
            "  Total time:  {:.4}s (median), min: {:.4}s, max: {:.4}s",
            agg.total_time_median_s, agg.total_time_min_s, agg.total_time_max_s
        );
        println!("  Transition:  {:.4}s (median)", agg.transition_time_median_s);
        println!("  Iterations:  {} (median)", agg.iterations_median);
        println!("  Residual:    {:.3e} (worst)", agg.worst_residual_norm);
        if let Some(notes) = &result.scenario.notes {
            println!("  Notes: {}", notes);
        }
        println!();
    }

    let baseline_json = serde_json::to_string_pretty(&BenchmarkSuite {
        timestamp: chrono::Utc::now().to_rfc3339(),
        results,
    })?;

    let baseline_dir = repo_root.join("benchmarks");
    fs::create_dir_all(&baseline_dir)?;
    let baseline_path = baseline_dir.join("baseline.json");
    fs::write(&baseline_path, baseline_json)?;

    println!("Baseline saved to: {}", baseline_path.display());

    Ok(())
}
