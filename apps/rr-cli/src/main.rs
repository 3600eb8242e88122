mod error;
mod export;
mod run_service;

use clap::{Parser, Subcommand};
use rr_model::{SteadyState, Variable};
use rr_project::Scenario;
use rr_results::{RunManifest, RunType, path_from_records};
use std::path::{Path, PathBuf};

use crate::error::{CliError, CliResult};
use crate::run_service::{RunMode, RunOptions, RunRequest, RunResponse, RunTimingSummary};

#[derive(Parser)]
#[command(name = "rr-cli")]
#[command(about = "Ramsey growth model solver - steady state and transition paths", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the standard calibration as a new scenario file
    Init {
        /// Path of the scenario file to create (.yaml or .json)
        scenario_path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate a scenario file
    Validate {
        /// Path to the scenario file
        scenario_path: PathBuf,
    },
    /// Solve for the steady state
    Steady {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// Solve the transition path from the initial capital stock
    Transition {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs for a scenario
    Runs {
        /// Path to the scenario file
        scenario_path: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export a transition path as CSV
    Export {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            scenario_path,
            force,
        } => cmd_init(&scenario_path, force),
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Steady {
            scenario_path,
            no_cache,
        } => cmd_steady(&scenario_path, !no_cache),
        Commands::Transition {
            scenario_path,
            no_cache,
        } => cmd_transition(&scenario_path, !no_cache),
        Commands::Runs { scenario_path } => cmd_runs(&scenario_path),
        Commands::ShowRun {
            scenario_path,
            run_id,
        } => cmd_show_run(&scenario_path, &run_id),
        Commands::Export {
            scenario_path,
            run_id,
            output,
        } => cmd_export(&scenario_path, &run_id, output.as_deref()),
    }
}

fn cmd_init(scenario_path: &Path, force: bool) -> CliResult<()> {
    if scenario_path.exists() && !force {
        return Err(CliError::FileExists {
            path: scenario_path.to_path_buf(),
        });
    }
    let name = scenario_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "baseline".to_string());
    rr_project::save(scenario_path, &Scenario::new(name))?;
    println!("✓ Wrote scenario: {}", scenario_path.display());
    Ok(())
}

fn cmd_validate(scenario_path: &Path) -> CliResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = rr_project::load(scenario_path)?;
    println!("✓ Scenario '{}' is valid", scenario.name);
    print_parameters(&scenario);
    Ok(())
}

fn cmd_steady(scenario_path: &Path, use_cache: bool) -> CliResult<()> {
    let response = run(scenario_path, RunMode::Steady, use_cache)?;
    print_steady_state(&response.manifest.steady_state);
    print_timing_summary(&response.timing, &response.manifest);
    Ok(())
}

fn cmd_transition(scenario_path: &Path, use_cache: bool) -> CliResult<()> {
    let response = run(scenario_path, RunMode::Transition, use_cache)?;
    print_steady_state(&response.manifest.steady_state);
    print_timing_summary(&response.timing, &response.manifest);

    let (_manifest, records) = run_service::load_run(scenario_path, &response.run_id)?;
    print_path_summary(&records, &response.manifest.steady_state)?;
    Ok(())
}

fn run(scenario_path: &Path, mode: RunMode, use_cache: bool) -> CliResult<RunResponse> {
    let request = RunRequest {
        scenario_path,
        mode,
        options: RunOptions {
            use_cache,
            ..RunOptions::default()
        },
    };
    let response = run_service::ensure_run(&request)?;

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Solve completed: {}", response.run_id);
    }
    Ok(response)
}

fn print_parameters(scenario: &Scenario) {
    let p = &scenario.parameters;
    println!("  rho = {}, sigma = {}, alpha = {}, delta = {}", p.rho, p.sigma, p.alpha, p.delta);
    println!("  A = {}, L = {}, K0 = {}, nodes = {}", p.productivity, p.labor, p.initial_capital, p.nodes);
}

fn print_steady_state(steady: &SteadyState) {
    println!("\nSteady state:");
    for variable in Variable::ALL {
        println!("  {:<14} {:.2}", variable.title(), steady.get(variable));
    }
}

fn print_timing_summary(timing: &RunTimingSummary, manifest: &RunManifest) {
    println!("\nTiming summary:");
    println!("  Load:       {:.3}s", timing.load_time_s);
    if timing.load_cache_time_s > 0.0 {
        println!("  Cache load: {:.3}s", timing.load_cache_time_s);
    } else {
        println!("  Steady:     {:.3}s", timing.steady_time_s);
        if timing.transition_time_s > 0.0 {
            println!("  Transition: {:.3}s", timing.transition_time_s);
        }
        println!("  Save:       {:.3}s", timing.save_time_s);
    }
    println!("  Total:      {:.3}s", timing.total_time_s);
    println!("  Newton iterations: {}", manifest.iterations);
    println!("  Final residual:    {:.3e}", manifest.residual_norm);
}

fn print_path_summary(
    records: &[rr_results::PathRecord],
    steady: &SteadyState,
) -> CliResult<()> {
    let path = path_from_records(records)?;
    let capital = path.capital();
    let consumption = path.consumption();
    let last = path.nodes() - 1;

    println!("\nTransition path ({} nodes):", path.nodes());
    println!(
        "  Capital:     {:.4} -> {:.4}  (K* = {:.4})",
        capital[0], capital[last], steady.capital
    );
    println!(
        "  Consumption: {:.4} -> {:.4}  (C* = {:.4})",
        consumption[0], consumption[last], steady.consumption
    );
    println!(
        "  Interest:    {:.4} -> {:.4}",
        path.interest_rate()[0],
        path.interest_rate()[last]
    );
    Ok(())
}

fn cmd_runs(scenario_path: &Path) -> CliResult<()> {
    let runs = run_service::list_runs(scenario_path)?;

    if runs.is_empty() {
        println!("No cached runs found for: {}", scenario_path.display());
    } else {
        println!("Cached runs for '{}':", runs[0].scenario_name);
        for manifest in runs {
            println!(
                "  {} {:<10} ({})",
                manifest.run_id,
                manifest.run_type.label(),
                manifest.timestamp
            );
        }
    }
    Ok(())
}

fn cmd_show_run(scenario_path: &Path, run_id: &str) -> CliResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, records) = run_service::load_run(scenario_path, run_id)?;

    println!("\nRun Summary:");
    println!("  Scenario:  {}", manifest.scenario_name);
    println!("  Type:      {}", manifest.run_type.label());
    println!("  Timestamp: {}", manifest.timestamp);
    println!("  Solver:    {}", manifest.solver_version);
    println!("  Newton iterations: {}", manifest.iterations);
    println!("  Final residual:    {:.3e}", manifest.residual_norm);

    print_steady_state(&manifest.steady_state);

    if let RunType::Transition { .. } = manifest.run_type {
        print_path_summary(&records, &manifest.steady_state)?;
    }
    Ok(())
}

fn cmd_export(scenario_path: &Path, run_id: &str, output: Option<&Path>) -> CliResult<()> {
    let (_manifest, records) = run_service::load_run(scenario_path, run_id)?;
    if records.is_empty() {
        return Err(CliError::NoPath {
            run_id: run_id.to_string(),
        });
    }

    if let Some(path) = output {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        export::write_csv(&records, &mut file)?;
        std::io::Write::flush(&mut file)?;
        println!("✓ Exported {} nodes to {}", records.len(), path.display());
    } else {
        let stdout = std::io::stdout();
        export::write_csv(&records, &mut stdout.lock())?;
    }

    Ok(())
}
