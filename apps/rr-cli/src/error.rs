//! Error type for the command line front end.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Scenario error: {0}")]
    Project(#[from] rr_project::ProjectError),

    #[error("Results error: {0}")]
    Results(#[from] rr_results::ResultsError),

    #[error("Model error: {0}")]
    Model(#[from] rr_model::ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Refusing to overwrite existing file: {path} (use --force)")]
    FileExists { path: PathBuf },

    #[error("Run {run_id} has no stored path (steady-state runs carry none)")]
    NoPath { run_id: String },
}

pub type CliResult<T> = Result<T, CliError>;
