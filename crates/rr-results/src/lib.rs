//! rr-results: run cache and path storage.

pub mod hash;
pub mod store;
pub mod types;

pub use hash::compute_run_id;
pub use store::RunStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Run {run_id} has an inconsistent path: {reason}")]
    CorruptPath { run_id: String, reason: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    #[error("Stored path is inconsistent: {0}")]
    Model(#[from] rr_model::ModelError),
}
