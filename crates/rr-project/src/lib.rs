//! rr-project: scenario file format and validation.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, validate_scenario};

use std::path::Path;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported scenario file extension: {path}")]
    UnsupportedExtension { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    let scenario: Scenario = serde_yaml::from_str(&content)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

pub fn save_yaml(path: &Path, scenario: &Scenario) -> ProjectResult<()> {
    validate_scenario(scenario)?;
    let content = serde_yaml::to_string(scenario)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    let scenario: Scenario = serde_json::from_str(&content)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

pub fn save_json(path: &Path, scenario: &Scenario) -> ProjectResult<()> {
    validate_scenario(scenario)?;
    let content = serde_json::to_string_pretty(scenario)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a scenario, choosing the format from the file extension.
pub fn load(path: &Path) -> ProjectResult<Scenario> {
    match extension(path).as_deref() {
        Some("yaml") | Some("yml") => load_yaml(path),
        Some("json") => load_json(path),
        _ => Err(ProjectError::UnsupportedExtension {
            path: path.display().to_string(),
        }),
    }
}

/// Save a scenario, choosing the format from the file extension.
pub fn save(path: &Path, scenario: &Scenario) -> ProjectResult<()> {
    match extension(path).as_deref() {
        Some("yaml") | Some("yml") => save_yaml(path, scenario),
        Some("json") => save_json(path, scenario),
        _ => Err(ProjectError::UnsupportedExtension {
            path: path.display().to_string(),
        }),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
