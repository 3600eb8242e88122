//! Scenario validation logic.

use crate::schema::{LATEST_VERSION, Scenario};
use rr_model::ModelError;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version == 0 || scenario.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }

    if scenario.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".to_string(),
            value: format!("{:?}", scenario.name),
            reason: "must not be empty".to_string(),
        });
    }

    if let Err(e) = scenario.parameters.validate() {
        return Err(match e {
            ModelError::Parameter { name, reason } => ValidationError::InvalidValue {
                field: format!("parameters.{}", name),
                value: parameter_value(scenario, name),
                reason,
            },
            other => ValidationError::InvalidValue {
                field: "parameters".to_string(),
                value: String::new(),
                reason: other.to_string(),
            },
        });
    }

    scenario
        .newton_config()
        .validate()
        .map_err(|e| ValidationError::InvalidValue {
            field: "solver".to_string(),
            value: String::new(),
            reason: e.to_string(),
        })?;

    Ok(())
}

fn parameter_value(scenario: &Scenario, name: &str) -> String {
    let p = &scenario.parameters;
    match name {
        "rho" => p.rho.to_string(),
        "sigma" => p.sigma.to_string(),
        "alpha" => p.alpha.to_string(),
        "delta" => p.delta.to_string(),
        "productivity" => p.productivity.to_string(),
        "labor" => p.labor.to_string(),
        "nodes" => p.nodes.to_string(),
        "initial_capital" => p.initial_capital.to_string(),
        _ => String::new(),
    }
}
