//! Error types of the ETL engine

use crate::core::form::ValidationErrors;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by registries and the orchestrator
///
/// None of them is retried by the engine; the caller decides whether to
/// invoke the run again.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("No {kind} registered with ID '{id}'")]
    NotFound { kind: &'static str, id: String },

    #[error("Run {run_id} has no active pipeline step; start a run first")]
    NoActiveStep { run_id: Uuid },

    #[error("Pipeline '{pipeline_id}' has no step at sequence {sequence}")]
    UnknownStep { pipeline_id: String, sequence: usize },

    #[error("Step '{step_id}' failed: {source:#}")]
    StepExecution {
        step_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid configuration for step '{step_id}': {errors}")]
    ConfigurationValidation {
        step_id: String,
        errors: ValidationErrors,
    },

    #[error("Invalid pipeline definition: {0}")]
    InvalidDefinition(String),

    #[error("Storage error: {0:#}")]
    Storage(#[source] anyhow::Error),
}

impl EtlError {
    pub fn pipeline_not_found(id: &str) -> Self {
        EtlError::NotFound {
            kind: "pipeline",
            id: id.to_string(),
        }
    }

    pub fn step_not_found(id: &str) -> Self {
        EtlError::NotFound {
            kind: "step",
            id: id.to_string(),
        }
    }
}
