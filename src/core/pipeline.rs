//! Pipeline definitions and their registry

use crate::core::{
    config::{EtlConfig, PipelineConfig},
    error::EtlError,
    step::StepRegistry,
};
use crate::steps;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Ordered, named list of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Unique pipeline identifier
    pub id: String,

    /// Human-readable name
    pub label: String,

    /// Step IDs in execution order
    pub steps: Vec<String>,
}

impl PipelineDefinition {
    pub fn new(id: &str, label: &str, steps: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Step ID at a sequence position
    pub fn step_at(&self, sequence: usize) -> Option<&str> {
        self.steps.get(sequence).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check the definition against the known steps
    pub fn validate(&self, steps: &StepRegistry) -> Result<(), EtlError> {
        if self.id.trim().is_empty() {
            return Err(EtlError::InvalidDefinition(
                "pipeline ID must not be empty".to_string(),
            ));
        }

        if self.steps.is_empty() {
            return Err(EtlError::InvalidDefinition(format!(
                "pipeline '{}' has no steps",
                self.id
            )));
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step) {
                return Err(EtlError::InvalidDefinition(format!(
                    "pipeline '{}' lists step '{}' more than once",
                    self.id, step
                )));
            }
            if !steps.contains(step) {
                return Err(EtlError::InvalidDefinition(format!(
                    "pipeline '{}' references unknown step '{}'",
                    self.id, step
                )));
            }
        }

        Ok(())
    }
}

impl From<&PipelineConfig> for PipelineDefinition {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            id: config.id.clone(),
            label: config.label.clone().unwrap_or_else(|| config.id.clone()),
            steps: config.steps.clone(),
        }
    }
}

/// The data pipeline of the Spanish Center for Technology Transfer
pub fn spain_pipeline() -> PipelineDefinition {
    PipelineDefinition::new(
        "spain",
        "Spain - Center for Technology Transfer",
        &[
            steps::manual_upload::ID,
            steps::convert_to_adms2::ID,
            steps::remove_unsupported_data::ID,
            steps::adms_validation::ID,
        ],
    )
}

/// Pipeline definitions known to the process
///
/// Built at startup and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PipelineRegistry {
    definitions: HashMap<String, PipelineDefinition>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the compiled-in pipelines
    pub fn with_builtin(steps: &StepRegistry) -> Result<Self, EtlError> {
        let mut registry = Self::new();
        registry.register(spain_pipeline(), steps)?;
        Ok(registry)
    }

    /// Compiled-in pipelines plus the ones declared in the configuration
    pub fn from_config(config: &EtlConfig, steps: &StepRegistry) -> Result<Self, EtlError> {
        let mut registry = Self::with_builtin(steps)?;
        for pipeline in &config.pipelines {
            registry.register(PipelineDefinition::from(pipeline), steps)?;
        }
        Ok(registry)
    }

    /// Add a definition after validating it
    pub fn register(
        &mut self,
        definition: PipelineDefinition,
        steps: &StepRegistry,
    ) -> Result<(), EtlError> {
        definition.validate(steps)?;
        if self.definitions.contains_key(&definition.id) {
            return Err(EtlError::InvalidDefinition(format!(
                "pipeline '{}' is already registered",
                definition.id
            )));
        }
        self.definitions.insert(definition.id.clone(), definition);
        Ok(())
    }

    /// Get a pipeline definition by ID
    pub fn get(&self, id: &str) -> Result<&PipelineDefinition, EtlError> {
        self.definitions
            .get(id)
            .ok_or_else(|| EtlError::pipeline_not_found(id))
    }

    /// All definitions, sorted by ID
    pub fn list(&self) -> Vec<&PipelineDefinition> {
        let mut definitions: Vec<_> = self.definitions.values().collect();
        definitions.sort_by(|a, b| a.id.cmp(&b.id));
        definitions
    }
}
