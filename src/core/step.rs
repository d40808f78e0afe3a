//! Step contract and step registry

use crate::core::{
    context::PipelineContext,
    error::EtlError,
    form::{ConfigurationForm, FormSubmission, ValidationErrors},
};
use crate::mapping::EntityTypeMappings;
use crate::sparql::{arg, TripleStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use oxrdf::NamedNode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Option holding the graph imported data is staged in
pub const SINK_GRAPH: &str = "sink_graph";

/// Options a step is instantiated with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepConfiguration {
    options: BTreeMap<String, Value>,
}

impl StepConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.options.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// Get a string option, failing when it is absent
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get_str(key)
            .with_context(|| format!("Missing required option '{}'", key))
    }

    /// The sink graph, validated as an IRI
    pub fn sink_graph(&self) -> Result<NamedNode> {
        let value = self.require_str(SINK_GRAPH)?;
        Ok(arg::named_node(value)?)
    }

    /// Overlay `other` on top of these options
    pub fn merge(&mut self, other: &StepConfiguration) {
        for (key, value) in &other.options {
            self.options.insert(key.clone(), value.clone());
        }
    }
}

impl From<BTreeMap<String, Value>> for StepConfiguration {
    fn from(options: BTreeMap<String, Value>) -> Self {
        Self { options }
    }
}

/// A unit of ETL work
#[async_trait]
pub trait Step: Send + Sync {
    /// Identifier the step is registered under
    fn id(&self) -> &str;

    /// Perform the step's work
    ///
    /// An error leaves the pipeline run on this step.
    async fn execute(&mut self, data: &mut PipelineContext) -> Result<()>;

    /// The configuration capability, for steps that need operator input
    fn as_configurable(&mut self) -> Option<&mut dyn ConfigurableStep> {
        None
    }
}

/// Steps that collect configuration through a form before executing
///
/// `configuration` is the view of the options the step was created with.
pub trait ConfigurableStep: Send + Sync {
    fn build_configuration_form(&self, configuration: &StepConfiguration) -> ConfigurationForm;

    fn validate_configuration_form(
        &self,
        submission: &FormSubmission,
        configuration: &StepConfiguration,
    ) -> Result<(), ValidationErrors>;

    /// Store validated values into the step configuration
    fn submit_configuration_form(&mut self, submission: &FormSubmission);
}

/// Collaborators shared by every step instance
#[derive(Clone)]
pub struct StepServices {
    pub triple_store: Arc<dyn TripleStore>,
    pub mappings: Arc<dyn EntityTypeMappings>,
}

impl StepServices {
    pub fn new(triple_store: Arc<dyn TripleStore>, mappings: Arc<dyn EntityTypeMappings>) -> Self {
        Self {
            triple_store,
            mappings,
        }
    }
}

/// Constructor of a step instance
pub type StepFactory =
    Arc<dyn Fn(StepConfiguration, &StepServices) -> Box<dyn Step> + Send + Sync>;

/// Table of known steps, built once at startup
#[derive(Clone, Default)]
pub struct StepRegistry {
    factories: HashMap<String, StepFactory>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step factory, replacing any previous one with that ID
    pub fn register<F>(&mut self, id: &str, factory: F)
    where
        F: Fn(StepConfiguration, &StepServices) -> Box<dyn Step> + Send + Sync + 'static,
    {
        self.factories.insert(id.to_string(), Arc::new(factory));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered step IDs, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Instantiate a step
    pub fn create(
        &self,
        id: &str,
        configuration: StepConfiguration,
        services: &StepServices,
    ) -> Result<Box<dyn Step>, EtlError> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| EtlError::step_not_found(id))?;
        Ok(factory(configuration, services))
    }
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry")
            .field("steps", &self.ids())
            .finish()
    }
}
