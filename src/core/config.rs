//! ETL configuration from YAML

use crate::core::step::{StepConfiguration, SINK_GRAPH};
use crate::mapping::{default_mappings, RdfEntityMapping};
use crate::sparql::arg;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "rdf-etl.yaml";

/// Graph imported data is staged in unless configured otherwise
pub const DEFAULT_SINK_GRAPH: &str = "http://adms-sink";

/// Top-level configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    /// SPARQL endpoint settings
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Graph imported data is staged in
    #[serde(default = "default_sink_graph")]
    pub sink_graph: String,

    /// SQLite database holding run state
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// Extra options per step ID
    #[serde(default)]
    pub steps: HashMap<String, BTreeMap<String, Value>>,

    /// Bundle to RDF type mappings
    #[serde(default = "default_mappings")]
    pub mappings: Vec<RdfEntityMapping>,

    /// Pipelines declared on top of the compiled-in ones
    #[serde(default)]
    pub pipelines: Vec<PipelineConfig>,
}

/// SPARQL endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// SPARQL query endpoint
    #[serde(default = "default_query_url")]
    pub query_url: String,

    /// SPARQL update endpoint
    #[serde(default = "default_query_url")]
    pub update_url: String,

    /// Graph Store HTTP Protocol endpoint
    #[serde(default = "default_graph_store_url")]
    pub graph_store_url: String,

    /// Request timeout (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Pipeline definition as declared in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub id: String,

    #[serde(default)]
    pub label: Option<String>,

    pub steps: Vec<String>,
}

fn default_sink_graph() -> String {
    DEFAULT_SINK_GRAPH.to_string()
}

fn default_query_url() -> String {
    "http://localhost:8890/sparql".to_string()
}

fn default_graph_store_url() -> String {
    "http://localhost:8890/sparql-graph-crud".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            query_url: default_query_url(),
            update_url: default_query_url(),
            graph_store_url: default_graph_store_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            sink_graph: default_sink_graph(),
            database: None,
            steps: HashMap::new(),
            mappings: default_mappings(),
            pipelines: Vec::new(),
        }
    }
}

impl EtlConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: EtlConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the given file, or the default file when present, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        arg::named_node(&self.sink_graph).context("Invalid sink_graph")?;

        for (name, url) in [
            ("query_url", &self.endpoint.query_url),
            ("update_url", &self.endpoint.update_url),
            ("graph_store_url", &self.endpoint.graph_store_url),
        ] {
            reqwest::Url::parse(url)
                .with_context(|| format!("Invalid endpoint {}: '{}'", name, url))?;
        }

        for mapping in &self.mappings {
            arg::named_node(&mapping.rdf_type)
                .with_context(|| format!("Invalid rdf_type for bundle '{}'", mapping.bundle))?;
        }

        let mut seen_ids = HashSet::new();
        for pipeline in &self.pipelines {
            if !seen_ids.insert(&pipeline.id) {
                anyhow::bail!("Duplicate pipeline ID: {}", pipeline.id);
            }
        }

        Ok(())
    }

    /// Path of the run database
    pub fn database_path(&self) -> PathBuf {
        match &self.database {
            Some(path) => path.clone(),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("rdf-etl")
                .join("runs.db"),
        }
    }

    /// Options a step is instantiated with before any form input
    pub fn step_configuration(&self, step_id: &str) -> StepConfiguration {
        let mut configuration = StepConfiguration::new().with(SINK_GRAPH, self.sink_graph.as_str());
        if let Some(options) = self.steps.get(step_id) {
            configuration.merge(&StepConfiguration::from(options.clone()));
        }
        configuration
    }
}
