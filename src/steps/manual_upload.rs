//! Loads an operator-provided ADMS file into the sink graph

use crate::core::{
    ConfigurableStep, ConfigurationForm, FieldKind, FormField, FormSubmission, PipelineContext,
    Step, StepConfiguration, StepServices, ValidationErrors,
};
use crate::sparql::TripleStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use oxrdfio::RdfFormat;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub const ID: &str = "manual_upload_step";

/// Form field and configuration option holding the file path
pub const ADMS_FILE: &str = "adms_file";

/// RDF serialization of a file, judged by its extension
///
/// Only triple formats: the data always lands in the sink graph.
pub fn format_for_path(path: &Path) -> Option<RdfFormat> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "rdf" | "xml" | "owl" => Some(RdfFormat::RdfXml),
        "ttl" => Some(RdfFormat::Turtle),
        "nt" => Some(RdfFormat::NTriples),
        "n3" => Some(RdfFormat::N3),
        _ => None,
    }
}

pub struct ManualUpload {
    configuration: StepConfiguration,
    triple_store: Arc<dyn TripleStore>,
}

impl ManualUpload {
    pub fn new(configuration: StepConfiguration, services: &StepServices) -> Self {
        Self {
            configuration,
            triple_store: services.triple_store.clone(),
        }
    }
}

impl ConfigurableStep for ManualUpload {
    fn build_configuration_form(&self, configuration: &StepConfiguration) -> ConfigurationForm {
        ConfigurationForm::new().field(
            FormField::new(ADMS_FILE, "ADMS file", FieldKind::FilePath)
                .required()
                .with_description("RDF file (RDF/XML, Turtle, N-Triples or N3) to import")
                .with_default(configuration.get_str(ADMS_FILE).map(str::to_string)),
        )
    }

    fn validate_configuration_form(
        &self,
        submission: &FormSubmission,
        _configuration: &StepConfiguration,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match submission.get(ADMS_FILE) {
            None => errors.add(ADMS_FILE, "This field is required."),
            Some(value) => {
                let path = Path::new(value);
                if !path.is_file() {
                    errors.add(ADMS_FILE, format!("File {} does not exist.", value));
                } else if format_for_path(path).is_none() {
                    errors.add(
                        ADMS_FILE,
                        "Only files with the extension rdf, xml, owl, ttl, nt or n3 are allowed.",
                    );
                }
            }
        }

        errors.into_result()
    }

    fn submit_configuration_form(&mut self, submission: &FormSubmission) {
        if let Some(value) = submission.get(ADMS_FILE) {
            self.configuration.set(ADMS_FILE, value);
        }
    }
}

#[async_trait]
impl Step for ManualUpload {
    fn id(&self) -> &str {
        ID
    }

    async fn execute(&mut self, data: &mut PipelineContext) -> Result<()> {
        let graph = self.configuration.sink_graph()?;
        let file = self
            .configuration
            .require_str(ADMS_FILE)
            .context("No ADMS file was submitted")?
            .to_string();
        let path = Path::new(&file);
        let format = format_for_path(path)
            .with_context(|| format!("Cannot tell the RDF format of {}", file))?;

        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", file))?;

        info!("Uploading {} ({} bytes) into {}", file, content.len(), graph);
        self.triple_store
            .clear_graph(&graph)
            .await
            .context("Failed to clear the sink graph")?;
        self.triple_store
            .load_graph(&graph, content, format)
            .await
            .with_context(|| format!("Failed to load {} into {}", file, graph))?;

        data.insert("uploaded_file", file);
        Ok(())
    }

    fn as_configurable(&mut self) -> Option<&mut dyn ConfigurableStep> {
        Some(self)
    }
}
