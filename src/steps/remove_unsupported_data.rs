//! Removes the triples not supported by Joinup
//!
//! Scans the imported triples in the sink graph and drops every resource
//! that is not a Joinup entity: solutions, releases, distributions,
//! licences, owners or contact information.

use crate::core::{PipelineContext, Step, StepConfiguration, StepServices};
use crate::mapping::EntityTypeMappings;
use crate::sparql::{
    arg, vocab, GraphUpdate, GroupElement, PatternTerm, TriplePattern, TripleStore,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use oxrdf::NamedNode;
use std::sync::Arc;
use tracing::{info, warn};

pub const ID: &str = "remove_joinup_unsupported_data";

pub struct RemoveUnsupportedData {
    configuration: StepConfiguration,
    triple_store: Arc<dyn TripleStore>,
    mappings: Arc<dyn EntityTypeMappings>,
}

impl RemoveUnsupportedData {
    pub fn new(configuration: StepConfiguration, services: &StepServices) -> Self {
        Self {
            configuration,
            triple_store: services.triple_store.clone(),
            mappings: services.mappings.clone(),
        }
    }

    fn supported_types(&self) -> Result<Vec<NamedNode>> {
        self.mappings
            .rdf_entity_types()
            .iter()
            .map(|rdf_type| {
                arg::named_node(rdf_type)
                    .with_context(|| format!("Invalid RDF type in entity mapping: {}", rdf_type))
            })
            .collect()
    }
}

/// Update deleting every subject with an `rdf:type` outside `supported`
///
/// All triples of such a subject go, including its supported types.
/// Untyped subjects are kept. With no supported types every typed subject
/// is removed.
pub fn removal_update(graph: NamedNode, supported: Vec<NamedNode>) -> GraphUpdate {
    let subject = || PatternTerm::var("subject");
    let everything = || TriplePattern::new(subject(), PatternTerm::var("predicate"), PatternTerm::var("object"));

    let unsupported_subjects = GroupElement::SubSelect {
        var: "subject".to_string(),
        pattern: vec![
            TriplePattern::new(
                subject(),
                NamedNode::new_unchecked(vocab::RDF_TYPE),
                PatternTerm::var("type"),
            )
            .into(),
            GroupElement::FilterNotIn {
                var: "type".to_string(),
                values: supported,
            },
        ],
    };

    GraphUpdate::with_graph(graph)
        .delete(everything())
        .where_element(everything())
        .where_element(unsupported_subjects)
}

#[async_trait]
impl Step for RemoveUnsupportedData {
    fn id(&self) -> &str {
        ID
    }

    async fn execute(&mut self, data: &mut PipelineContext) -> Result<()> {
        let graph = self.configuration.sink_graph()?;
        let supported = self.supported_types()?;
        let supported_count = supported.len();
        if supported.is_empty() {
            warn!("No RDF entity types are mapped; every typed resource in {} will be removed", graph);
        }

        info!(
            "Removing resources of unsupported types from {} ({} supported types)",
            graph, supported_count
        );
        let update = removal_update(graph, supported);
        self.triple_store
            .update(&update.to_string())
            .await
            .context("Failed to remove unsupported data")?;

        data.insert("supported_rdf_types", supported_count as u64);
        Ok(())
    }
}
