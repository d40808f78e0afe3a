//! Converts imported ADMS v1 data to ADMS v2
//!
//! Each rule rewrites one class or property IRI inside the sink graph.
//! Besides the vocabulary changes, the rules also repair IRIs that
//! harvested data is known to misspell.

use crate::core::{PipelineContext, Step, StepConfiguration, StepServices};
use crate::sparql::{vocab, GraphUpdate, GroupElement, PatternTerm, TriplePattern, TripleStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use oxrdf::NamedNode;
use std::sync::Arc;
use tracing::{debug, info};

pub const ID: &str = "convert_to_adms2";

/// A single IRI rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteRule {
    /// Replace `?s rdf:type <from>` by `?s rdf:type <to>`
    RenameClass { from: &'static str, to: &'static str },
    /// Replace `?s <from> ?o` by `?s <to> ?o`
    RenamePredicate { from: &'static str, to: &'static str },
    /// Like `RenamePredicate`, turning literal objects into IRI resources
    ///
    /// Values whose lexical form is not an IRI are left untouched.
    RenamePredicateToResource { from: &'static str, to: &'static str },
}

/// Rules applied in order
pub const RULES: &[RewriteRule] = &[
    RewriteRule::RenameClass {
        from: vocab::ADMS_ASSET,
        to: vocab::DCAT_DATASET,
    },
    RewriteRule::RenameClass {
        from: vocab::ADMS_ASSET_DISTRIBUTION,
        to: vocab::DCAT_DISTRIBUTION,
    },
    RewriteRule::RenameClass {
        from: vocab::ADMS_ASSET_REPOSITORY,
        to: vocab::DCAT_CATALOG,
    },
    RewriteRule::RenamePredicate {
        from: vocab::ADMS_INCLUDED_ASSET,
        to: vocab::DCT_HAS_PART,
    },
    RewriteRule::RenameClass {
        from: vocab::FOAF_AGENT_TERM,
        to: vocab::FOAF_AGENT,
    },
    RewriteRule::RenamePredicate {
        from: vocab::FOAF_IMAGE_TERM,
        to: vocab::FOAF_IMAGE,
    },
    RewriteRule::RenamePredicateToResource {
        from: vocab::DCAT_CONTACT_POINT_HTTPS,
        to: vocab::DCAT_CONTACT_POINT,
    },
];

impl RewriteRule {
    /// Render the rule as an update over `graph`
    pub fn to_update(&self, graph: &NamedNode) -> GraphUpdate {
        let s = || PatternTerm::var("s");
        let rdf_type = || PatternTerm::Iri(NamedNode::new_unchecked(vocab::RDF_TYPE));
        let predicate = |iri: &'static str, object: &str| {
            TriplePattern::new(s(), NamedNode::new_unchecked(iri), PatternTerm::var(object))
        };

        let update = GraphUpdate::with_graph(graph.clone());
        match *self {
            RewriteRule::RenameClass { from, to } => {
                let old = TriplePattern::new(s(), rdf_type(), NamedNode::new_unchecked(from));
                update
                    .delete(old.clone())
                    .insert(TriplePattern::new(s(), rdf_type(), NamedNode::new_unchecked(to)))
                    .where_element(old)
            }
            RewriteRule::RenamePredicate { from, to } => update
                .delete(predicate(from, "o"))
                .insert(predicate(to, "o"))
                .where_element(predicate(from, "o")),
            RewriteRule::RenamePredicateToResource { from, to } => update
                .delete(predicate(from, "o"))
                .insert(predicate(to, "resource"))
                .where_element(predicate(from, "o"))
                .where_element(GroupElement::BindIri {
                    source: "o".to_string(),
                    target: "resource".to_string(),
                }),
        }
    }
}

pub struct ConvertToAdms2 {
    configuration: StepConfiguration,
    triple_store: Arc<dyn TripleStore>,
}

impl ConvertToAdms2 {
    pub fn new(configuration: StepConfiguration, services: &StepServices) -> Self {
        Self {
            configuration,
            triple_store: services.triple_store.clone(),
        }
    }
}

#[async_trait]
impl Step for ConvertToAdms2 {
    fn id(&self) -> &str {
        ID
    }

    async fn execute(&mut self, data: &mut PipelineContext) -> Result<()> {
        let graph = self.configuration.sink_graph()?;
        info!("Converting {} to ADMS v2 ({} rules)", graph, RULES.len());

        for (index, rule) in RULES.iter().enumerate() {
            debug!("Applying rewrite rule {}: {:?}", index + 1, rule);
            self.triple_store
                .update(&rule.to_update(&graph).to_string())
                .await
                .with_context(|| format!("Rewrite rule {} ({:?}) failed", index + 1, rule))?;
        }

        data.insert("adms2_rewrite_rules", RULES.len() as u64);
        Ok(())
    }
}
