//! Checks the staged data against the ADMS v2 requirements Joinup relies on

use crate::core::{PipelineContext, Step, StepConfiguration, StepServices};
use crate::sparql::{vocab, GroupElement, PatternTerm, SubjectSelect, TriplePattern, TripleStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use oxrdf::NamedNode;
use std::sync::Arc;
use tracing::{info, warn};

pub const ID: &str = "adms_validation";

/// A resource of `class` must carry `property`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredProperty {
    pub class: &'static str,
    pub property: &'static str,
    pub message: &'static str,
}

pub const RULES: &[RequiredProperty] = &[
    RequiredProperty {
        class: vocab::DCAT_DATASET,
        property: vocab::DCT_TITLE,
        message: "Solutions and releases must have a title",
    },
    RequiredProperty {
        class: vocab::DCAT_DATASET,
        property: vocab::DCT_DESCRIPTION,
        message: "Solutions and releases must have a description",
    },
    RequiredProperty {
        class: vocab::DCAT_DISTRIBUTION,
        property: vocab::DCAT_ACCESS_URL,
        message: "Distributions must have an access URL",
    },
    RequiredProperty {
        class: vocab::FOAF_AGENT,
        property: vocab::FOAF_NAME,
        message: "Owners must have a name",
    },
];

impl RequiredProperty {
    /// Query returning the resources violating the rule
    pub fn to_query(&self, graph: &NamedNode) -> SubjectSelect {
        let subject = || PatternTerm::var("subject");
        SubjectSelect::new(graph.clone(), "subject")
            .where_element(TriplePattern::new(
                subject(),
                NamedNode::new_unchecked(vocab::RDF_TYPE),
                NamedNode::new_unchecked(self.class),
            ))
            .where_element(GroupElement::FilterNotExists(vec![TriplePattern::new(
                subject(),
                NamedNode::new_unchecked(self.property),
                PatternTerm::var("value"),
            )]))
    }
}

pub struct AdmsValidation {
    configuration: StepConfiguration,
    triple_store: Arc<dyn TripleStore>,
}

impl AdmsValidation {
    pub fn new(configuration: StepConfiguration, services: &StepServices) -> Self {
        Self {
            configuration,
            triple_store: services.triple_store.clone(),
        }
    }

    /// Run every rule and collect `message: subject` lines
    async fn violations(&self, graph: &NamedNode) -> Result<Vec<String>> {
        let mut violations = Vec::new();
        for rule in RULES {
            let query = rule.to_query(graph);
            let solutions = self
                .triple_store
                .select(&query.to_string())
                .await
                .with_context(|| format!("Validation query failed: {}", rule.message))?;

            for solution in solutions {
                if let Some(subject) = solution.get(query.var()) {
                    violations.push(format!("{}: {}", rule.message, subject));
                }
            }
        }
        Ok(violations)
    }
}

#[async_trait]
impl Step for AdmsValidation {
    fn id(&self) -> &str {
        ID
    }

    async fn execute(&mut self, data: &mut PipelineContext) -> Result<()> {
        let graph = self.configuration.sink_graph()?;
        info!("Validating {} ({} rules)", graph, RULES.len());

        let violations = self.violations(&graph).await?;
        if !violations.is_empty() {
            warn!("{} validation violations in {}", violations.len(), graph);
            anyhow::bail!(
                "{} validation violations:\n{}",
                violations.len(),
                violations.join("\n")
            );
        }

        data.insert("validation_violations", 0u64);
        Ok(())
    }
}
