//! Entity bundle to RDF type mappings

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Entity type whose bundles are stored as RDF resources
pub const RDF_ENTITY: &str = "rdf_entity";

/// Associates a content bundle with the RDF type it is stored as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfEntityMapping {
    pub bundle: String,
    pub entity_type_id: String,
    pub rdf_type: String,
}

impl RdfEntityMapping {
    pub fn new(bundle: &str, entity_type_id: &str, rdf_type: &str) -> Self {
        Self {
            bundle: bundle.to_string(),
            entity_type_id: entity_type_id.to_string(),
            rdf_type: rdf_type.to_string(),
        }
    }
}

/// Source of the registered entity type mappings
pub trait EntityTypeMappings: Send + Sync {
    fn mappings(&self) -> Vec<RdfEntityMapping>;

    /// RDF types of the bundles stored as RDF entities, deduplicated and sorted
    fn rdf_entity_types(&self) -> Vec<String> {
        self.mappings()
            .into_iter()
            .filter(|m| m.entity_type_id == RDF_ENTITY)
            .map(|m| m.rdf_type)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Mappings taken from the configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfiguredMappings {
    mappings: Vec<RdfEntityMapping>,
}

impl ConfiguredMappings {
    pub fn new(mappings: Vec<RdfEntityMapping>) -> Self {
        Self { mappings }
    }
}

impl EntityTypeMappings for ConfiguredMappings {
    fn mappings(&self) -> Vec<RdfEntityMapping> {
        self.mappings.clone()
    }
}

/// The Joinup bundles: solutions, releases, distributions, licences,
/// owners and contact information
pub fn default_mappings() -> Vec<RdfEntityMapping> {
    use crate::sparql::vocab::*;

    vec![
        RdfEntityMapping::new("solution", RDF_ENTITY, DCAT_DATASET),
        RdfEntityMapping::new("asset_release", RDF_ENTITY, DCAT_DATASET),
        RdfEntityMapping::new("asset_distribution", RDF_ENTITY, DCAT_DISTRIBUTION),
        RdfEntityMapping::new("licence", RDF_ENTITY, DCT_LICENSE_DOCUMENT),
        RdfEntityMapping::new("owner", RDF_ENTITY, FOAF_AGENT),
        RdfEntityMapping::new("contact_information", RDF_ENTITY, VCARD_KIND),
    ]
}
