//! Test: Remove Unsupported Data - only Joinup entity types survive

use crate::helpers::*;
use oxigraph::model::NamedNode;
use rdf_etl::core::{PipelineContext, Step, StepConfiguration, StepServices, SINK_GRAPH};
use rdf_etl::mapping::{ConfiguredMappings, RdfEntityMapping};
use rdf_etl::sparql::vocab;
use rdf_etl::steps::RemoveUnsupportedData;
use std::sync::Arc;

const SKOS_CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#Concept";

const STAGED: &str = r#"
@prefix dcat: <http://www.w3.org/ns/dcat#> .
@prefix dct: <http://purl.org/dc/terms/> .
@prefix foaf: <http://xmlns.com/foaf/0.1/> .
@prefix skos: <http://www.w3.org/2004/02/skos/core#> .
@prefix ex: <http://example.com/> .

ex:solution a dcat:Dataset ;
    dct:title "Solution" ;
    dct:description "A solution" ;
    dcat:distribution ex:dist .
ex:dist a dcat:Distribution ;
    dcat:accessURL <http://example.com/file.zip> .
ex:owner a foaf:Agent ;
    foaf:name "Owner" .
ex:concept a skos:Concept ;
    skos:prefLabel "Concept" .
ex:catalog a dcat:Catalog ;
    dct:hasPart ex:solution .
ex:mixed a dcat:Dataset, skos:Concept ;
    dct:title "Mixed" .
ex:untyped dct:title "No type" .
"#;

async fn remove(triple_store: &MemoryTripleStore) -> PipelineContext {
    let mut step =
        RemoveUnsupportedData::new(sink_configuration(), &services(Arc::new(triple_store.clone())));
    let mut data = PipelineContext::new();
    step.execute(&mut data).await.unwrap();
    data
}

#[tokio::test]
async fn test_unsupported_subjects_are_removed() {
    let triple_store = MemoryTripleStore::new();
    triple_store.load_turtle(&sink(), STAGED);
    assert_eq!(triple_store.triple_count(&sink()), 16);

    let data = remove(&triple_store).await;

    assert_eq!(triple_store.count_of_type(&sink(), SKOS_CONCEPT), 0);
    assert_eq!(triple_store.count_of_type(&sink(), vocab::DCAT_CATALOG), 0);
    assert!(!triple_store.has_subject(&sink(), "http://example.com/concept"));
    assert!(!triple_store.has_subject(&sink(), "http://example.com/catalog"));

    // A subject with any unsupported type goes entirely
    assert!(!triple_store.has_subject(&sink(), "http://example.com/mixed"));

    // Supported and untyped subjects keep all their triples
    assert!(triple_store.has_subject(&sink(), "http://example.com/untyped"));
    assert!(triple_store.contains_iri_triple(
        &sink(),
        "http://example.com/solution",
        "http://www.w3.org/ns/dcat#distribution",
        "http://example.com/dist",
    ));
    assert_eq!(triple_store.count_of_type(&sink(), vocab::DCAT_DATASET), 1);
    assert_eq!(triple_store.count_of_type(&sink(), vocab::DCAT_DISTRIBUTION), 1);
    assert_eq!(triple_store.count_of_type(&sink(), vocab::FOAF_AGENT), 1);
    assert_eq!(triple_store.triple_count(&sink()), 9);

    assert_eq!(data.get_u64("supported_rdf_types"), Some(5));
}

#[tokio::test]
async fn test_removal_is_idempotent() {
    let triple_store = MemoryTripleStore::new();
    triple_store.load_turtle(&sink(), STAGED);

    remove(&triple_store).await;
    let after_first = triple_store.triple_count(&sink());
    remove(&triple_store).await;

    assert_eq!(triple_store.triple_count(&sink()), after_first);
    assert_eq!(triple_store.update_count(), 2);
}

#[tokio::test]
async fn test_other_graphs_are_untouched() {
    let triple_store = MemoryTripleStore::new();
    let published = NamedNode::new("http://example.com/graph/published").unwrap();
    triple_store.load_turtle(&sink(), STAGED);
    triple_store.load_turtle(&published, STAGED);

    remove(&triple_store).await;

    assert_eq!(triple_store.triple_count(&published), 16);
    assert_eq!(triple_store.count_of_type(&published, SKOS_CONCEPT), 2);
}

#[tokio::test]
async fn test_invalid_sink_graph_issues_no_update() {
    let triple_store = MemoryTripleStore::new();
    triple_store.load_turtle(&sink(), STAGED);

    let configuration = StepConfiguration::new().with(SINK_GRAPH, "http://adms-sink> } ; DROP ALL ; {");
    let mut step =
        RemoveUnsupportedData::new(configuration, &services(Arc::new(triple_store.clone())));
    let result = step.execute(&mut PipelineContext::new()).await;

    assert!(result.is_err());
    assert_eq!(triple_store.update_count(), 0);
    assert_eq!(triple_store.triple_count(&sink()), 16);
}

/// With no mapped RDF types every typed subject is unsupported
#[tokio::test]
async fn test_no_mapped_types_removes_every_typed_subject() {
    let triple_store = MemoryTripleStore::new();
    triple_store.load_turtle(&sink(), STAGED);

    let unmapped = vec![RdfEntityMapping::new("page", "node", "")];
    for mappings in [ConfiguredMappings::default(), ConfiguredMappings::new(unmapped)] {
        let services = StepServices::new(Arc::new(triple_store.clone()), Arc::new(mappings));
        let mut step = RemoveUnsupportedData::new(sink_configuration(), &services);
        let mut data = PipelineContext::new();
        step.execute(&mut data).await.unwrap();
        assert_eq!(data.get_u64("supported_rdf_types"), Some(0));
    }

    assert!(!triple_store.has_subject(&sink(), "http://example.com/solution"));
    assert!(!triple_store.has_subject(&sink(), "http://example.com/owner"));
    assert_eq!(triple_store.count_of_type(&sink(), vocab::DCAT_DATASET), 0);
    assert!(triple_store.has_subject(&sink(), "http://example.com/untyped"));
    assert_eq!(triple_store.triple_count(&sink()), 1);
}
