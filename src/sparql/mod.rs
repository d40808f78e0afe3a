//! SPARQL triple store access
//!
//! Steps never talk HTTP directly: they compose query text through
//! [`arg`] and [`query`] and hand it to a [`TripleStore`].

pub mod arg;
pub mod endpoint;
pub mod query;
pub mod vocab;

pub use arg::ArgError;
pub use endpoint::SparqlEndpoint;
pub use query::{GraphUpdate, GroupElement, PatternTerm, SubjectSelect, TriplePattern};

use async_trait::async_trait;
use oxrdf::NamedNode;
use oxrdfio::RdfFormat;
use sparesults::QuerySolution;
use thiserror::Error;

/// Error types for triple store operations
#[derive(Debug, Error)]
pub enum TripleStoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not parse query results: {0}")]
    Results(String),

    #[error("Unexpected query result kind: expected {expected}")]
    UnexpectedResults { expected: &'static str },

    #[error("Store error: {0}")]
    Store(String),
}

/// Trait for triple store access - allows for different implementations
#[async_trait]
pub trait TripleStore: Send + Sync {
    /// Execute a SPARQL 1.1 update
    async fn update(&self, sparql: &str) -> Result<(), TripleStoreError>;

    /// Execute a SPARQL SELECT query and collect its solutions
    async fn select(&self, sparql: &str) -> Result<Vec<QuerySolution>, TripleStoreError>;

    /// Add serialized RDF data to a named graph
    async fn load_graph(
        &self,
        graph: &NamedNode,
        data: Vec<u8>,
        format: RdfFormat,
    ) -> Result<(), TripleStoreError>;

    /// Remove every triple of a named graph
    async fn clear_graph(&self, graph: &NamedNode) -> Result<(), TripleStoreError> {
        self.update(&format!("CLEAR SILENT GRAPH {}", graph)).await
    }
}
