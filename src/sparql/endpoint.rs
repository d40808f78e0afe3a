//! SPARQL 1.1 Protocol client

use crate::core::config::EndpointConfig;
use crate::sparql::{TripleStore, TripleStoreError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use oxrdf::NamedNode;
use oxrdfio::RdfFormat;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use sparesults::{QueryResultsFormat, QueryResultsParser, QuerySolution, SliceQueryResultsParserOutput};
use std::time::Duration;
use tracing::debug;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Triple store reached over HTTP
///
/// Queries and updates go to the SPARQL protocol endpoints, bulk loads go
/// to the Graph Store HTTP Protocol endpoint.
#[derive(Debug, Clone)]
pub struct SparqlEndpoint {
    client: Client,
    query_url: String,
    update_url: String,
    graph_store_url: String,
}

impl SparqlEndpoint {
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            query_url: config.query_url.clone(),
            update_url: config.update_url.clone(),
            graph_store_url: config.graph_store_url.clone(),
        })
    }

    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    async fn check_status(response: Response) -> Result<Response, TripleStoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TripleStoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Parse a `application/sparql-results+json` document into solutions
pub fn parse_json_solutions(body: &[u8]) -> Result<Vec<QuerySolution>, TripleStoreError> {
    let parser = QueryResultsParser::from_format(QueryResultsFormat::Json);
    match parser
        .for_slice(body)
        .map_err(|e| TripleStoreError::Results(e.to_string()))?
    {
        SliceQueryResultsParserOutput::Solutions(solutions) => solutions
            .map(|solution| solution.map_err(|e| TripleStoreError::Results(e.to_string())))
            .collect(),
        SliceQueryResultsParserOutput::Boolean(_) => {
            Err(TripleStoreError::UnexpectedResults { expected: "solutions" })
        }
    }
}

#[async_trait]
impl TripleStore for SparqlEndpoint {
    async fn update(&self, sparql: &str) -> Result<(), TripleStoreError> {
        debug!("SPARQL update:\n{}", sparql);
        let response = self
            .client
            .post(&self.update_url)
            .form(&[("update", sparql)])
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn select(&self, sparql: &str) -> Result<Vec<QuerySolution>, TripleStoreError> {
        debug!("SPARQL query:\n{}", sparql);
        let response = self
            .client
            .post(&self.query_url)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .form(&[("query", sparql)])
            .send()
            .await?;
        let body = Self::check_status(response).await?.bytes().await?;
        parse_json_solutions(&body)
    }

    async fn load_graph(
        &self,
        graph: &NamedNode,
        data: Vec<u8>,
        format: RdfFormat,
    ) -> Result<(), TripleStoreError> {
        debug!("Loading {} bytes of {} into {}", data.len(), format.name(), graph);
        let response = self
            .client
            .post(&self.graph_store_url)
            .query(&[("graph", graph.as_str())])
            .header(CONTENT_TYPE, format.media_type())
            .body(data)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
