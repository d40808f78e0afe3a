//! Validation of values interpolated into SPARQL text
//!
//! Every IRI that ends up inside a query is parsed here first, as an
//! absolute IRI, which rules out quotes, angle brackets, braces and
//! whitespace. Literals need no entry point of their own: query builders
//! take `oxrdf::Literal` values and write them with its N-Triples
//! serializer, which escapes quotes, backslashes and line breaks.

use oxrdf::NamedNode;
use thiserror::Error;

/// Error raised when a value cannot be used as a SPARQL argument
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    #[error("Invalid IRI '{value}': {reason}")]
    InvalidIri { value: String, reason: String },
}

/// Parse a string into a validated IRI
pub fn named_node(value: &str) -> Result<NamedNode, ArgError> {
    NamedNode::new(value).map_err(|e| ArgError::InvalidIri {
        value: value.escape_debug().to_string(),
        reason: e.to_string(),
    })
}
