//! rdf-etl - resumable, step-based RDF import pipelines over SPARQL

pub mod cli;
pub mod core;
pub mod execution;
pub mod mapping;
pub mod persistence;
pub mod sparql;
pub mod steps;

// Re-export commonly used types
pub use core::{
    ConfigurableStep, EtlError, FormSubmission, PipelineContext, PipelineDefinition,
    PipelineRegistry, PipelineState, Step, StepConfiguration, StepRegistry, StepServices,
};
pub use execution::{InvocationOutcome, Orchestrator, OrchestratorEvent, RunStatus};
pub use persistence::{InMemoryStateStore, StateStore};
pub use sparql::{SparqlEndpoint, TripleStore};
