//! Pipeline run orchestration

pub mod orchestrator;

pub use orchestrator::{
    EventHandler, InvocationOutcome, Orchestrator, OrchestratorEvent, RunStatus,
};
