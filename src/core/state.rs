//! Pipeline run state

use serde::{Deserialize, Serialize};

/// Persisted cursor of a pipeline run
///
/// `sequence` is the index of the next step to run. It equals the number
/// of steps once the run is complete. Values are never mutated in place;
/// [`PipelineState::advance`] returns the successor state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
    pipeline_id: String,
    sequence: usize,
}

impl PipelineState {
    pub fn new(pipeline_id: impl Into<String>, sequence: usize) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            sequence,
        }
    }

    /// State of a freshly started run
    pub fn start(pipeline_id: impl Into<String>) -> Self {
        Self::new(pipeline_id, 0)
    }

    /// The pipeline this run belongs to
    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    /// Zero-based index of the next step
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    /// State after the current step succeeded
    #[must_use]
    pub fn advance(&self) -> Self {
        Self::new(self.pipeline_id.clone(), self.sequence + 1)
    }

    /// Whether the run has gone through all `total_steps`
    pub fn is_complete(&self, total_steps: usize) -> bool {
        self.sequence >= total_steps
    }
}

/// Where a run stands within its pipeline definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Waiting for the step at `sequence` to run
    AwaitingStep { sequence: usize, step_id: String },
    /// Every step has run
    Completed,
}
