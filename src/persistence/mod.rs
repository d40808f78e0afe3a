//! Persistence layer for pipeline run state

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteStateStore;

use crate::core::{PipelineContext, PipelineState};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A stored pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Run identifier
    pub run_id: Uuid,

    /// Persisted cursor
    pub state: PipelineState,

    /// Last time the run was saved
    pub updated_at: DateTime<Utc>,
}

/// Trait for run state storage backends
///
/// Callers must not drive the same run from two processes at once; the
/// backends do not lock runs.
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    /// Load the state of a run
    async fn load(&self, run_id: Uuid) -> Result<Option<PipelineState>>;

    /// Save the state of a run, creating it if needed
    async fn save(&self, run_id: Uuid, state: &PipelineState) -> Result<()>;

    /// Load the shared data of a run (empty for unknown runs)
    async fn load_context(&self, run_id: Uuid) -> Result<PipelineContext>;

    /// Save the shared data of an existing run
    async fn save_context(&self, run_id: Uuid, context: &PipelineContext) -> Result<()>;

    /// Save the state and shared data of an existing run in one write
    ///
    /// Either both are stored or neither is.
    async fn save_progress(
        &self,
        run_id: Uuid,
        state: &PipelineState,
        context: &PipelineContext,
    ) -> Result<()>;

    /// Forget a run
    async fn delete(&self, run_id: Uuid) -> Result<()>;

    /// All runs, most recently updated first
    async fn list_runs(&self) -> Result<Vec<RunRecord>>;
}

struct StoredRun {
    state: PipelineState,
    context: PipelineContext,
    updated_at: DateTime<Utc>,
}

/// In-memory persistence (for testing or ephemeral use)
pub struct InMemoryStateStore {
    runs: tokio::sync::RwLock<HashMap<Uuid, StoredRun>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self {
            runs: tokio::sync::RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, run_id: Uuid) -> Result<Option<PipelineState>> {
        let runs = self.runs.read().await;
        Ok(runs.get(&run_id).map(|run| run.state.clone()))
    }

    async fn save(&self, run_id: Uuid, state: &PipelineState) -> Result<()> {
        let mut runs = self.runs.write().await;
        let now = Utc::now();
        runs.entry(run_id)
            .and_modify(|run| {
                run.state = state.clone();
                run.updated_at = now;
            })
            .or_insert_with(|| StoredRun {
                state: state.clone(),
                context: PipelineContext::new(),
                updated_at: now,
            });
        Ok(())
    }

    async fn load_context(&self, run_id: Uuid) -> Result<PipelineContext> {
        let runs = self.runs.read().await;
        Ok(runs
            .get(&run_id)
            .map(|run| run.context.clone())
            .unwrap_or_default())
    }

    async fn save_context(&self, run_id: Uuid, context: &PipelineContext) -> Result<()> {
        let mut runs = self.runs.write().await;
        let run = runs
            .get_mut(&run_id)
            .with_context(|| format!("Run {} does not exist", run_id))?;
        run.context = context.clone();
        run.updated_at = Utc::now();
        Ok(())
    }

    async fn save_progress(
        &self,
        run_id: Uuid,
        state: &PipelineState,
        context: &PipelineContext,
    ) -> Result<()> {
        let mut runs = self.runs.write().await;
        let run = runs
            .get_mut(&run_id)
            .with_context(|| format!("Run {} does not exist", run_id))?;
        run.state = state.clone();
        run.context = context.clone();
        run.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, run_id: Uuid) -> Result<()> {
        self.runs.write().await.remove(&run_id);
        Ok(())
    }

    async fn list_runs(&self) -> Result<Vec<RunRecord>> {
        let runs = self.runs.read().await;
        let mut records: Vec<RunRecord> = runs
            .iter()
            .map(|(run_id, run)| RunRecord {
                run_id: *run_id,
                state: run.state.clone(),
                updated_at: run.updated_at,
            })
            .collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }
}
