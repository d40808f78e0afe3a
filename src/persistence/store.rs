//! SQLite-based run state store

use crate::core::{PipelineContext, PipelineState};
use crate::persistence::{RunRecord, StateStore};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// SQLite run state store
pub struct SqliteStateStore {
    pool: SqlitePool,
}

impl SqliteStateStore {
    /// Open (and create if needed) a store at `db_path`
    pub async fn new(db_path: &Path) -> Result<Self> {
        if let Some(dir) = db_path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init().await?;

        Ok(store)
    }

    /// Store living only as long as the process
    pub async fn in_memory() -> Result<Self> {
        // Every connection to :memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await
            .context("Failed to open in-memory database")?;

        let store = Self { pool };
        store.init().await?;

        Ok(store)
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pipeline_runs (
                run_id TEXT PRIMARY KEY,
                pipeline_id TEXT NOT NULL,
                sequence INTEGER NOT NULL,
                context TEXT NOT NULL DEFAULT '{}',
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_pipeline_id ON pipeline_runs(pipeline_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Convert DateTime<Utc> to NaiveDateTime for SQLite
    fn to_naive(dt: DateTime<Utc>) -> NaiveDateTime {
        dt.naive_utc()
    }

    /// Convert NaiveDateTime to DateTime<Utc>
    fn from_naive(dt: NaiveDateTime) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(dt, Utc)
    }
}

#[async_trait::async_trait]
impl StateStore for SqliteStateStore {
    async fn load(&self, run_id: Uuid) -> Result<Option<PipelineState>> {
        let row = sqlx::query("SELECT pipeline_id, sequence FROM pipeline_runs WHERE run_id = ?1")
            .bind(run_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load run state")?;

        Ok(row.map(|row| {
            PipelineState::new(
                row.get::<String, _>("pipeline_id"),
                row.get::<i64, _>("sequence") as usize,
            )
        }))
    }

    async fn save(&self, run_id: Uuid, state: &PipelineState) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pipeline_runs (run_id, pipeline_id, sequence, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(run_id) DO UPDATE SET
                pipeline_id = excluded.pipeline_id,
                sequence = excluded.sequence,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(run_id.to_string())
        .bind(state.pipeline_id())
        .bind(state.sequence() as i64)
        .bind(Self::to_naive(Utc::now()))
        .execute(&self.pool)
        .await
        .context("Failed to save run state")?;

        Ok(())
    }

    async fn load_context(&self, run_id: Uuid) -> Result<PipelineContext> {
        let row = sqlx::query("SELECT context FROM pipeline_runs WHERE run_id = ?1")
            .bind(run_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load run context")?;

        match row {
            Some(row) => {
                let json: String = row.get("context");
                serde_json::from_str(&json).context("Stored run context is not valid JSON")
            }
            None => Ok(PipelineContext::new()),
        }
    }

    async fn save_context(&self, run_id: Uuid, context: &PipelineContext) -> Result<()> {
        let result = sqlx::query(
            "UPDATE pipeline_runs SET context = ?1, updated_at = ?2 WHERE run_id = ?3",
        )
        .bind(serde_json::to_string(context)?)
        .bind(Self::to_naive(Utc::now()))
        .bind(run_id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to save run context")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("Run {} does not exist", run_id);
        }
        Ok(())
    }

    async fn save_progress(
        &self,
        run_id: Uuid,
        state: &PipelineState,
        context: &PipelineContext,
    ) -> Result<()> {
        // One statement, so state and context change together
        let result = sqlx::query(
            r#"
            UPDATE pipeline_runs
            SET pipeline_id = ?1, sequence = ?2, context = ?3, updated_at = ?4
            WHERE run_id = ?5
            "#,
        )
        .bind(state.pipeline_id())
        .bind(state.sequence() as i64)
        .bind(serde_json::to_string(context)?)
        .bind(Self::to_naive(Utc::now()))
        .bind(run_id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to save run progress")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("Run {} does not exist", run_id);
        }
        Ok(())
    }

    async fn delete(&self, run_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM pipeline_runs WHERE run_id = ?1")
            .bind(run_id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete run")?;

        Ok(())
    }

    async fn list_runs(&self) -> Result<Vec<RunRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT run_id, pipeline_id, sequence, updated_at
            FROM pipeline_runs
            ORDER BY updated_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list runs")?;

        rows.iter()
            .map(|row| {
                Ok(RunRecord {
                    run_id: Uuid::parse_str(&row.get::<String, _>("run_id"))?,
                    state: PipelineState::new(
                        row.get::<String, _>("pipeline_id"),
                        row.get::<i64, _>("sequence") as usize,
                    ),
                    updated_at: Self::from_naive(row.get("updated_at")),
                })
            })
            .collect()
    }
}
