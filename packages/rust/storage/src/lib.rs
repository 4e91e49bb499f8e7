//! libSQL storage layer for tender documents and cached answers.
//!
//! The [`Storage`] struct wraps a local libSQL database holding the
//! extracted text of each tender (populated by the upstream ingestion
//! pipeline, or by `tenderlens import`) and a cache of LLM answers.
//!
//! **Access rules:**
//! - `ask`/`import`: read-write via [`Storage::open`]
//! - diagnostic tooling: read-only via [`Storage::open_readonly`]

mod migrations;

use std::path::Path;

use chrono::Utc;
use libsql::{Connection, Database, params};
use uuid::Uuid;

use tenderlens_shared::{DocumentSet, Result, TenderLensError};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TenderLensError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| TenderLensError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| TenderLensError::Storage(e.to_string()))?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open a database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| TenderLensError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| TenderLensError::Storage(e.to_string()))?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        TenderLensError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(TenderLensError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tender operations
    // -----------------------------------------------------------------------

    /// Insert or replace a tender's documents from a filename → text map.
    ///
    /// Any cached answers for the tender are invalidated, since they were
    /// produced against the previous document contents.
    pub async fn upsert_tender(&self, tender_id: &str, documents: &DocumentSet) -> Result<()> {
        let value = serde_json::to_value(documents)
            .map_err(|e| TenderLensError::Storage(format!("serialize file_texts: {e}")))?;
        self.upsert_tender_json(tender_id, &value).await?;
        self.invalidate_answers(tender_id).await
    }

    /// Insert or replace a tender's raw `file_texts` JSON value.
    ///
    /// Exists so legacy payload shapes (pre-joined strings) can be stored
    /// verbatim; shape interpretation happens at read time.
    pub async fn upsert_tender_json(
        &self,
        tender_id: &str,
        file_texts: &serde_json::Value,
    ) -> Result<()> {
        self.check_writable()?;
        let json = serde_json::to_string(file_texts)
            .map_err(|e| TenderLensError::Storage(format!("serialize file_texts: {e}")))?;
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO tenders (tender_id, file_texts, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(tender_id) DO UPDATE SET
                   file_texts = excluded.file_texts,
                   updated_at = excluded.updated_at",
                params![tender_id, json.as_str(), now.as_str(), now.as_str()],
            )
            .await
            .map_err(|e| TenderLensError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Fetch a tender's raw `file_texts` JSON value, or `None` if the
    /// tender does not exist. Shape tolerance is the caller's concern
    /// (see `DocumentPayload::from_json`).
    pub async fn get_tender(&self, tender_id: &str) -> Result<Option<serde_json::Value>> {
        let mut rows = self
            .conn
            .query(
                "SELECT file_texts FROM tenders WHERE tender_id = ?1",
                params![tender_id],
            )
            .await
            .map_err(|e| TenderLensError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let json: String = row
                    .get(0)
                    .map_err(|e| TenderLensError::Storage(e.to_string()))?;
                let value = serde_json::from_str(&json).map_err(|e| {
                    TenderLensError::Storage(format!("corrupt file_texts for {tender_id}: {e}"))
                })?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(TenderLensError::Storage(e.to_string())),
        }
    }

    /// List all stored tenders. Returns `Vec<(tender_id, updated_at)>`.
    pub async fn list_tenders(&self) -> Result<Vec<(String, String)>> {
        let mut rows = self
            .conn
            .query(
                "SELECT tender_id, updated_at FROM tenders ORDER BY tender_id",
                params![],
            )
            .await
            .map_err(|e| TenderLensError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push((
                row.get::<String>(0)
                    .map_err(|e| TenderLensError::Storage(e.to_string()))?,
                row.get::<String>(1)
                    .map_err(|e| TenderLensError::Storage(e.to_string()))?,
            ));
        }
        Ok(results)
    }

    /// Delete a tender and (via cascade) its cached answers.
    pub async fn delete_tender(&self, tender_id: &str) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "DELETE FROM tenders WHERE tender_id = ?1",
                params![tender_id],
            )
            .await
            .map_err(|e| TenderLensError::Storage(e.to_string()))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Answer cache operations
    // -----------------------------------------------------------------------

    /// Get a cached answer for a (tender, prompt, model) triple.
    pub async fn get_cached_answer(
        &self,
        tender_id: &str,
        prompt_hash: &str,
        model_id: &str,
    ) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT answer FROM answer_cache
                 WHERE tender_id = ?1 AND prompt_hash = ?2 AND model_id = ?3",
                params![tender_id, prompt_hash, model_id],
            )
            .await
            .map_err(|e| TenderLensError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let answer: String = row
                    .get(0)
                    .map_err(|e| TenderLensError::Storage(e.to_string()))?;
                Ok(Some(answer))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(TenderLensError::Storage(e.to_string())),
        }
    }

    /// Store an answer in the cache (upserts).
    pub async fn set_cached_answer(
        &self,
        tender_id: &str,
        prompt_hash: &str,
        model_id: &str,
        answer: &str,
    ) -> Result<()> {
        self.check_writable()?;
        let id = Uuid::now_v7().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO answer_cache (id, tender_id, prompt_hash, model_id, answer, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(tender_id, prompt_hash, model_id) DO UPDATE SET
                   answer = excluded.answer,
                   created_at = excluded.created_at",
                params![id.as_str(), tender_id, prompt_hash, model_id, answer, now.as_str()],
            )
            .await
            .map_err(|e| TenderLensError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Invalidate all cached answers for a tender.
    pub async fn invalidate_answers(&self, tender_id: &str) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "DELETE FROM answer_cache WHERE tender_id = ?1",
                params![tender_id],
            )
            .await
            .map_err(|e| TenderLensError::Storage(e.to_string()))?;
        Ok(())
    }
}
