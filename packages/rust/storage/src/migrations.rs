//! SQL migration definitions for the tenderlens database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed within a transaction.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: tenders, answer_cache",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Extracted tender documents, one row per tender.
-- file_texts holds the upstream ingestion output as JSON: normally an
-- object of filename -> text, historically sometimes a pre-joined string.
CREATE TABLE IF NOT EXISTS tenders (
    tender_id  TEXT PRIMARY KEY,
    file_texts TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Cached LLM answers, keyed by the full prompt hash and model
CREATE TABLE IF NOT EXISTS answer_cache (
    id          TEXT PRIMARY KEY,
    tender_id   TEXT NOT NULL REFERENCES tenders(tender_id) ON DELETE CASCADE,
    prompt_hash TEXT NOT NULL,
    model_id    TEXT NOT NULL,
    answer      TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE(tender_id, prompt_hash, model_id)
);

CREATE INDEX IF NOT EXISTS idx_answer_cache_tender ON answer_cache(tender_id);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
