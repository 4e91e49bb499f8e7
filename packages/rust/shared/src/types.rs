//! Core domain types for tenderlens document analysis.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Procurement criteria category a text section can belong to.
///
/// Membership is not mutually exclusive; a section may match several
/// categories at once. Sections matching none are filed under [`Category::Other`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Technical,
    Financial,
    JointVenture,
    CommercialClauses,
    Other,
}

impl Category {
    /// The categories the combiner draws relevant chunks from, in its
    /// fixed selection order (`Other` is deliberately excluded).
    pub const SELECTABLE: [Category; 4] = [
        Category::Technical,
        Category::Financial,
        Category::JointVenture,
        Category::CommercialClauses,
    ];

    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Financial => "financial",
            Self::JointVenture => "joint_venture",
            Self::CommercialClauses => "commercial_clauses",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DocumentSet / DocumentPayload
// ---------------------------------------------------------------------------

/// The extracted text files of one tender: filename → raw text.
///
/// A `BTreeMap` keeps iteration order stable within a request, which the
/// combiner's largest-file fallback relies on for determinism.
pub type DocumentSet = BTreeMap<String, String>;

/// The two shapes a stored `file_texts` value can take.
///
/// Older ingestion runs stored a single pre-joined string instead of a
/// per-file mapping; both shapes are tolerated at the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentPayload {
    /// Per-file mapping of filename → extracted text.
    Files(DocumentSet),
    /// Already-combined text, passed through the combiner unchanged.
    Combined(String),
}

impl DocumentPayload {
    /// Parse a raw stored JSON value into a payload.
    ///
    /// A JSON object of strings becomes [`DocumentPayload::Files`]
    /// (non-string members are skipped with a warning), a JSON string
    /// becomes [`DocumentPayload::Combined`], and anything else degrades
    /// to an empty file set with a warning rather than failing the request.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => {
                let mut files = DocumentSet::new();
                for (name, text) in map {
                    match text.as_str() {
                        Some(s) => {
                            files.insert(name.clone(), s.to_string());
                        }
                        None => {
                            tracing::warn!(file = %name, "skipping non-string file_texts entry");
                        }
                    }
                }
                Self::Files(files)
            }
            serde_json::Value::String(s) => Self::Combined(s.clone()),
            serde_json::Value::Null => Self::Files(DocumentSet::new()),
            other => {
                tracing::warn!(
                    value_type = %json_type_name(other),
                    "file_texts has unexpected shape, treating as empty"
                );
                Self::Files(DocumentSet::new())
            }
        }
    }

    /// True when there is no usable text at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Files(files) => files.values().all(|t| t.trim().is_empty()),
            Self::Combined(text) => text.trim().is_empty(),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Chunk / CriteriaSection
// ---------------------------------------------------------------------------

/// A classified paragraph-level fragment with adjacent-paragraph context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// The trimmed paragraph itself.
    pub text: String,
    /// Previous paragraph + paragraph + next paragraph, blank-line joined.
    pub context: String,
    /// Filename the paragraph came from.
    pub source: String,
    /// Every category the paragraph matched (empty before filing under `other`).
    pub categories: Vec<Category>,
}

/// A contextual excerpt extracted for one specific procurement criterion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriteriaSection {
    /// The extracted window, expanded to sentence/paragraph boundaries.
    pub text: String,
    /// Filename the excerpt came from.
    pub source: String,
    /// The search term that matched.
    pub keyword: String,
    /// Criteria type key (e.g. `emd_submission`).
    pub criteria_type: String,
}

// ---------------------------------------------------------------------------
// ChunkingResult
// ---------------------------------------------------------------------------

/// Overall status of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Completed,
    NoFilesProvided,
}

/// Counters and provenance for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingMetadata {
    pub total_files: usize,
    pub total_text_length: usize,
    pub total_chunks: usize,
    pub total_criteria_sections: usize,
    pub categories_found: Vec<Category>,
    pub criteria_types_found: Vec<String>,
    pub processed_at: DateTime<Utc>,
    pub processing_status: ProcessingStatus,
}

/// Everything the relevance pipeline produced for one document set.
///
/// Request-scoped and transient, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingResult {
    /// Chunks grouped by matched category; empty categories are absent.
    pub categorized_chunks: BTreeMap<Category, Vec<Chunk>>,
    /// Criteria excerpts grouped by criteria type; empty types are absent.
    pub specific_criteria: BTreeMap<String, Vec<CriteriaSection>>,
    pub metadata: ChunkingMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&Category::JointVenture).expect("serialize");
        assert_eq!(json, r#""joint_venture""#);
        let parsed: Category = serde_json::from_str(r#""commercial_clauses""#).expect("parse");
        assert_eq!(parsed, Category::CommercialClauses);
    }

    #[test]
    fn category_as_str_matches_serde() {
        for cat in [
            Category::Technical,
            Category::Financial,
            Category::JointVenture,
            Category::CommercialClauses,
            Category::Other,
        ] {
            let json = serde_json::to_string(&cat).expect("serialize");
            assert_eq!(json, format!("\"{}\"", cat.as_str()));
        }
    }

    #[test]
    fn selectable_excludes_other() {
        assert!(!Category::SELECTABLE.contains(&Category::Other));
        assert_eq!(Category::SELECTABLE[0], Category::Technical);
    }

    #[test]
    fn payload_from_object() {
        let value = serde_json::json!({
            "notice.txt": "Invitation for bids.",
            "boq.txt": "Bill of quantities.",
        });
        let payload = DocumentPayload::from_json(&value);
        match payload {
            DocumentPayload::Files(files) => {
                assert_eq!(files.len(), 2);
                assert_eq!(files["notice.txt"], "Invitation for bids.");
            }
            _ => panic!("expected Files"),
        }
    }

    #[test]
    fn payload_from_string() {
        let value = serde_json::json!("already combined text");
        let payload = DocumentPayload::from_json(&value);
        assert_eq!(
            payload,
            DocumentPayload::Combined("already combined text".into())
        );
    }

    #[test]
    fn payload_skips_non_string_entries() {
        let value = serde_json::json!({
            "good.txt": "text",
            "bad.txt": 42,
        });
        match DocumentPayload::from_json(&value) {
            DocumentPayload::Files(files) => {
                assert_eq!(files.len(), 1);
                assert!(files.contains_key("good.txt"));
            }
            _ => panic!("expected Files"),
        }
    }

    #[test]
    fn payload_malformed_degrades_to_empty() {
        for value in [serde_json::json!(7), serde_json::json!([1, 2]), serde_json::Value::Null] {
            let payload = DocumentPayload::from_json(&value);
            assert!(payload.is_empty(), "value {value} should parse as empty");
        }
    }

    #[test]
    fn payload_emptiness() {
        let mut files = DocumentSet::new();
        files.insert("a.txt".into(), "   \n  ".into());
        assert!(DocumentPayload::Files(files).is_empty());
        assert!(DocumentPayload::Combined("  ".into()).is_empty());
        assert!(!DocumentPayload::Combined("text".into()).is_empty());
    }

    #[test]
    fn chunking_result_roundtrip() {
        let mut categorized = BTreeMap::new();
        categorized.insert(
            Category::Financial,
            vec![Chunk {
                text: "Average annual turnover shall not be less than 10 crore.".into(),
                context: "Preamble.\n\nAverage annual turnover shall not be less than 10 crore.".into(),
                source: "nit.txt".into(),
                categories: vec![Category::Financial],
            }],
        );
        let result = ChunkingResult {
            categorized_chunks: categorized,
            specific_criteria: BTreeMap::new(),
            metadata: ChunkingMetadata {
                total_files: 1,
                total_text_length: 120,
                total_chunks: 1,
                total_criteria_sections: 0,
                categories_found: vec![Category::Financial],
                criteria_types_found: vec![],
                processed_at: Utc::now(),
                processing_status: ProcessingStatus::Completed,
            },
        };

        let json = serde_json::to_string_pretty(&result).expect("serialize");
        assert!(json.contains(r#""processing_status": "completed""#));
        let parsed: ChunkingResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.metadata.total_chunks, 1);
        assert!(parsed.categorized_chunks.contains_key(&Category::Financial));
    }
}
