//! Document relevance selection for tender Q&A.
//!
//! Given a tender's extracted text files, this crate finds the passages
//! most likely to answer qualification, financial, and legal questions:
//! - [`classifier`] — coarse category classification via keyword taxonomy
//! - [`context`] — keyword-anchored excerpt extraction
//! - [`chunker`] — paragraph chunking with neighbor context
//! - [`criteria`] — excerpts for specific procurement sub-criteria
//! - [`combiner`] — assembly of the final LLM context blob
//!
//! Everything here is pure, synchronous string processing; no I/O.

pub mod chunker;
pub mod classifier;
pub mod combiner;
pub mod context;
pub mod criteria;
pub mod taxonomy;

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::instrument;

use tenderlens_shared::{ChunkingMetadata, ChunkingResult, DocumentSet, ProcessingStatus};

pub use combiner::combine;

/// Run the full relevance pipeline over a document set.
///
/// Produces categorized paragraph chunks, specific-criteria excerpts, and
/// the run metadata in one transient, request-scoped result.
#[instrument(skip_all, fields(files = documents.len()))]
pub fn analyze(documents: &DocumentSet, context_size: usize) -> ChunkingResult {
    if documents.is_empty() {
        return ChunkingResult {
            categorized_chunks: BTreeMap::new(),
            specific_criteria: BTreeMap::new(),
            metadata: ChunkingMetadata {
                total_files: 0,
                total_text_length: 0,
                total_chunks: 0,
                total_criteria_sections: 0,
                categories_found: Vec::new(),
                criteria_types_found: Vec::new(),
                processed_at: Utc::now(),
                processing_status: ProcessingStatus::NoFilesProvided,
            },
        };
    }

    let total_text_length = documents.values().map(|text| text.chars().count()).sum();

    let categorized_chunks = chunker::chunk_documents(documents);
    let specific_criteria = criteria::extract_criteria(documents, context_size);

    let total_chunks = categorized_chunks.values().map(Vec::len).sum();
    let total_criteria_sections = specific_criteria.values().map(Vec::len).sum();

    let categories_found = categorized_chunks.keys().copied().collect();
    // Report criteria in their canonical processing order.
    let criteria_types_found = taxonomy::CRITERIA_SPECS
        .iter()
        .filter(|spec| specific_criteria.contains_key(spec.key))
        .map(|spec| spec.key.to_string())
        .collect();

    tracing::debug!(total_chunks, total_criteria_sections, "analysis complete");

    ChunkingResult {
        categorized_chunks,
        specific_criteria,
        metadata: ChunkingMetadata {
            total_files: documents.len(),
            total_text_length,
            total_chunks,
            total_criteria_sections,
            categories_found,
            criteria_types_found,
            processed_at: Utc::now(),
            processing_status: ProcessingStatus::Completed,
        },
    }
}
