//! Specific-criteria extraction: scan all documents for a fixed list of
//! procurement sub-criteria and pull out contextual excerpts.

use std::collections::{BTreeMap, HashSet};

use tenderlens_shared::{CriteriaSection, DocumentSet};

use crate::context::extract_with_context;
use crate::taxonomy::CRITERIA_SPECS;

/// Documents need strictly more trimmed chars than this to be scanned.
pub const MIN_CRITERIA_DOC_CHARS: usize = 100;

/// Extractions with this many trimmed chars or fewer are discarded.
const MIN_SECTION_CHARS: usize = 20;

/// Chars of the section text used as the deduplication key.
const DEDUP_PREFIX_CHARS: usize = 100;

/// Extract excerpts for every specific criterion found in `documents`.
///
/// Criteria types are processed in their fixed order; types with no
/// surviving sections are absent from the result. Within a type, sections
/// are deduplicated by the lowercase trimmed first 100 characters of their
/// text, first seen wins.
pub fn extract_criteria(
    documents: &DocumentSet,
    context_size: usize,
) -> BTreeMap<String, Vec<CriteriaSection>> {
    if documents.is_empty() {
        return BTreeMap::new();
    }

    // Lowercase each valid document once; every term test reuses these.
    let valid: Vec<(&str, &str, String)> = documents
        .iter()
        .filter(|(_, text)| text.trim().chars().count() > MIN_CRITERIA_DOC_CHARS)
        .map(|(name, text)| (name.as_str(), text.as_str(), text.to_lowercase()))
        .collect();

    if valid.is_empty() {
        return BTreeMap::new();
    }

    let combined_lower: String = valid
        .iter()
        .map(|(_, _, lower)| lower.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let mut results = BTreeMap::new();

    for spec in &CRITERIA_SPECS {
        // Cheap pre-check: skip the whole criterion if no term occurs anywhere.
        if !spec.terms.iter().any(|term| combined_lower.contains(term)) {
            continue;
        }

        let sections = extract_sections(spec.key, spec.terms, &valid, context_size);
        if !sections.is_empty() {
            tracing::debug!(
                criteria_type = spec.key,
                sections = sections.len(),
                "criteria sections extracted"
            );
            results.insert(spec.key.to_string(), sections);
        }
    }

    results
}

/// Scan every document for every term of one criterion.
fn extract_sections(
    criteria_type: &str,
    terms: &[&str],
    documents: &[(&str, &str, String)],
    context_size: usize,
) -> Vec<CriteriaSection> {
    let mut sections = Vec::new();
    let mut processed_terms: HashSet<String> = HashSet::new();
    let mut seen_prefixes: HashSet<String> = HashSet::new();

    for term in terms {
        // Term lists may repeat a phrase; process each spelling once.
        if !processed_terms.insert(term.to_lowercase()) {
            continue;
        }

        for (filename, text, text_lower) in documents {
            if !text_lower.contains(term) {
                continue;
            }

            let extracted = extract_with_context(text, term, context_size);
            if extracted.trim().chars().count() <= MIN_SECTION_CHARS {
                continue;
            }

            let prefix: String = extracted
                .chars()
                .take(DEDUP_PREFIX_CHARS)
                .collect::<String>()
                .to_lowercase()
                .trim()
                .to_string();
            if !seen_prefixes.insert(prefix) {
                continue;
            }

            sections.push(CriteriaSection {
                text: extracted,
                source: (*filename).to_string(),
                keyword: (*term).to_string(),
                criteria_type: criteria_type.to_string(),
            });
        }
    }

    sections
}
