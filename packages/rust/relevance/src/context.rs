//! Keyword context extraction: locate a phrase and widen the excerpt to
//! readable sentence/paragraph boundaries.

/// Markers that end a sentence or paragraph. All two bytes, all ASCII.
const BOUNDARY_MARKERS: [&str; 3] = [". ", ".\n", "\n\n"];

/// Extract the first occurrence of `keyword` from `text` with surrounding
/// context.
///
/// A raw window of `context_size` characters is taken on each side of the
/// match, then widened outward to the nearest sentence/paragraph boundary
/// (or the document edge when none exists). Matching is ASCII
/// case-insensitive; only the first occurrence is considered. Returns an
/// empty string when the keyword is absent.
pub fn extract_with_context(text: &str, keyword: &str, context_size: usize) -> String {
    if text.is_empty() || keyword.is_empty() {
        return String::new();
    }

    let Some(keyword_pos) = find_ignore_ascii_case(text, keyword) else {
        return String::new();
    };

    let window_start = back_n_chars(text, keyword_pos, context_size);
    let window_end = fwd_n_chars(text, keyword_pos + keyword.len(), context_size);

    let start = expand_backward(text, window_start);
    let end = expand_forward(text, window_end);

    text[start..end].trim().to_string()
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`.
///
/// The keyword vocabulary is ASCII, so a byte-window comparison is exact
/// and the returned offset is always a char boundary in `haystack`.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    h.windows(n.len()).position(|w| w.eq_ignore_ascii_case(n))
}

/// Walk backward `n` chars from byte offset `pos`, stopping at the start.
fn back_n_chars(text: &str, pos: usize, n: usize) -> usize {
    let mut idx = pos;
    for _ in 0..n {
        match text[..idx].chars().next_back() {
            Some(c) => idx -= c.len_utf8(),
            None => break,
        }
    }
    idx
}

/// Walk forward `n` chars from byte offset `pos`, stopping at the end.
fn fwd_n_chars(text: &str, pos: usize, n: usize) -> usize {
    let mut idx = pos;
    let mut chars = text[pos..].chars();
    for _ in 0..n {
        match chars.next() {
            Some(c) => idx += c.len_utf8(),
            None => break,
        }
    }
    idx
}

/// Most recent boundary before `pos`, positioned just after the marker;
/// document start when no marker precedes the window.
fn expand_backward(text: &str, pos: usize) -> usize {
    if pos == 0 {
        return 0;
    }
    BOUNDARY_MARKERS
        .iter()
        .filter_map(|marker| text[..pos].rfind(marker))
        .max()
        .map(|boundary| boundary + 2)
        .unwrap_or(0)
}

/// Nearest boundary at or after `pos`, positioned just past the sentence
/// period (or first blank-line newline); document end when none follows.
fn expand_forward(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    BOUNDARY_MARKERS
        .iter()
        .filter_map(|marker| text[pos..].find(marker).map(|i| pos + i))
        .min()
        .map(|boundary| boundary + 1)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Clause 1 covers general obligations. \
Bidders shall note that the earnest money deposit shall be two percent of the estimated cost. \
Clause 3 describes the schedule of rates and payment milestones.";

    #[test]
    fn absent_keyword_returns_empty() {
        assert_eq!(extract_with_context(DOC, "liquidated damages", 100), "");
        assert_eq!(extract_with_context("", "emd", 100), "");
        assert_eq!(extract_with_context(DOC, "", 100), "");
    }

    #[test]
    fn extraction_contains_keyword_and_respects_boundaries() {
        let section = extract_with_context(DOC, "earnest money deposit", 20);
        assert!(section.contains("earnest money deposit"));
        // Widened back to the sentence start, not into the previous clause.
        assert!(section.starts_with("Bidders shall note"));
        // Forward expansion stops just past the sentence period.
        assert!(section.ends_with("estimated cost."));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let section = extract_with_context(DOC, "EARNEST MONEY DEPOSIT", 20);
        assert!(section.contains("earnest money deposit"));
    }

    #[test]
    fn extraction_is_idempotent() {
        let first = extract_with_context(DOC, "schedule of rates", 50);
        let second = extract_with_context(DOC, "schedule of rates", 50);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn no_boundaries_falls_back_to_document_edges() {
        let text = "plain words with an emd mention and no sentence markers at all";
        let section = extract_with_context(text, "emd", 5);
        assert_eq!(section, text);
    }

    #[test]
    fn only_first_occurrence_is_used() {
        let text = "First: the emd is due Monday.\n\nSecond: the emd is refundable later on.";
        let section = extract_with_context(text, "emd", 4);
        assert!(section.contains("due Monday"));
        assert!(!section.contains("refundable"));
    }

    #[test]
    fn paragraph_break_is_a_boundary() {
        let text = "Intro paragraph text.\n\nThe security deposit is withheld from bills.\n\nClosing paragraph.";
        let section = extract_with_context(text, "security deposit", 5);
        assert!(section.starts_with("The security deposit"));
        assert!(!section.contains("Intro paragraph"));
        assert!(!section.contains("Closing paragraph"));
    }

    #[test]
    fn window_is_measured_in_chars() {
        // Multi-byte chars before the keyword must not panic or mis-slice.
        let text = "préambule: détails généraux. The emd clause follows here. Fin.";
        let section = extract_with_context(text, "emd", 10);
        assert!(section.contains("emd"));
    }
}
