//! Section classifier: which criteria categories does a passage belong to?

use tenderlens_shared::Category;

use crate::taxonomy::CATEGORY_KEYWORDS;

/// Minimum trimmed length (chars) for a passage to be classifiable at all.
const MIN_CLASSIFIABLE_CHARS: usize = 10;

/// Identify every category whose keywords occur in `text`.
///
/// Matching is literal case-insensitive substring containment, never fuzzy
/// or partial. Categories are tested independently and the result
/// preserves taxonomy order. Passages under 10 trimmed characters match
/// nothing.
pub fn classify(text: &str) -> Vec<Category> {
    if text.trim().chars().count() < MIN_CLASSIFIABLE_CHARS {
        return Vec::new();
    }

    let text_lower = text.to_lowercase();
    let mut matched = Vec::new();

    for (category, phrases) in &CATEGORY_KEYWORDS {
        if phrases.iter().any(|&p| memo::contains_phrase(&text_lower, p)) {
            matched.push(*category);
        }
    }

    matched
}

mod memo {
    //! Bounded memoization of phrase-containment lookups.
    //!
    //! Lookups are pure and idempotent, so the cache is a plain
    //! optimization: thread-local (no locking), capped per phrase, and
    //! evicted wholesale when full. Dropping it entirely would not change
    //! any result.

    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Cached texts per phrase before the map is cleared.
    const PER_PHRASE_CAPACITY: usize = 128;

    thread_local! {
        static SEEN: RefCell<HashMap<&'static str, HashMap<String, bool>>> =
            RefCell::new(HashMap::new());
    }

    /// Memoized `text_lower.contains(phrase)`.
    pub(super) fn contains_phrase(text_lower: &str, phrase: &'static str) -> bool {
        SEEN.with_borrow_mut(|by_phrase| {
            let per_phrase = by_phrase.entry(phrase).or_default();
            if let Some(&hit) = per_phrase.get(text_lower) {
                return hit;
            }
            let hit = text_lower.contains(phrase);
            if per_phrase.len() >= PER_PHRASE_CAPACITY {
                per_phrase.clear();
            }
            per_phrase.insert(text_lower.to_string(), hit);
            hit
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_matches_nothing() {
        assert!(classify("").is_empty());
        assert!(classify("turnover").is_empty()); // 8 chars
        assert!(classify("   emd   ").is_empty()); // trimmed length 3
    }

    #[test]
    fn single_category_match() {
        let text = "Bidders must submit a completion certificate for similar work.";
        assert_eq!(classify(text), vec![Category::Technical]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let text = "AVERAGE ANNUAL TURNOVER of the last three financial years.";
        assert_eq!(classify(text), vec![Category::Financial]);
    }

    #[test]
    fn categories_are_not_mutually_exclusive() {
        let text = "The joint venture shall furnish earnest money and performance security.";
        let categories = classify(text);
        assert!(categories.contains(&Category::JointVenture));
        assert!(categories.contains(&Category::CommercialClauses));
        assert_eq!(categories.len(), 2);
    }

    #[test]
    fn unmatched_text_returns_empty_not_other() {
        let text = "General instructions on how to fill in the forms provided.";
        assert!(classify(text).is_empty());
    }

    #[test]
    fn repeated_calls_are_stable() {
        let text = "Security deposit shall be recovered from each running bill.";
        let first = classify(text);
        let second = classify(text);
        assert_eq!(first, second);
        assert_eq!(first, vec![Category::CommercialClauses]);
    }
}
