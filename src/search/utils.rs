// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Shared utilities for search modules.
//!
//! The boring-but-essential functions that every search path needs:
//! query parsing and multi-term score merging. Extracted here to avoid
//! four copies of the same logic.

use crate::util::normalize::normalize;
use std::collections::HashMap;

/// Parse a query string into normalized, whitespace-separated terms.
///
/// # Example
///
/// ```ignore
/// let terms = parse_query("Hello World");
/// assert_eq!(terms, vec!["hello", "world"]);
/// ```
pub fn parse_query(query: &str) -> Vec<String> {
    normalize(query)
        .split(' ')
        .filter(|p| !p.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Merge multiple score sets with AND semantics.
///
/// Documents must match ALL terms to be included. Scores are summed across terms,
/// with the maximum score taken when a document matches a term multiple times.
///
/// # Arguments
///
/// * `score_sets` - One `Vec<(doc_id, score)>` per query term
///
/// # Returns
///
/// HashMap of `doc_id -> total_score` for documents matching all terms.
pub fn merge_score_sets(score_sets: &[Vec<(usize, f64)>]) -> HashMap<usize, f64> {
    if score_sets.is_empty() {
        return HashMap::new();
    }

    // Pre-allocate with capacity hint from first term
    let first_set = &score_sets[0];
    let mut doc_scores: HashMap<usize, f64> = HashMap::with_capacity(first_set.len());

    // Initialize with first term's scores (take max per doc)
    for (doc_id, score) in first_set {
        doc_scores
            .entry(*doc_id)
            .and_modify(|s| *s = s.max(*score))
            .or_insert(*score);
    }

    // Reuse a single HashMap for term scores instead of allocating per-term
    let mut term_scores: HashMap<usize, f64> = HashMap::with_capacity(
        score_sets.get(1).map(|s| s.len()).unwrap_or(0),
    );

    // Intersect with remaining terms
    for score_set in &score_sets[1..] {
        term_scores.clear();

        for (doc_id, score) in score_set {
            term_scores
                .entry(*doc_id)
                .and_modify(|s| *s = s.max(*score))
                .or_insert(*score);
        }

        doc_scores.retain(|doc_id, score| {
            if let Some(additional) = term_scores.get(doc_id) {
                *score += additional;
                true
            } else {
                false
            }
        });

        if doc_scores.is_empty() {
            break;
        }
    }

    doc_scores
}
