// ==========================================
// Scoring tiers as pure functions
// ==========================================
// Inputs are already normalized. No caching, no I/O.
// ==========================================

use super::phrase_table::PhraseTable;
use std::collections::HashSet;

pub const SCORE_FLOOR: i32 = 10;
pub const SCORE_CEILING: i32 = 100;

/// Lower-case + trim.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn clamp_score(score: i32) -> i32 {
    score.clamp(SCORE_FLOOR, SCORE_CEILING)
}

/// First known phrase (in scan order) that the input contains, or that contains the input.
pub fn find_partial<'t>(table: &'t PhraseTable, normalized: &str) -> Option<(&'t str, i32)> {
    table
        .scan_order()
        .find(|(phrase, _)| normalized.contains(phrase) || phrase.contains(normalized))
}

/// Jaccard similarity of whitespace token sets.
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();

    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    intersection as f64 / union as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch<'t> {
    pub phrase: &'t str,
    pub score: i32,
    pub similarity: f64,
}

/// Highest similarity at or above `threshold`; an equal similarity later
/// in scan order does not replace the earlier one.
pub fn find_fuzzy<'t>(table: &'t PhraseTable, normalized: &str, threshold: f64) -> Option<FuzzyMatch<'t>> {
    let mut best: Option<FuzzyMatch<'t>> = None;
    for (phrase, score) in table.scan_order() {
        let similarity = token_similarity(normalized, phrase);
        if similarity < threshold {
            continue;
        }
        let better = match &best {
            Some(current) => similarity > current.similarity,
            None => true,
        };
        if better {
            best = Some(FuzzyMatch {
                phrase,
                score,
                similarity,
            });
        }
    }
    best
}

const SEVERITY_WORDS: &[&str] = &["severe", "acute", "intense", "critical"];
const BLEEDING_WORDS: &[&str] = &["bleeding", "blood"];
const BREATHING_WORDS: &[&str] = &["breathing", "breath"];
const CARDIAC_WORDS: &[&str] = &["chest", "heart"];
const EMERGENCY_WORDS: &[&str] = &["emergency", "urgent"];
const MITIGATING_WORDS: &[&str] = &["mild", "minor", "routine", "checkup"];

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Additive substring rules starting from 20, clamped to [10, 100].
pub fn keyword_score(normalized: &str) -> i32 {
    let mut score = 20;

    if contains_any(normalized, SEVERITY_WORDS) {
        score += 30;
    }
    if normalized.contains("pain") {
        score += 20;
    }
    if contains_any(normalized, BLEEDING_WORDS) {
        score += 25;
    }
    if contains_any(normalized, BREATHING_WORDS) {
        score += 35;
    }
    if contains_any(normalized, CARDIAC_WORDS) {
        score += 30;
    }
    if contains_any(normalized, EMERGENCY_WORDS) {
        score += 25;
    }
    if contains_any(normalized, MITIGATING_WORDS) {
        score -= 15;
    }

    clamp_score(score)
}
