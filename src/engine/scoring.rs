// ==========================================
// Wellbeing Waitlist - Scoring Engine
// ==========================================
// Maps a free-text complaint to an urgency score in [10, 100]
// Tiers: runtime cache, exact phrase, partial phrase, fuzzy phrase,
// pluggable strategy, keyword rules
// ==========================================
// Input: complaint text (untrusted, any length)
// Output: score + which tier produced it
// ==========================================

mod cache;
mod core;
mod matchers;
mod phrase_table;
mod strategy;


pub use self::cache::CachedScore;
pub use self::core::{
    CacheStatistics, ScoreResolution, ScoringEngine, DEFAULT_SIMILARITY_THRESHOLD,
};
pub use self::matchers::{normalize, token_similarity, SCORE_CEILING, SCORE_FLOOR};
pub use self::phrase_table::{PhraseTable, PhraseTableError};
pub use self::strategy::{
    LabelClassifier, LabelWeightedStrategy, StrategyError, UrgencyStrategy, URGENCY_LABELS,
};
