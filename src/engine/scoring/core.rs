// ==========================================
// ScoringEngine - tier resolution
// ==========================================
// Order: cache -> exact -> partial -> fuzzy -> pluggable -> keyword
// Every result clamped to [10, 100]
// Blank complaint -> 10, never cached
// ==========================================

use super::cache::{CachedScore, ScoreCache};
use super::matchers::{
    clamp_score, find_fuzzy, find_partial, keyword_score, normalize, SCORE_FLOOR,
};
use super::phrase_table::PhraseTable;
use super::strategy::UrgencyStrategy;
use crate::domain::types::ScoreSource;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreResolution {
    pub score: i32,
    pub source: ScoreSource,
    pub from_cache: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStatistics {
    pub precomputed_count: usize,
    pub runtime_cache_count: usize,
    pub total_cached_problems: usize,
}

pub struct ScoringEngine {
    table: PhraseTable,
    cache: ScoreCache,
    strategy: Option<Arc<dyn UrgencyStrategy>>,
    similarity_threshold: f64,
}

impl ScoringEngine {
    pub fn new(table: PhraseTable) -> Self {
        Self {
            table,
            cache: ScoreCache::new(),
            strategy: None,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_builtin_table() -> Self {
        Self::new(PhraseTable::builtin())
    }

    /// Thresholds outside (0, 1] are ignored.
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        if threshold > 0.0 && threshold <= 1.0 {
            self.similarity_threshold = threshold;
        } else {
            warn!(threshold, "ignoring out-of-range similarity threshold");
        }
        self
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn UrgencyStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn phrase_table(&self) -> &PhraseTable {
        &self.table
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// Urgency score in [10, 100]. Never fails.
    pub fn score(&self, complaint: &str) -> i32 {
        self.score_detailed(complaint).score
    }

    #[instrument(level = "debug", skip(self))]
    pub fn score_detailed(&self, complaint: &str) -> ScoreResolution {
        let normalized = normalize(complaint);
        if normalized.is_empty() {
            return ScoreResolution {
                score: SCORE_FLOOR,
                source: ScoreSource::Floor,
                from_cache: false,
            };
        }

        if let Some(cached) = self.cache.get(&normalized) {
            return ScoreResolution {
                score: cached.score,
                source: cached.source,
                from_cache: true,
            };
        }

        let computed = self.resolve_uncached(&normalized);
        let stored = self.cache.get_or_insert(normalized, computed);
        ScoreResolution {
            score: stored.score,
            source: stored.source,
            from_cache: false,
        }
    }

    fn resolve_uncached(&self, normalized: &str) -> CachedScore {
        if let Some(score) = self.table.get(normalized) {
            return CachedScore {
                score: clamp_score(score),
                source: ScoreSource::Exact,
            };
        }

        if let Some((phrase, score)) = find_partial(&self.table, normalized) {
            debug!(complaint = normalized, phrase, score, "partial phrase match");
            return CachedScore {
                score: clamp_score(score),
                source: ScoreSource::Partial,
            };
        }

        if let Some(hit) = find_fuzzy(&self.table, normalized, self.similarity_threshold) {
            debug!(
                complaint = normalized,
                phrase = hit.phrase,
                similarity = hit.similarity,
                "fuzzy phrase match"
            );
            return CachedScore {
                score: clamp_score(hit.score),
                source: ScoreSource::Fuzzy,
            };
        }

        if let Some(score) = self.consult_strategy(normalized) {
            return CachedScore {
                score: clamp_score(score),
                source: ScoreSource::Pluggable,
            };
        }

        CachedScore {
            score: keyword_score(normalized),
            source: ScoreSource::Keyword,
        }
    }

    fn consult_strategy(&self, normalized: &str) -> Option<i32> {
        let strategy = self.strategy.as_ref()?;
        match strategy.estimate(normalized) {
            Ok(Some(score)) if score > 0 => Some(score),
            Ok(_) => None,
            Err(e) => {
                warn!(strategy = strategy.name(), error = %e, "scoring strategy failed, falling back to keyword rules");
                None
            }
        }
    }

    /// Pre-populate the runtime cache. Returns false when the complaint is
    /// blank or already cached; an existing entry is never replaced.
    pub fn seed(&self, complaint: &str, score: i32) -> bool {
        let normalized = normalize(complaint);
        if normalized.is_empty() {
            return false;
        }
        self.cache.insert_if_absent(
            normalized,
            CachedScore {
                score: clamp_score(score),
                source: ScoreSource::Seeded,
            },
        )
    }

    pub fn cached(&self, complaint: &str) -> Option<CachedScore> {
        self.cache.get(&normalize(complaint))
    }

    pub fn cache_statistics(&self) -> CacheStatistics {
        let precomputed_count = self.table.len();
        let runtime_cache_count = self.cache.len();
        CacheStatistics {
            precomputed_count,
            runtime_cache_count,
            total_cached_problems: precomputed_count + runtime_cache_count,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::with_builtin_table()
    }
}
