// ==========================================
// Runtime score cache
// ==========================================
// normalized complaint -> (score, source)
// First writer wins; entries are never evicted or overwritten.
// ==========================================

use crate::domain::types::ScoreSource;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CachedScore {
    pub score: i32,
    pub source: ScoreSource,
}

#[derive(Debug, Default)]
pub struct ScoreCache {
    entries: RwLock<HashMap<String, CachedScore>>,
}

impl ScoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, normalized: &str) -> Option<CachedScore> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(normalized)
            .copied()
    }

    /// Insert if absent and return whatever is stored afterwards, so racing
    /// callers for the same key all observe the first committed value.
    pub fn get_or_insert(&self, normalized: String, value: CachedScore) -> CachedScore {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        *entries.entry(normalized).or_insert(value)
    }

    /// True if the entry was newly inserted.
    pub fn insert_if_absent(&self, normalized: String, value: CachedScore) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&normalized) {
            return false;
        }
        entries.insert(normalized, value);
        true
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
