// ==========================================
// Precomputed complaint phrase table
// ==========================================
// Source: JSON object {"phrase": score} or two-column CSV,
// picked by file extension. Built-in table when unavailable.
// Frozen after construction.
// ==========================================

use super::matchers::normalize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhraseTableError {
    #[error("cannot read phrase table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON phrase table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV phrase table: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid phrase table entry '{phrase}': {reason}")]
    InvalidEntry { phrase: String, reason: String },

    #[error("unsupported phrase table format: {0}")]
    UnsupportedFormat(String),
}

/// Minimal canonical table spanning critical, urgent, moderate and routine bands.
const BUILTIN_PHRASES: &[(&str, i32)] = &[
    // critical
    ("heart attack", 98),
    ("cardiac arrest", 98),
    ("stroke", 95),
    ("severe bleeding", 95),
    ("unconscious", 95),
    ("not breathing", 98),
    ("severe chest pain", 90),
    ("severe burns", 90),
    // urgent
    ("chest pain", 80),
    ("difficulty breathing", 85),
    ("severe pain", 75),
    ("high fever", 70),
    ("broken bone", 75),
    ("severe headache", 75),
    ("allergic reaction", 80),
    // moderate
    ("fever", 50),
    ("headache", 45),
    ("nausea", 40),
    ("vomiting", 45),
    ("cough", 35),
    ("sore throat", 30),
    // routine
    ("cold", 20),
    ("minor cut", 15),
    ("routine checkup", 10),
    ("vaccination", 10),
];

#[derive(Debug, Clone)]
pub struct PhraseTable {
    index: HashMap<String, i32>,
    /// Longest phrase first, ties lexicographic. Partial and fuzzy
    /// matching iterate in this order.
    scan_order: Vec<(String, i32)>,
}

impl PhraseTable {
    /// Build from raw entries. Phrases are normalized; a repeated
    /// normalized phrase keeps its first score. Scores must lie in 1..=100.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, PhraseTableError>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        let mut index = HashMap::new();
        for (raw, score) in entries {
            let phrase = normalize(raw.as_ref());
            if phrase.is_empty() {
                return Err(PhraseTableError::InvalidEntry {
                    phrase: raw.as_ref().to_string(),
                    reason: "blank phrase".to_string(),
                });
            }
            if !(1..=100).contains(&score) {
                return Err(PhraseTableError::InvalidEntry {
                    phrase,
                    reason: format!("score {} outside 1..=100", score),
                });
            }
            if index.contains_key(&phrase) {
                tracing::debug!(phrase = %phrase, "duplicate phrase after normalization, keeping first");
                continue;
            }
            index.insert(phrase, score as i32);
        }

        let mut scan_order: Vec<(String, i32)> =
            index.iter().map(|(k, v)| (k.clone(), *v)).collect();
        scan_order.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Ok(Self { index, scan_order })
    }

    pub fn builtin() -> Self {
        let mut index = HashMap::with_capacity(BUILTIN_PHRASES.len());
        for (phrase, score) in BUILTIN_PHRASES {
            index.insert((*phrase).to_string(), *score);
        }
        let mut scan_order: Vec<(String, i32)> =
            index.iter().map(|(k, v)| (k.clone(), *v)).collect();
        scan_order.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { index, scan_order }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, PhraseTableError> {
        let map: HashMap<String, i64> = serde_json::from_str(raw)?;
        Self::from_entries(map)
    }

    /// Rows of `phrase,score`. A first row whose score column is not a
    /// number is treated as a header.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, PhraseTableError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        for (row_no, record) in rdr.records().enumerate() {
            let record = record?;
            let phrase = record.get(0).unwrap_or_default().to_string();
            let raw_score = record.get(1).unwrap_or_default();
            match raw_score.parse::<i64>() {
                Ok(score) => entries.push((phrase, score)),
                Err(_) if row_no == 0 => continue,
                Err(_) => {
                    return Err(PhraseTableError::InvalidEntry {
                        phrase,
                        reason: format!("score '{}' is not an integer", raw_score),
                    })
                }
            }
        }
        Self::from_entries(entries)
    }

    pub fn from_path(path: &Path) -> Result<Self, PhraseTableError> {
        let io_err = |source| PhraseTableError::Io {
            path: path.to_path_buf(),
            source,
        };
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "json" => {
                let raw = std::fs::read_to_string(path).map_err(io_err)?;
                Self::from_json_str(&raw)
            }
            "csv" => {
                let file = File::open(path).map_err(io_err)?;
                Self::from_csv_reader(file)
            }
            other => Err(PhraseTableError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Load `path` if given, otherwise (or on any failure) the built-in table.
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::info!("no phrase table configured, using built-in table");
            return Self::builtin();
        };

        match Self::from_path(path) {
            Ok(table) => {
                tracing::info!(path = %path.display(), count = table.len(), "loaded precomputed phrase table");
                table
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "phrase table unavailable, using built-in table");
                Self::builtin()
            }
        }
    }

    pub fn get(&self, normalized: &str) -> Option<i32> {
        self.index.get(normalized).copied()
    }

    pub fn scan_order(&self) -> impl Iterator<Item = (&str, i32)> {
        self.scan_order.iter().map(|(p, s)| (p.as_str(), *s))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
