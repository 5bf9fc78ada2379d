// ==========================================
// Wellbeing Waitlist - Domain Types
// ==========================================
// Closed enums shared by every layer
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// Category
// ==========================================
// Stored and serialized as "Male" / "Female" / "Other"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Male,
    Female,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Male => "Male",
            Category::Female => "Female",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Exact, case-sensitive match on the stored spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Category::Male),
            "Female" => Ok(Category::Female),
            "Other" => Ok(Category::Other),
            other => Err(format!(
                "unknown category '{}', expected Male, Female or Other",
                other
            )),
        }
    }
}

// ==========================================
// ScoreSource - which scoring tier produced a score
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Exact,     // precomputed phrase, exact hit
    Partial,   // substring match against a known phrase
    Fuzzy,     // token-set similarity above threshold
    Pluggable, // registered in-process strategy
    Keyword,   // additive keyword rules
    Seeded,    // pre-populated through ScoringEngine::seed
    Floor,     // blank complaint
}

impl ScoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreSource::Exact => "exact",
            ScoreSource::Partial => "partial",
            ScoreSource::Fuzzy => "fuzzy",
            ScoreSource::Pluggable => "pluggable",
            ScoreSource::Keyword => "keyword",
            ScoreSource::Seeded => "seeded",
            ScoreSource::Floor => "floor",
        }
    }
}

impl fmt::Display for ScoreSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_str() {
        for c in [Category::Male, Category::Female, Category::Other] {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
    }

    #[test]
    fn test_category_rejects_unknown_and_lowercase() {
        assert!("male".parse::<Category>().is_err());
        assert!("Unknown".parse::<Category>().is_err());
    }

    #[test]
    fn test_score_source_serializes_snake_case() {
        let json = serde_json::to_string(&ScoreSource::Pluggable).unwrap();
        assert_eq!(json, "\"pluggable\"");
    }
}
