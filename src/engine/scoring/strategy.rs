// ==========================================
// Pluggable in-process scoring strategies
// ==========================================
// Consulted after the phrase-table tiers and before keyword rules.
// A strategy may decline (Ok(None)) or fail (Err); both fall through.
// ==========================================

use std::error::Error;

pub type StrategyError = Box<dyn Error + Send + Sync>;

/// Scoring hook plugged into the engine.
pub trait UrgencyStrategy: Send + Sync {
    fn name(&self) -> &str {
        "pluggable"
    }

    /// Estimate for an already-normalized complaint. Non-positive values
    /// are treated as "no opinion".
    fn estimate(&self, complaint: &str) -> Result<Option<i32>, StrategyError>;
}

impl<F> UrgencyStrategy for F
where
    F: Fn(&str) -> Option<i32> + Send + Sync,
{
    fn estimate(&self, complaint: &str) -> Result<Option<i32>, StrategyError> {
        Ok(self(complaint))
    }
}

// ==========================================
// LabelWeightedStrategy
// ==========================================

/// Candidate urgency labels and the score each one contributes.
pub const URGENCY_LABELS: &[(&str, f64)] = &[
    ("very low urgency", 10.0),
    ("low urgency", 30.0),
    ("medium urgency", 50.0),
    ("high urgency", 70.0),
    ("very high urgency", 90.0),
    ("critical emergency", 98.0),
];

/// Anything that can assign a probability to each candidate label,
/// e.g. a zero-shot text classifier.
pub trait LabelClassifier: Send + Sync {
    fn classify(&self, text: &str, labels: &[&str]) -> Result<Vec<(String, f64)>, StrategyError>;
}

/// Probability-weighted average of [`URGENCY_LABELS`] scores.
pub struct LabelWeightedStrategy<C> {
    classifier: C,
}

impl<C: LabelClassifier> LabelWeightedStrategy<C> {
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }
}

impl<C: LabelClassifier> UrgencyStrategy for LabelWeightedStrategy<C> {
    fn name(&self) -> &str {
        "label_weighted"
    }

    fn estimate(&self, complaint: &str) -> Result<Option<i32>, StrategyError> {
        let labels: Vec<&str> = URGENCY_LABELS.iter().map(|(label, _)| *label).collect();
        let ranked = self.classifier.classify(complaint, &labels)?;
        if ranked.is_empty() {
            return Ok(None);
        }

        let mut weighted = 0.0;
        for (label, probability) in &ranked {
            match URGENCY_LABELS.iter().find(|(known, _)| known == label) {
                Some((_, weight)) => weighted += weight * probability,
                None => return Err(format!("classifier returned unknown label '{}'", label).into()),
            }
        }

        Ok(Some((weighted.round() as i32).clamp(1, 100)))
    }
}
