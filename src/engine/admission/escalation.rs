// ==========================================
// Escalation policy
// ==========================================
// Applied to every waiting patient each time another one is dispatched.
// increment = base + (score > threshold ? bonus : 0) + (age > senior_age ? bonus : 0)
// Thresholds compare against the score before escalation.
// Escalated scores are not capped at 100.
// Every waiting patient gains at least MIN_BASE_STEP per dispatch.
// ==========================================

use crate::domain::patient::Patient;
use serde::{Deserialize, Serialize};

/// Smallest base step a policy may carry.
pub const MIN_BASE_STEP: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    pub base_step: i32,
    pub high_score_threshold: i32,
    pub high_score_bonus: i32,
    pub senior_age: u32,
    pub senior_bonus: i32,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            base_step: 5,
            high_score_threshold: 60,
            high_score_bonus: 3,
            senior_age: 60,
            senior_bonus: 2,
        }
    }
}

impl EscalationPolicy {
    /// First rule the policy breaks, if any: the base step is below
    /// [`MIN_BASE_STEP`] or a bonus is negative.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_step < MIN_BASE_STEP {
            return Err(format!(
                "base_step {} is below the minimum of {}",
                self.base_step, MIN_BASE_STEP
            ));
        }
        if self.high_score_bonus < 0 {
            return Err(format!("high_score_bonus {} is negative", self.high_score_bonus));
        }
        if self.senior_bonus < 0 {
            return Err(format!("senior_bonus {} is negative", self.senior_bonus));
        }
        Ok(())
    }

    pub fn increment(&self, current_score: i32, age: u32) -> i32 {
        let mut step = self.base_step;
        if current_score > self.high_score_threshold {
            step += self.high_score_bonus;
        }
        if age > self.senior_age {
            step += self.senior_bonus;
        }
        step
    }

    /// Raise the patient's score in place; returns the applied increment.
    pub fn escalate(&self, patient: &mut Patient) -> i32 {
        let step = self.increment(patient.urgency_score, patient.age);
        patient.urgency_score = patient.urgency_score.saturating_add(step);
        step
    }
}
