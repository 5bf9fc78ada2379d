// ==========================================
// Wellbeing Waitlist - Patient Domain Model
// ==========================================
// Lifecycle: intake -> admitted (queued) -> resolved (dispatched)
// Identity is assigned at admission, never before
// ==========================================

use crate::domain::types::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// PatientIntake - an identity-free request
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientIntake {
    pub name: String,
    pub age: u32,
    pub category: Category,
    pub complaint: String,
}

impl PatientIntake {
    pub fn new(
        name: impl Into<String>,
        age: u32,
        category: Category,
        complaint: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            category,
            complaint: complaint.into(),
        }
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            name: self.name.clone(),
            age: self.age,
            category: self.category,
            complaint: self.complaint.clone(),
        }
    }
}

// ==========================================
// DedupKey - (name, age, category, complaint)
// ==========================================
// Fields are compared verbatim, no normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DedupKey {
    pub name: String,
    pub age: u32,
    pub category: Category,
    pub complaint: String,
}

// ==========================================
// Patient - an admitted request
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: String,
    pub name: String,
    pub age: u32,
    pub category: Category,
    pub complaint: String,

    /// Set once at admission, afterwards only raised by escalation.
    pub urgency_score: i32,

    pub arrival_time: DateTime<Utc>,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Patient {
    /// Assign identity, score and arrival time to an intake.
    pub fn admit(intake: PatientIntake, urgency_score: i32) -> Self {
        Self {
            patient_id: Uuid::new_v4().to_string(),
            name: intake.name,
            age: intake.age,
            category: intake.category,
            complaint: intake.complaint,
            urgency_score,
            arrival_time: Utc::now(),
            resolved: false,
            resolved_at: None,
        }
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            name: self.name.clone(),
            age: self.age,
            category: self.category,
            complaint: self.complaint.clone(),
        }
    }

    pub fn mark_resolved(&mut self) {
        self.resolved = true;
        self.resolved_at = Some(Utc::now());
    }
}
