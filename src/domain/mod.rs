// ==========================================
// Wellbeing Waitlist - Domain Layer
// ==========================================
// Entities and closed enums, no I/O
// ==========================================

pub mod patient;
pub mod types;

pub use patient::{DedupKey, Patient, PatientIntake};
pub use types::{Category, ScoreSource};
