// ==========================================
// Wellbeing Waitlist - Admission Queue
// ==========================================
// Max-priority waitlist with exact-duplicate rejection.
// Every dispatch escalates all patients still waiting.
// ==========================================

mod core;
mod escalation;


pub use self::core::{AdmissionQueue, InsertOutcome};
pub use self::escalation::{EscalationPolicy, MIN_BASE_STEP};
