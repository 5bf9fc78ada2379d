// ==========================================
// Wellbeing Waitlist - Core Library
// ==========================================
// Triage waitlist: complaint scoring, priority admission with
// escalation, periodic dispatch of the most urgent patient
// Stack: Rust + tokio + SQLite
// ==========================================

// ==========================================
// Modules
// ==========================================

// Domain - entities and types
pub mod domain;

// Repository - data access
pub mod repository;

// Engine - business rules
pub mod engine;

// Config - system configuration
pub mod config;

// Database infrastructure (connection setup, busy timeout, schema)
pub mod db;

// Logging
pub mod logging;

// API - business interface
pub mod api;

// App - shared state wiring
pub mod app;

// ==========================================
// Re-exports
// ==========================================

pub use domain::types::{Category, ScoreSource};
pub use domain::{DedupKey, Patient, PatientIntake};

pub use engine::{
    AdmissionQueue, DispatchOutcome, DispatchScheduler, EscalationPolicy, ScoringEngine,
};

pub use api::{ApiError, ApiResult, SubmitOutcome, WaitlistApi};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Wellbeing Waitlist";
