// ==========================================
// Wellbeing Waitlist - Waitlist API
// ==========================================
// Entry point for front ends: intake, dispatch, inspection,
// scoring diagnostics and stored-record administration
// ==========================================
// Queue state is authoritative for live ordering;
// stored records are a best-effort mirror of it
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::patient::{Patient, PatientIntake};
use crate::domain::types::Category;
use crate::engine::admission::{AdmissionQueue, InsertOutcome};
use crate::engine::dispatch::{dispatch_once, DispatchOutcome};
use crate::engine::events::{DispatchTrigger, OptionalEventPublisher};
use crate::engine::scoring::{CacheStatistics, ScoreResolution, ScoringEngine};
use crate::repository::gateway::PersistenceGateway;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "patient", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Accepted(Patient),
    RejectedDuplicate,
}

impl SubmitOutcome {
    pub fn patient(&self) -> Option<&Patient> {
        match self {
            SubmitOutcome::Accepted(p) => Some(p),
            SubmitOutcome::RejectedDuplicate => None,
        }
    }
}

pub struct WaitlistApi {
    scoring: Arc<ScoringEngine>,
    queue: Arc<AdmissionQueue>,
    gateway: Arc<dyn PersistenceGateway>,
    publisher: OptionalEventPublisher,
}

impl WaitlistApi {
    pub fn new(
        scoring: Arc<ScoringEngine>,
        queue: Arc<AdmissionQueue>,
        gateway: Arc<dyn PersistenceGateway>,
        publisher: OptionalEventPublisher,
    ) -> Self {
        Self {
            scoring,
            queue,
            gateway,
            publisher,
        }
    }

    // ==========================================
    // Intake and dispatch
    // ==========================================

    /// Score and enqueue a new request. A request whose (name, age,
    /// category, complaint) matches a waiting one is rejected.
    #[instrument(skip(self, complaint))]
    pub fn submit(
        &self,
        name: &str,
        age: u32,
        category: &str,
        complaint: &str,
    ) -> ApiResult<SubmitOutcome> {
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("name must not be blank".to_string()));
        }
        let category: Category = category.parse().map_err(ApiError::InvalidInput)?;

        let intake = PatientIntake::new(name, age, category, complaint);
        if self.queue.contains(&intake.dedup_key()) {
            debug!("duplicate submission rejected before scoring");
            return Ok(SubmitOutcome::RejectedDuplicate);
        }

        let resolution = self.scoring.score_detailed(complaint);
        debug!(
            score = resolution.score,
            source = resolution.source.as_str(),
            from_cache = resolution.from_cache,
            "complaint scored"
        );

        match self.queue.insert(Patient::admit(intake, resolution.score)) {
            InsertOutcome::Admitted(patient) => Ok(SubmitOutcome::Accepted(patient)),
            InsertOutcome::Duplicate => Ok(SubmitOutcome::RejectedDuplicate),
        }
    }

    /// Manual equivalent of one scheduler tick.
    pub fn dispatch_next(&self) -> DispatchOutcome {
        dispatch_once(&self.queue, &self.publisher, DispatchTrigger::Manual)
    }

    /// Waiting patients, unspecified order.
    pub fn peek_queue(&self) -> Vec<Patient> {
        self.queue.snapshot()
    }

    /// Waiting patients in the order they would be dispatched.
    pub fn peek_queue_ordered(&self) -> Vec<Patient> {
        self.queue.snapshot_ordered()
    }

    // ==========================================
    // Scoring diagnostics
    // ==========================================

    pub fn score(&self, complaint: &str) -> i32 {
        self.scoring.score(complaint)
    }

    pub fn score_detailed(&self, complaint: &str) -> ScoreResolution {
        self.scoring.score_detailed(complaint)
    }

    pub fn cache_statistics(&self) -> CacheStatistics {
        self.scoring.cache_statistics()
    }

    /// Pre-populate the runtime score cache; false if already present.
    pub fn seed_score(&self, complaint: &str, score: i32) -> bool {
        self.scoring.seed(complaint, score)
    }

    // ==========================================
    // Stored records
    // ==========================================

    /// `None` lists everything, otherwise filters on the resolved flag.
    pub fn list_patients(&self, resolved: Option<bool>) -> ApiResult<Vec<Patient>> {
        let patients = match resolved {
            Some(flag) => self.gateway.list_by_resolved(flag)?,
            None => self.gateway.list_all()?,
        };
        Ok(patients)
    }

    pub fn list_unresolved(&self, ordered_by_urgency_desc: bool) -> ApiResult<Vec<Patient>> {
        Ok(self.gateway.list_unresolved(ordered_by_urgency_desc)?)
    }

    pub fn get_patient(&self, patient_id: &str) -> ApiResult<Patient> {
        validate_id(patient_id)?;
        self.gateway
            .find_by_id(patient_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Patient(id={}) does not exist", patient_id)))
    }

    /// Resolve without dispatching: the patient leaves the queue, nobody
    /// else is escalated. Once withdrawn, a failed storage write is only logged.
    pub fn resolve_patient(&self, patient_id: &str) -> ApiResult<Patient> {
        validate_id(patient_id)?;

        if let Some(mut patient) = self.queue.withdraw(patient_id) {
            patient.mark_resolved();
            if let Err(e) = self.gateway.save(&patient) {
                warn!(patient_id, error = %e, "failed to mirror manual resolution");
            }
            info!(patient_id, "patient resolved outside dispatch");
            return Ok(patient);
        }

        self.gateway.mark_resolved(patient_id)?;
        self.get_patient(patient_id)
    }

    /// Remove the stored record, withdrawing it from the queue if waiting.
    /// A storage failure leaves the queue untouched.
    pub fn delete_patient(&self, patient_id: &str) -> ApiResult<()> {
        validate_id(patient_id)?;

        let deleted = self.gateway.delete(patient_id)?;
        let withdrawn = self.queue.withdraw(patient_id).is_some();
        if !withdrawn && !deleted {
            return Err(ApiError::NotFound(format!(
                "Patient(id={}) does not exist",
                patient_id
            )));
        }
        info!(patient_id, withdrawn, "patient deleted");
        Ok(())
    }
}

fn validate_id(patient_id: &str) -> ApiResult<()> {
    if patient_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("patient id must not be blank".to_string()));
    }
    Ok(())
}
