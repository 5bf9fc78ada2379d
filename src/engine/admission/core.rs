// ==========================================
// AdmissionQueue - priority structure + dedup keys
// ==========================================
// Order: urgency desc, then admission order (FIFO)
// Heap, key set and resolution change together under one lock
// Storage mirroring is best-effort and never rolls back memory state
// ==========================================

use super::escalation::EscalationPolicy;
use crate::domain::patient::{DedupKey, Patient};
use crate::repository::error::RepositoryError;
use crate::repository::gateway::PersistenceGateway;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Admitted(Patient),
    Duplicate,
}

impl InsertOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, InsertOutcome::Duplicate)
    }
}

// ==========================================
// QueueEntry
// ==========================================
#[derive(Debug, Clone)]
struct QueueEntry {
    seq: u64,
    patient: Patient,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    // Max-heap: higher score first, then the earlier admission.
    fn cmp(&self, other: &Self) -> Ordering {
        self.patient
            .urgency_score
            .cmp(&other.patient.urgency_score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
struct QueueState {
    heap: BinaryHeap<QueueEntry>,
    keys: HashMap<DedupKey, String>,
    next_seq: u64,
}

// ==========================================
// AdmissionQueue
// ==========================================
pub struct AdmissionQueue {
    state: Mutex<QueueState>,
    gateway: Arc<dyn PersistenceGateway>,
    policy: EscalationPolicy,
}

impl AdmissionQueue {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            gateway,
            policy: EscalationPolicy::default(),
        }
    }

    /// An invalid policy is replaced with the default.
    pub fn with_policy(mut self, policy: EscalationPolicy) -> Self {
        match policy.validate() {
            Ok(()) => self.policy = policy,
            Err(reason) => {
                warn!(%reason, "escalation policy rejected, using default");
                self.policy = EscalationPolicy::default();
            }
        }
        self
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    /// Every mutation leaves the state consistent before any call that
    /// could panic, so a poisoned lock is safe to reuse.
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("admission queue lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Admit a patient unless an unresolved patient with the same dedup key is queued.
    pub fn insert(&self, patient: Patient) -> InsertOutcome {
        let mut state = self.lock_state();
        let key = patient.dedup_key();
        if let Some(existing) = state.keys.get(&key) {
            debug!(existing_id = %existing, name = %patient.name, "duplicate admission rejected");
            return InsertOutcome::Duplicate;
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.keys.insert(key, patient.patient_id.clone());
        state.heap.push(QueueEntry {
            seq,
            patient: patient.clone(),
        });

        info!(
            patient_id = %patient.patient_id,
            urgency_score = patient.urgency_score,
            queue_len = state.heap.len(),
            "patient admitted"
        );

        if let Err(e) = self.gateway.save(&patient) {
            warn!(patient_id = %patient.patient_id, error = %e, "failed to mirror admission");
        }

        InsertOutcome::Admitted(patient)
    }

    /// Re-queue stored unresolved patients at startup, in the order given.
    /// Nothing is mirrored back. Resolved records and repeated keys are skipped.
    pub fn restore(&self, patients: Vec<Patient>) -> usize {
        let mut state = self.lock_state();
        let mut restored = 0;
        for patient in patients {
            if patient.resolved {
                continue;
            }
            let key = patient.dedup_key();
            if state.keys.contains_key(&key) {
                warn!(patient_id = %patient.patient_id, "skipping stored duplicate during restore");
                continue;
            }
            let seq = state.next_seq;
            state.next_seq += 1;
            state.keys.insert(key, patient.patient_id.clone());
            state.heap.push(QueueEntry { seq, patient });
            restored += 1;
        }
        if restored > 0 {
            info!(restored, "waitlist restored from storage");
        }
        restored
    }

    /// Remove and return the most urgent patient, escalating everyone left.
    /// The returned patient is already marked resolved.
    pub fn extract_max(&self) -> Option<Patient> {
        self.extract_max_with_remaining().map(|(patient, _)| patient)
    }

    /// [`extract_max`](Self::extract_max) plus the number of patients still
    /// waiting, read under the same lock.
    #[instrument(level = "debug", skip(self))]
    pub fn extract_max_with_remaining(&self) -> Option<(Patient, usize)> {
        let mut state = self.lock_state();
        let QueueEntry { patient: mut top, .. } = state.heap.pop()?;
        state.keys.remove(&top.dedup_key());
        top.mark_resolved();

        let escalated = self.escalate_all(&mut state);

        info!(
            patient_id = %top.patient_id,
            urgency_score = top.urgency_score,
            escalated = escalated.len(),
            "patient dispatched"
        );

        for patient in &escalated {
            if let Err(e) = self.gateway.save(patient) {
                warn!(patient_id = %patient.patient_id, error = %e, "failed to mirror escalated score");
            }
        }
        self.mirror_resolved(&top);

        let remaining = state.heap.len();
        Some((top, remaining))
    }

    /// Raise every waiting score and rebuild the heap; returns the updated patients.
    fn escalate_all(&self, state: &mut QueueState) -> Vec<Patient> {
        if state.heap.is_empty() {
            return Vec::new();
        }

        let mut entries = std::mem::take(&mut state.heap).into_vec();
        for entry in &mut entries {
            let before = entry.patient.urgency_score;
            let step = self.policy.escalate(&mut entry.patient);
            debug!(
                patient_id = %entry.patient.patient_id,
                before,
                after = before + step,
                "escalated waiting patient"
            );
        }
        let escalated = entries.iter().map(|e| e.patient.clone()).collect();
        state.heap = BinaryHeap::from(entries);
        escalated
    }

    fn mirror_resolved(&self, patient: &Patient) {
        match self.gateway.mark_resolved(&patient.patient_id) {
            Ok(()) => {}
            // The admission mirror may have failed earlier; write the full record instead.
            Err(RepositoryError::NotFound { .. }) => {
                if let Err(e) = self.gateway.save(patient) {
                    warn!(patient_id = %patient.patient_id, error = %e, "failed to mirror resolution");
                }
            }
            Err(e) => {
                warn!(patient_id = %patient.patient_id, error = %e, "failed to mirror resolution");
            }
        }
    }

    /// Remove a waiting patient without dispatching it. No escalation.
    pub fn withdraw(&self, patient_id: &str) -> Option<Patient> {
        let mut state = self.lock_state();
        let mut entries = std::mem::take(&mut state.heap).into_vec();
        let position = entries.iter().position(|e| e.patient.patient_id == patient_id);
        let removed = position.map(|idx| entries.swap_remove(idx).patient);
        state.heap = BinaryHeap::from(entries);

        if let Some(patient) = &removed {
            state.keys.remove(&patient.dedup_key());
            info!(patient_id = %patient.patient_id, "patient withdrawn from queue");
        }
        removed
    }

    pub fn contains(&self, key: &DedupKey) -> bool {
        self.lock_state().keys.contains_key(key)
    }

    /// Waiting patients in internal heap order.
    pub fn snapshot(&self) -> Vec<Patient> {
        self.lock_state()
            .heap
            .iter()
            .map(|e| e.patient.clone())
            .collect()
    }

    /// Waiting patients in dispatch order.
    pub fn snapshot_ordered(&self) -> Vec<Patient> {
        let state = self.lock_state();
        let mut entries: Vec<&QueueEntry> = state.heap.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries.into_iter().map(|e| e.patient.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock_state().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
