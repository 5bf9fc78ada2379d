// ==========================================
// Wellbeing Waitlist - In-Memory Patient Store
// ==========================================
// PersistenceGateway without a database: for tests and for
// running the queue with no durable mirror configured
// ==========================================

use crate::domain::patient::Patient;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::gateway::PersistenceGateway;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemoryPatientStore {
    records: Mutex<BTreeMap<String, Patient>>,
}

impl MemoryPatientStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> RepositoryResult<MutexGuard<'_, BTreeMap<String, Patient>>> {
        self.records
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.records().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn by_urgency_desc(patients: &mut [Patient]) {
    patients.sort_by(|a, b| {
        b.urgency_score
            .cmp(&a.urgency_score)
            .then_with(|| a.arrival_time.cmp(&b.arrival_time))
    });
}

impl PersistenceGateway for MemoryPatientStore {
    fn save(&self, patient: &Patient) -> RepositoryResult<()> {
        self.records()?
            .insert(patient.patient_id.clone(), patient.clone());
        Ok(())
    }

    fn mark_resolved(&self, patient_id: &str) -> RepositoryResult<()> {
        let mut records = self.records()?;
        match records.get_mut(patient_id) {
            Some(patient) => {
                patient.resolved = true;
                patient.resolved_at = Some(Utc::now());
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                entity: "Patient".to_string(),
                id: patient_id.to_string(),
            }),
        }
    }

    fn list_unresolved(&self, ordered_by_urgency_desc: bool) -> RepositoryResult<Vec<Patient>> {
        let mut patients: Vec<Patient> = self
            .records()?
            .values()
            .filter(|p| !p.resolved)
            .cloned()
            .collect();
        if ordered_by_urgency_desc {
            by_urgency_desc(&mut patients);
        } else {
            patients.sort_by(|a, b| a.arrival_time.cmp(&b.arrival_time));
        }
        Ok(patients)
    }

    fn list_all(&self) -> RepositoryResult<Vec<Patient>> {
        let mut patients: Vec<Patient> = self.records()?.values().cloned().collect();
        by_urgency_desc(&mut patients);
        Ok(patients)
    }

    fn find_by_id(&self, patient_id: &str) -> RepositoryResult<Option<Patient>> {
        Ok(self.records()?.get(patient_id).cloned())
    }

    fn list_by_resolved(&self, resolved: bool) -> RepositoryResult<Vec<Patient>> {
        let mut patients: Vec<Patient> = self
            .records()?
            .values()
            .filter(|p| p.resolved == resolved)
            .cloned()
            .collect();
        by_urgency_desc(&mut patients);
        Ok(patients)
    }

    fn delete(&self, patient_id: &str) -> RepositoryResult<bool> {
        Ok(self.records()?.remove(patient_id).is_some())
    }
}
