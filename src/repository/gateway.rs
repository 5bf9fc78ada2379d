// ==========================================
// Wellbeing Waitlist - Persistence Gateway
// ==========================================
// Durable mirror of queue state. The in-memory queue is the
// source of truth for live ordering; this store never is.
// ==========================================

use crate::domain::patient::Patient;
use crate::repository::error::RepositoryResult;

/// Storage contract consumed by the admission queue and the API layer.
///
/// Any backend satisfying this contract is acceptable; see
/// [`PatientRepository`](crate::repository::PatientRepository) (SQLite) and
/// [`MemoryPatientStore`](crate::repository::MemoryPatientStore).
pub trait PersistenceGateway: Send + Sync {
    /// Upsert keyed by `patient_id`.
    fn save(&self, patient: &Patient) -> RepositoryResult<()>;

    /// Flag a stored record resolved. `NotFound` if no such record.
    fn mark_resolved(&self, patient_id: &str) -> RepositoryResult<()>;

    fn list_unresolved(&self, ordered_by_urgency_desc: bool) -> RepositoryResult<Vec<Patient>>;

    fn list_all(&self) -> RepositoryResult<Vec<Patient>>;

    fn find_by_id(&self, patient_id: &str) -> RepositoryResult<Option<Patient>>;

    fn list_by_resolved(&self, resolved: bool) -> RepositoryResult<Vec<Patient>>;

    /// Returns `true` if a record was removed.
    fn delete(&self, patient_id: &str) -> RepositoryResult<bool>;
}
