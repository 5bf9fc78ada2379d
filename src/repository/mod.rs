// ==========================================
// Wellbeing Waitlist - Repository Layer
// ==========================================
// Rule: repositories carry no business logic
// Constraint: every query is parameterized
// ==========================================

pub mod error;
pub mod gateway;
pub mod memory_store;
pub mod patient_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use gateway::PersistenceGateway;
pub use memory_store::MemoryPatientStore;
pub use patient_repo::PatientRepository;
