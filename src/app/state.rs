// ==========================================
// Wellbeing Waitlist - Application State
// ==========================================
// Wires config, storage, engines and the API into one shared value
// ==========================================

use std::sync::Arc;

use crate::api::WaitlistApi;
use crate::config::{ConfigManager, WaitlistConfig};
use crate::engine::admission::AdmissionQueue;
use crate::engine::dispatch::{DispatchScheduler, DispatchSchedulerHandle};
use crate::engine::events::OptionalEventPublisher;
use crate::engine::scoring::{PhraseTable, ScoringEngine};
use crate::repository::{MemoryPatientStore, PatientRepository, PersistenceGateway};

pub struct AppState {
    /// Empty for in-memory state
    pub db_path: String,

    pub config: WaitlistConfig,

    pub waitlist_api: Arc<WaitlistApi>,

    pub scoring_engine: Arc<ScoringEngine>,

    pub admission_queue: Arc<AdmissionQueue>,

    pub gateway: Arc<dyn PersistenceGateway>,

    /// Shared by manual dispatch and the scheduler
    pub event_publisher: OptionalEventPublisher,
}

impl AppState {
    /// Open the database, load configuration and restore waiting patients.
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::open(db_path, OptionalEventPublisher::none())
    }

    /// Same as [`AppState::new`] with dispatch events routed to `event_publisher`.
    pub fn open(db_path: String, event_publisher: OptionalEventPublisher) -> Result<Self, String> {
        tracing::info!("initializing AppState, database path: {}", db_path);

        let config_manager =
            ConfigManager::new(&db_path).map_err(|e| format!("cannot open config store: {}", e))?;
        let config = config_manager
            .load_waitlist_config()
            .map_err(|e| format!("cannot load configuration: {}", e))?;

        let repo = PatientRepository::new(&db_path)
            .map_err(|e| format!("cannot create PatientRepository: {}", e))?;
        let gateway: Arc<dyn PersistenceGateway> = Arc::new(repo);

        let state = Self::with_gateway(db_path, config, gateway, event_publisher);

        let waiting = state
            .gateway
            .list_unresolved(false)
            .map_err(|e| format!("cannot read waiting patients: {}", e))?;
        state.admission_queue.restore(waiting);

        tracing::info!("AppState initialized");
        Ok(state)
    }

    /// Build around an arbitrary gateway. Nothing is restored.
    pub fn with_gateway(
        db_path: String,
        config: WaitlistConfig,
        gateway: Arc<dyn PersistenceGateway>,
        event_publisher: OptionalEventPublisher,
    ) -> Self {
        let table = PhraseTable::load_or_builtin(config.scoring.phrase_table_path.as_deref());
        let scoring_engine = Arc::new(
            ScoringEngine::new(table)
                .with_similarity_threshold(config.scoring.fuzzy_similarity_threshold),
        );

        let admission_queue =
            Arc::new(AdmissionQueue::new(gateway.clone()).with_policy(config.escalation));

        let waitlist_api = Arc::new(WaitlistApi::new(
            scoring_engine.clone(),
            admission_queue.clone(),
            gateway.clone(),
            event_publisher.clone(),
        ));

        Self {
            db_path,
            config,
            waitlist_api,
            scoring_engine,
            admission_queue,
            gateway,
            event_publisher,
        }
    }

    /// No database at all; records live in a [`MemoryPatientStore`].
    pub fn in_memory(config: WaitlistConfig, event_publisher: OptionalEventPublisher) -> Self {
        Self::with_gateway(
            String::new(),
            config,
            Arc::new(MemoryPatientStore::new()),
            event_publisher,
        )
    }

    /// Must be called inside a tokio runtime.
    pub fn start_dispatch_scheduler(&self) -> DispatchSchedulerHandle {
        DispatchScheduler::new(self.admission_queue.clone(), self.config.dispatch)
            .with_publisher(self.event_publisher.clone())
            .start()
    }
}

/// Database file location.
///
/// `WELLBEING_WAITLIST_DB_PATH` wins when set; otherwise the user data
/// directory, falling back to the working directory.
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("WELLBEING_WAITLIST_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./wellbeing_waitlist.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("wellbeing-waitlist");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("wellbeing_waitlist.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_in_memory_state_wires_shared_queue() {
        let state = AppState::in_memory(WaitlistConfig::default(), OptionalEventPublisher::none());
        state
            .waitlist_api
            .submit("Ana", 30, "Female", "fever")
            .unwrap();
        assert_eq!(state.admission_queue.len(), 1);
        assert_eq!(state.gateway.list_all().unwrap().len(), 1);
        assert!(state.db_path.is_empty());
    }
}
