// ==========================================
// Wellbeing Waitlist - Engine Layer
// ==========================================
// Business rules only: no SQL here
// Storage is reached through PersistenceGateway
// ==========================================

pub mod admission;
pub mod dispatch;
pub mod events;
pub mod scoring;

pub use admission::{AdmissionQueue, EscalationPolicy, InsertOutcome};
pub use dispatch::{
    dispatch_once, DispatchOutcome, DispatchScheduler, DispatchSchedulerConfig,
    DispatchSchedulerHandle,
};
pub use events::{
    ChannelEventPublisher, DispatchEvent, DispatchEventPublisher, DispatchEventType,
    DispatchTrigger, NoOpEventPublisher, OptionalEventPublisher,
};
pub use scoring::{
    CacheStatistics, PhraseTable, PhraseTableError, ScoreResolution, ScoringEngine,
    UrgencyStrategy,
};
