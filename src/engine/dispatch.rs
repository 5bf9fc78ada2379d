// ==========================================
// Wellbeing Waitlist - Dispatch Scheduler
// ==========================================
// One recurring background task that takes the most urgent patient
// off the waitlist on every tick
// ==========================================
// Stop: once `stop()` returns, no further extraction is started.
// An in-flight tick is allowed to finish and is awaited by `stop()`.
// A panicking tick is logged; the next tick still fires.
// ==========================================

use crate::domain::patient::Patient;
use crate::engine::admission::AdmissionQueue;
use crate::engine::events::{DispatchEvent, DispatchTrigger, OptionalEventPublisher};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const DEFAULT_DISPATCH_INTERVAL: Duration = Duration::from_secs(20);
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(0);

/// Upper bound for both the interval and the initial delay.
pub const MAX_SCHEDULE_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Dispatched(Patient),
    Empty,
}

impl DispatchOutcome {
    pub fn patient(&self) -> Option<&Patient> {
        match self {
            DispatchOutcome::Dispatched(p) => Some(p),
            DispatchOutcome::Empty => None,
        }
    }
}

/// One extraction attempt plus its event. Shared by the scheduler and
/// the manual dispatch call.
pub fn dispatch_once(
    queue: &AdmissionQueue,
    publisher: &OptionalEventPublisher,
    trigger: DispatchTrigger,
) -> DispatchOutcome {
    let (outcome, event) = match queue.extract_max_with_remaining() {
        Some((patient, remaining)) => {
            info!(
                trigger = trigger.as_str(),
                patient_id = %patient.patient_id,
                name = %patient.name,
                urgency_score = patient.urgency_score,
                remaining,
                "dispatched patient"
            );
            let event = DispatchEvent::dispatched(trigger, &patient, remaining);
            (DispatchOutcome::Dispatched(patient), event)
        }
        None => {
            debug!(trigger = trigger.as_str(), "dispatch found an empty queue");
            (DispatchOutcome::Empty, DispatchEvent::queue_empty(trigger))
        }
    };

    if let Err(e) = publisher.publish(event) {
        warn!(error = %e, "failed to publish dispatch event");
    }
    outcome
}

// ==========================================
// DispatchScheduler
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSchedulerConfig {
    pub interval: Duration,
    pub initial_delay: Duration,
}

impl Default for DispatchSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_DISPATCH_INTERVAL,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

pub struct DispatchScheduler {
    queue: Arc<AdmissionQueue>,
    publisher: OptionalEventPublisher,
    config: DispatchSchedulerConfig,
}

impl DispatchScheduler {
    /// A zero interval is replaced with the default. Durations above
    /// [`MAX_SCHEDULE_DURATION`] are capped.
    pub fn new(queue: Arc<AdmissionQueue>, mut config: DispatchSchedulerConfig) -> Self {
        if config.interval.is_zero() {
            warn!(
                default_secs = DEFAULT_DISPATCH_INTERVAL.as_secs(),
                "dispatch interval must be positive, using default"
            );
            config.interval = DEFAULT_DISPATCH_INTERVAL;
        }
        if config.interval > MAX_SCHEDULE_DURATION {
            warn!(
                max_secs = MAX_SCHEDULE_DURATION.as_secs(),
                "dispatch interval too long, capping"
            );
            config.interval = MAX_SCHEDULE_DURATION;
        }
        if config.initial_delay > MAX_SCHEDULE_DURATION {
            warn!(
                max_secs = MAX_SCHEDULE_DURATION.as_secs(),
                "initial dispatch delay too long, capping"
            );
            config.initial_delay = MAX_SCHEDULE_DURATION;
        }
        Self {
            queue,
            publisher: OptionalEventPublisher::none(),
            config,
        }
    }

    pub fn with_publisher(mut self, publisher: OptionalEventPublisher) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn config(&self) -> DispatchSchedulerConfig {
        self.config
    }

    /// Spawn the recurring task on the current tokio runtime.
    pub fn start(self) -> DispatchSchedulerHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_loop(
            self.queue,
            self.publisher,
            self.config,
            cancel.clone(),
        ));

        info!(
            interval_ms = self.config.interval.as_millis() as u64,
            initial_delay_ms = self.config.initial_delay.as_millis() as u64,
            "dispatch scheduler started"
        );

        DispatchSchedulerHandle {
            cancel,
            task: Some(task),
        }
    }
}

async fn run_loop(
    queue: Arc<AdmissionQueue>,
    publisher: OptionalEventPublisher,
    config: DispatchSchedulerConfig,
    cancel: CancellationToken,
) {
    let now = Instant::now();
    let first_tick = now
        .checked_add(config.initial_delay)
        .or_else(|| now.checked_add(MAX_SCHEDULE_DURATION))
        .unwrap_or(now);
    let mut ticker = interval_at(first_tick, config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        if cancel.is_cancelled() {
            break;
        }

        let queue = Arc::clone(&queue);
        let publisher = publisher.clone();
        let tick = tokio::task::spawn_blocking(move || {
            dispatch_once(&queue, &publisher, DispatchTrigger::Scheduler)
        });

        if let Err(e) = tick.await {
            error!(error = %e, "dispatch tick failed, scheduler keeps running");
        }
    }

    info!("dispatch scheduler stopped");
}

// ==========================================
// DispatchSchedulerHandle
// ==========================================

/// Owns the running task. Dropping the handle cancels the task without
/// waiting for it.
pub struct DispatchSchedulerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl DispatchSchedulerHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel the timer and wait for any in-flight tick to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(error = %e, "dispatch scheduler task ended abnormally");
            }
        }
    }
}

impl Drop for DispatchSchedulerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
