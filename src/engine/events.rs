// ==========================================
// Wellbeing Waitlist - Dispatch Events
// ==========================================
// Engine defines the publisher trait, callers plug in adapters
// Every dispatch attempt (scheduled or manual) emits one event
// ==========================================

use crate::domain::patient::Patient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::mpsc;

// ==========================================
// Event types
// ==========================================

/// Who asked for the dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchTrigger {
    Scheduler,
    Manual,
}

impl DispatchTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchTrigger::Scheduler => "Scheduler",
            DispatchTrigger::Manual => "Manual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchEventType {
    /// A patient was taken off the waitlist
    Dispatched,
    /// Nothing was waiting
    QueueEmpty,
}

impl DispatchEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchEventType::Dispatched => "Dispatched",
            DispatchEventType::QueueEmpty => "QueueEmpty",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchEvent {
    pub trigger: DispatchTrigger,
    pub event_type: DispatchEventType,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub urgency_score: Option<i32>,
    /// Queue length after the attempt
    pub remaining: usize,
    pub occurred_at: DateTime<Utc>,
}

impl DispatchEvent {
    pub fn dispatched(trigger: DispatchTrigger, patient: &Patient, remaining: usize) -> Self {
        Self {
            trigger,
            event_type: DispatchEventType::Dispatched,
            patient_id: Some(patient.patient_id.clone()),
            patient_name: Some(patient.name.clone()),
            urgency_score: Some(patient.urgency_score),
            remaining,
            occurred_at: Utc::now(),
        }
    }

    pub fn queue_empty(trigger: DispatchTrigger) -> Self {
        Self {
            trigger,
            event_type: DispatchEventType::QueueEmpty,
            patient_id: None,
            patient_name: None,
            urgency_score: None,
            remaining: 0,
            occurred_at: Utc::now(),
        }
    }
}

// ==========================================
// Publisher trait
// ==========================================

pub trait DispatchEventPublisher: Send + Sync {
    /// Deliver one event. Errors are logged by the caller and never
    /// undo the dispatch that produced the event.
    fn publish(&self, event: DispatchEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Drops every event.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl DispatchEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: DispatchEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpEventPublisher: skipping event - trigger={}, event_type={}",
            event.trigger.as_str(),
            event.event_type.as_str()
        );
        Ok(())
    }
}

/// Wrapper over `Option<Arc<dyn DispatchEventPublisher>>`.
#[derive(Clone)]
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn DispatchEventPublisher>>,
}

impl OptionalEventPublisher {
    pub fn with_publisher(publisher: Arc<dyn DispatchEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    pub fn publish(&self, event: DispatchEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(publisher) => publisher.publish(event),
            None => Ok(()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}

/// Forwards events into a tokio channel; fails once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelEventPublisher {
    tx: mpsc::UnboundedSender<DispatchEvent>,
}

impl ChannelEventPublisher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DispatchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DispatchEventPublisher for ChannelEventPublisher {
    fn publish(&self, event: DispatchEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.tx
            .send(event)
            .map_err(|_| "dispatch event receiver dropped".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::PatientIntake;
    use crate::domain::types::Category;

    #[test]
    fn test_dispatched_event_carries_patient() {
        let patient = Patient::admit(PatientIntake::new("Ana", 30, Category::Female, "fever"), 50);
        let event = DispatchEvent::dispatched(DispatchTrigger::Manual, &patient, 3);

        assert_eq!(event.event_type, DispatchEventType::Dispatched);
        assert_eq!(event.patient_id.as_deref(), Some(patient.patient_id.as_str()));
        assert_eq!(event.urgency_score, Some(50));
        assert_eq!(event.remaining, 3);
    }

    #[test]
    fn test_queue_empty_event() {
        let event = DispatchEvent::queue_empty(DispatchTrigger::Scheduler);
        assert_eq!(event.event_type, DispatchEventType::QueueEmpty);
        assert!(event.patient_id.is_none());
        assert_eq!(event.remaining, 0);
    }

    #[test]
    fn test_noop_publisher() {
        let publisher = NoOpEventPublisher;
        assert!(publisher
            .publish(DispatchEvent::queue_empty(DispatchTrigger::Manual))
            .is_ok());
    }

    #[test]
    fn test_optional_publisher_none() {
        let publisher = OptionalEventPublisher::none();
        assert!(!publisher.is_configured());
        assert!(publisher
            .publish(DispatchEvent::queue_empty(DispatchTrigger::Manual))
            .is_ok());
    }

    #[test]
    fn test_channel_publisher_delivers_and_reports_closed_receiver() {
        let (publisher, mut rx) = ChannelEventPublisher::new();
        let wrapped = OptionalEventPublisher::with_publisher(Arc::new(publisher.clone()));
        assert!(wrapped.is_configured());

        wrapped
            .publish(DispatchEvent::queue_empty(DispatchTrigger::Scheduler))
            .unwrap();
        let received = rx.try_recv().unwrap();
        assert_eq!(received.trigger, DispatchTrigger::Scheduler);

        drop(rx);
        assert!(publisher
            .publish(DispatchEvent::queue_empty(DispatchTrigger::Scheduler))
            .is_err());
    }
}
