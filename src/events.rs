//! Enrichment event system
//!
//! Serde-tagged event enum broadcast over an in-process bus, consumed by
//! the SSE endpoint. Events are lossy by design: a missing subscriber
//! never blocks the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Enrichment lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EnrichEvent {
    /// A new enrichment session was accepted and its pipeline started
    EnrichmentSessionStarted {
        session_id: Uuid,
        total_isbns: usize,
        timestamp: DateTime<Utc>,
    },

    /// One more ISBN finished; emitted exactly once per completion
    EnrichmentProgress {
        session_id: Uuid,
        completed: usize,
        total: usize,
        /// Fraction complete in [0, 1]
        fraction: f64,
        /// Human-readable "Processed X/Y ISBNs"
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// All ISBNs processed and the workbook exported
    EnrichmentSessionCompleted {
        session_id: Uuid,
        total_isbns: usize,
        elapsed_seconds: u64,
        timestamp: DateTime<Utc>,
    },

    /// The session aborted (export failure); per-ISBN lookups never fail
    EnrichmentSessionFailed {
        session_id: Uuid,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl EnrichEvent {
    /// Event name used as the SSE event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            EnrichEvent::EnrichmentSessionStarted { .. } => "EnrichmentSessionStarted",
            EnrichEvent::EnrichmentProgress { .. } => "EnrichmentProgress",
            EnrichEvent::EnrichmentSessionCompleted { .. } => "EnrichmentSessionCompleted",
            EnrichEvent::EnrichmentSessionFailed { .. } => "EnrichmentSessionFailed",
        }
    }
}

/// Broadcast-backed event bus shared across handlers and the pipeline.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EnrichEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events. Events emitted before subscription
    /// are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<EnrichEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, returning the subscriber count on success.
    pub fn emit(
        &self,
        event: EnrichEvent,
    ) -> Result<usize, broadcast::error::SendError<EnrichEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the absence of subscribers.
    pub fn emit_lossy(&self, event: EnrichEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
