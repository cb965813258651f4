//! Event types for the CytoScan event system
//!
//! Provides shared event definitions and EventBus for CytoScan services.
//! Events are broadcast via EventBus and can be serialized for SSE transmission.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// CytoScan event types
///
/// All services emit through this central enum for type safety and
/// exhaustive matching on the subscriber side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CytoEvent {
    /// An upload was accepted and analysis is starting
    AnalysisStarted {
        /// Original filename of the uploaded media
        filename: String,
        /// Declared media kind ("video" or "image")
        media_kind: String,
        /// When analysis started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analysis finished and the result record was persisted
    AnalysisCompleted {
        /// Persisted result record UUID
        result_id: Uuid,
        /// Original filename of the uploaded media
        filename: String,
        /// Estimated cell count (0 when no content was detected)
        cell_count: i64,
        /// Final analysis status ("completed" / "no-content-detected")
        status: String,
        /// When analysis completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A stored result record was deleted
    ResultDeleted {
        /// Deleted record UUID
        result_id: Uuid,
        /// When the record was deleted
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl CytoEvent {
    /// Event type name for SSE event framing
    pub fn event_type(&self) -> &'static str {
        match self {
            CytoEvent::AnalysisStarted { .. } => "AnalysisStarted",
            CytoEvent::AnalysisCompleted { .. } => "AnalysisCompleted",
            CytoEvent::ResultDeleted { .. } => "ResultDeleted",
        }
    }
}

/// Broadcast bus for CytoScan events
///
/// Cheap to clone; all clones share the same underlying channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CytoEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    ///
    /// Old events are dropped once `capacity` unread events are buffered.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CytoEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns the subscriber count, or 0 if nobody is listening
    /// (an event with no listeners is not an error).
    pub fn emit(&self, event: CytoEvent) -> usize {
        match self.tx.send(event) {
            Ok(count) => count,
            Err(_) => {
                tracing::debug!("Event emitted with no subscribers");
                0
            }
        }
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_emitted_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let count = bus.emit(CytoEvent::ResultDeleted {
            result_id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
        });
        assert_eq!(count, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "ResultDeleted");
    }

    #[test]
    fn emit_without_subscribers_is_not_an_error() {
        let bus = EventBus::new(16);
        let count = bus.emit(CytoEvent::AnalysisStarted {
            filename: "sample.mp4".to_string(),
            media_kind: "video".to_string(),
            timestamp: chrono::Utc::now(),
        });
        assert_eq!(count, 0);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = CytoEvent::AnalysisCompleted {
            result_id: Uuid::new_v4(),
            filename: "sample.mp4".to_string(),
            cell_count: 42,
            status: "completed".to_string(),
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"AnalysisCompleted\""));
    }
}
