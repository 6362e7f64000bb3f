//! Event types for the Zelo event system
//!
//! A silently failed sweep is indistinguishable from "nothing recurring
//! happened", so the engine broadcasts its progress (assets analyzed, alerts
//! created, sweep summaries) for SSE clients and in-process observers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::db::models::AlertSeverity;

/// Zelo event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ZeloEvent {
    /// An alert row was created for a recurring problem
    AlertCreated {
        alert_id: Uuid,
        asset_id: Uuid,
        company_id: Uuid,
        keyword: String,
        severity: AlertSeverity,
        timestamp: DateTime<Utc>,
    },

    /// One asset's recurrence analysis finished
    AssetAnalyzed {
        asset_id: Uuid,
        company_id: Uuid,
        problem_events: usize,
        keywords_tracked: usize,
        alerts_emitted: usize,
        timestamp: DateTime<Utc>,
    },

    /// A company-wide sweep finished
    SweepCompleted {
        company_id: Uuid,
        assets_discovered: usize,
        assets_processed: usize,
        assets_failed: usize,
        alerts_emitted: usize,
        timestamp: DateTime<Utc>,
    },
}

impl ZeloEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            ZeloEvent::AlertCreated { .. } => "AlertCreated",
            ZeloEvent::AssetAnalyzed { .. } => "AssetAnalyzed",
            ZeloEvent::SweepCompleted { .. } => "SweepCompleted",
        }
    }
}

/// Broadcast bus for Zelo events
///
/// Cheap to clone; all clones share the same channel. Emission never fails
/// the emitting pipeline: an event with no subscribers is simply dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ZeloEvent>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// Slow subscribers that fall more than `capacity` events behind start
    /// losing the oldest events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ZeloEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: ZeloEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Event emitted with no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_emitted_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(ZeloEvent::SweepCompleted {
            company_id: Uuid::new_v4(),
            assets_discovered: 3,
            assets_processed: 3,
            assets_failed: 0,
            alerts_emitted: 1,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.expect("Should receive event");
        assert_eq!(event.event_type(), "SweepCompleted");
    }

    #[test]
    fn emit_without_subscribers_does_not_panic() {
        let bus = EventBus::new(4);
        bus.emit(ZeloEvent::AssetAnalyzed {
            asset_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            problem_events: 0,
            keywords_tracked: 0,
            alerts_emitted: 0,
            timestamp: Utc::now(),
        });
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = ZeloEvent::AlertCreated {
            alert_id: Uuid::new_v4(),
            asset_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            keyword: "vazamento".to_string(),
            severity: AlertSeverity::Medium,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"AlertCreated\""));
        assert!(json.contains("\"severity\":\"medium\""));
    }
}
