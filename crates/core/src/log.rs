//! The append-only event log for a single conversation.
//!
//! The durable persistence layer lives outside this workspace; what the
//! engine consumes is this in-memory, identifier-keyed, ordered sequence.
//! Events are only ever appended — projections (`alembic-context`) decide
//! what the model actually sees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::event::{Event, EventId};

/// Callback used to append an event through an external event bus instead of
/// mutating the log directly.
pub type AppendCallback = Arc<dyn Fn(Event) + Send + Sync>;

/// Ordered, append-only sequence of immutable conversation events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    /// Ordered events.
    events: Vec<Event>,

    /// When this log was created.
    pub created_at: DateTime<Utc>,

    /// When the last event was appended.
    pub updated_at: DateTime<Utc>,
}

impl EventLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a log from an already-ordered sequence of events (e.g. a replay
    /// from the persistence layer).
    pub fn from_events(events: Vec<Event>) -> Self {
        let now = Utc::now();
        Self {
            events,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append an event. The only mutation the log supports.
    pub fn push(&mut self, event: Event) {
        self.updated_at = Utc::now();
        self.events.push(event);
    }

    /// The ordered event sequence.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Iterate over events in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Look up an event by id.
    pub fn get(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|e| &e.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The most recently appended event.
    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_log_is_empty() {
        let log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert!(log.last().is_none());
    }

    #[test]
    fn push_preserves_order() {
        let mut log = EventLog::new();
        let first = Event::user("first");
        let second = Event::assistant("second");
        let first_id = first.id.clone();
        log.push(first);
        log.push(second);

        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].id, first_id);
        assert_eq!(log.last().unwrap().kind_name(), "message");
    }

    #[test]
    fn push_tracks_updates() {
        let mut log = EventLog::new();
        let created = log.created_at;
        log.push(Event::user("hello"));
        assert!(log.updated_at >= created);
    }

    #[test]
    fn lookup_by_id() {
        let mut log = EventLog::new();
        let event = Event::user("findable");
        let id = event.id.clone();
        log.push(event);

        assert!(log.get(&id).is_some());
        assert!(log.get(&EventId::new()).is_none());
    }

    #[test]
    fn serialization_roundtrip() {
        let mut log = EventLog::new();
        log.push(Event::user("hello"));
        log.push(Event::action("shell", "c1", "r1", serde_json::json!({})));

        let json = serde_json::to_string(&log).unwrap();
        let back: EventLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.events()[1].call_id(), Some("c1"));
    }
}
