//! The View — a derived, rebuildable projection of the event log.
//!
//! A view is a value: cheap to discard, recomputed on demand from the full
//! log, never shared mutable state. Construction is pure and never touches
//! the input sequence. It yields (a) the ordered events visible to the model
//! and (b) the set of still-active directives found among them.
//!
//! Construction rules:
//! - Ids named by any condensation record are dropped, and the condensation
//!   records themselves never surface.
//! - Each condensation with a summary contributes a synthesized
//!   condensation-summary marker at its recorded offset.
//! - Directive events are bookkeeping, not model-visible turns; they are
//!   collected into the active-directive set instead of the event sequence.
//! - An action whose observation is gone (forgotten, or never produced) is
//!   dropped, so the model never sees an orphaned tool call.

use std::collections::HashSet;

use alembic_core::event::{Event, EventId, EventKind};

use crate::materialize::{materialize, Turn};

/// The model-facing projection of an event log.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub(crate) events: Vec<Event>,
    pub(crate) directives: Vec<Event>,
}

impl View {
    /// Build a view from the full ordered event sequence.
    ///
    /// Pure and side-effect-free; an empty log yields an empty view.
    pub fn from_events(events: &[Event]) -> Self {
        let mut forgotten: HashSet<&EventId> = HashSet::new();
        for event in events {
            if let EventKind::Condensation(c) = &event.kind {
                forgotten.extend(c.forgotten_event_ids.iter());
            }
        }

        let live: Vec<&Event> = events
            .iter()
            .filter(|e| !forgotten.contains(&e.id))
            .filter(|e| !matches!(e.kind, EventKind::Condensation(_)))
            .collect();

        let directives: Vec<Event> = live
            .iter()
            .filter(|e| matches!(e.kind, EventKind::Directive(_)))
            .map(|e| (*e).clone())
            .collect();

        let visible: Vec<Event> = live
            .iter()
            .filter(|e| !matches!(e.kind, EventKind::Directive(_)))
            .map(|e| (*e).clone())
            .collect();

        let mut visible = filter_orphaned_actions(visible);

        // Surviving condensation summaries, inserted at their recorded
        // offsets (clamped; records without an offset go to the end). The
        // marker reuses the condensation record's id and timestamp so that
        // rebuilding an unchanged log yields an identical view.
        for event in events {
            if forgotten.contains(&event.id) {
                continue;
            }
            if let EventKind::Condensation(c) = &event.kind {
                if let Some(summary) = &c.summary {
                    let at = c
                        .summary_offset
                        .map_or(visible.len(), |o| o.min(visible.len()));
                    visible.insert(
                        at,
                        Event {
                            id: event.id.clone(),
                            source: event.source,
                            timestamp: event.timestamp,
                            kind: EventKind::CondensationSummary {
                                summary: summary.clone(),
                            },
                        },
                    );
                }
            }
        }

        Self {
            events: visible,
            directives,
        }
    }

    /// The ordered events visible to the model.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Active (not yet forgotten) directives, in log order.
    pub fn directives(&self) -> &[Event] {
        &self.directives
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The materialized message sequence handed to the request formatter.
    pub fn materialize(&self) -> Vec<Turn> {
        materialize(&self.events)
    }
}

/// Drop actions whose observation is absent, keeping pairing intact.
///
/// Each observation consumes the nearest preceding unconsumed action with the
/// same call id; whatever actions remain unconsumed are filtered out. Lone
/// observations are kept — they are still valid redaction targets.
fn filter_orphaned_actions(events: Vec<Event>) -> Vec<Event> {
    let mut consumed: HashSet<usize> = HashSet::new();
    for (i, event) in events.iter().enumerate() {
        if !event.is_observation() {
            continue;
        }
        let call = event.call_id();
        let matched = events[..i]
            .iter()
            .enumerate()
            .rev()
            .find(|(j, e)| {
                matches!(e.kind, EventKind::Action { .. })
                    && e.call_id() == call
                    && !consumed.contains(j)
            })
            .map(|(j, _)| j);
        if let Some(j) = matched {
            consumed.insert(j);
        }
    }

    events
        .into_iter()
        .enumerate()
        .filter(|(i, e)| !matches!(e.kind, EventKind::Action { .. }) || consumed.contains(i))
        .map(|(_, e)| e)
        .collect()
}
