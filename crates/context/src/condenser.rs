//! Condenser contract and the per-step application driver.
//!
//! A condenser consumes a [`View`] and its active directives and produces
//! either an (unchanged or rewritten) view, or a forgetting record the
//! caller appends to the log. The two canonical policies live in
//! [`crate::relevance`] (forget-with-summary) and [`crate::redact`]
//! (redact-in-place); alternative policies plug in through the same trait.
//!
//! Everything here is synchronous, single-threaded per conversation, and
//! free of blocking I/O — pure computation over in-memory sequences.

use tracing::{debug, info};

use alembic_core::event::{Condensation, DirectiveTarget, Event};
use alembic_core::log::EventLog;

use crate::materialize::Turn;
use crate::view::View;

/// The outcome of one condenser run.
#[derive(Debug, Clone, PartialEq)]
pub enum Condensed {
    /// Nothing to do; the input view is handed back untouched.
    Unchanged(View),

    /// In-place rewrite: same event count and order, some content replaced.
    Rewritten(View),

    /// A forgetting record to append to the log. The caller appends it and
    /// rebuilds the view; forgotten ids then drop out of reconstruction.
    Forget(Condensation),
}

impl Condensed {
    /// The resulting view, for outcomes that carry one.
    pub fn view(&self) -> Option<&View> {
        match self {
            Self::Unchanged(v) | Self::Rewritten(v) => Some(v),
            Self::Forget(_) => None,
        }
    }
}

/// A condensation policy.
pub trait Condenser: Send + Sync {
    fn condense(&self, view: View) -> Condensed;
}

/// Resolve a directive target against the current view.
///
/// Returns the target's position in the view's event sequence along with the
/// event itself. Event-id addressing can land on any live event (the caller
/// decides whether a non-observation target is inert); call-id and index
/// addressing only ever yield observations.
pub(crate) fn resolve_target<'a>(
    view: &'a View,
    target: &DirectiveTarget,
) -> Option<(usize, &'a Event)> {
    match target {
        DirectiveTarget::Event(id) => view
            .events
            .iter()
            .position(|e| &e.id == id)
            .map(|i| (i, &view.events[i])),

        DirectiveTarget::Call(call_id) => view
            .events
            .iter()
            .position(|e| e.is_observation() && e.call_id() == Some(call_id.as_str()))
            .map(|i| (i, &view.events[i])),

        // Positional addressing is only meaningful against the current
        // materialization; re-derive it here and require a tool-result turn.
        DirectiveTarget::MessageIndex(index) => {
            let turns = view.materialize();
            match turns.get(*index) {
                Some(Turn::ToolResult { event_id, .. }) => view
                    .events
                    .iter()
                    .position(|e| &e.id == event_id)
                    .map(|i| (i, &view.events[i])),
                Some(_) => {
                    debug!(index, "message index does not address a tool-result turn");
                    None
                }
                None => {
                    debug!(index, "message index out of range for current view");
                    None
                }
            }
        }
    }
}

/// What [`apply_condensation`] did to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// No directive had any effect.
    Unchanged,
    /// Observation content was replaced in the projection only.
    Rewritten,
    /// A condensation event was appended to the log.
    Condensed { forgotten: usize },
}

/// Run one condensation step: rebuild the view, consult the policy, and
/// append the forgetting record when one is produced.
///
/// Returns the view to format into the next model request, plus what
/// happened. The log is the only thing mutated, and only by appending.
pub fn apply_condensation(log: &mut EventLog, condenser: &dyn Condenser) -> (View, Applied) {
    let view = View::from_events(log.events());
    match condenser.condense(view) {
        Condensed::Unchanged(view) => (view, Applied::Unchanged),
        Condensed::Rewritten(view) => (view, Applied::Rewritten),
        Condensed::Forget(record) => {
            let forgotten = record.forgotten_event_ids.len();
            info!(forgotten, "Applying condensation to event log");
            log.push(Event::condensation(
                record.forgotten_event_ids,
                record.summary,
                record.summary_offset,
            ));
            (View::from_events(log.events()), Applied::Condensed { forgotten })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alembic_core::event::EventId;

    fn sample_view() -> (View, EventId) {
        let obs = Event::observation("shell", "c1", "listing");
        let obs_id = obs.id.clone();
        let events = vec![
            Event::user("list files"),
            Event::action("shell", "c1", "r1", serde_json::json!({})),
            obs,
        ];
        (View::from_events(&events), obs_id)
    }

    #[test]
    fn resolve_by_event_id() {
        let (view, obs_id) = sample_view();
        let (index, event) = resolve_target(&view, &DirectiveTarget::Event(obs_id.clone())).unwrap();
        assert_eq!(index, 2);
        assert_eq!(event.id, obs_id);
    }

    #[test]
    fn resolve_by_call_id() {
        let (view, obs_id) = sample_view();
        let (_, event) = resolve_target(&view, &DirectiveTarget::Call("c1".into())).unwrap();
        assert_eq!(event.id, obs_id);
    }

    #[test]
    fn resolve_by_message_index() {
        let (view, obs_id) = sample_view();
        // Turns: [user message, assistant, tool result]
        let (_, event) = resolve_target(&view, &DirectiveTarget::MessageIndex(2)).unwrap();
        assert_eq!(event.id, obs_id);
    }

    #[test]
    fn index_on_non_tool_turn_does_not_resolve() {
        let (view, _) = sample_view();
        assert!(resolve_target(&view, &DirectiveTarget::MessageIndex(0)).is_none());
        assert!(resolve_target(&view, &DirectiveTarget::MessageIndex(1)).is_none());
    }

    #[test]
    fn index_out_of_range_does_not_resolve() {
        let (view, _) = sample_view();
        assert!(resolve_target(&view, &DirectiveTarget::MessageIndex(9)).is_none());
    }

    #[test]
    fn unknown_id_does_not_resolve() {
        let (view, _) = sample_view();
        assert!(resolve_target(&view, &DirectiveTarget::Event(EventId::new())).is_none());
        assert!(resolve_target(&view, &DirectiveTarget::Call("missing".into())).is_none());
    }

    #[test]
    fn event_id_can_resolve_to_non_observation() {
        let (view, _) = sample_view();
        let message_id = view.events()[0].id.clone();
        let (_, event) = resolve_target(&view, &DirectiveTarget::Event(message_id)).unwrap();
        assert!(!event.is_observation());
    }
}
