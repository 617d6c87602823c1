//! Redact-in-place policy — stable turn count, replaced content.
//!
//! Alternative to forgetting: observation payloads are overwritten with a
//! redaction string while the event sequence keeps its exact length and
//! order. Useful when downstream formatting assumes a stable count of
//! tool-result turns. Directives stay in the active set; re-running the
//! policy recomputes byte-identical redaction strings, so a second pass
//! changes nothing observable.

use std::collections::HashMap;

use tracing::debug;

use alembic_core::event::{EventId, EventKind, ObservationBody};

use crate::condenser::{resolve_target, Condensed, Condenser};
use crate::relevance::REDACTION_PREFIX;
use crate::view::View;

/// The redact-in-place condenser (canonical policy B).
#[derive(Debug, Clone, Copy, Default)]
pub struct InPlaceRedactionCondenser;

impl Condenser for InPlaceRedactionCondenser {
    fn condense(&self, view: View) -> Condensed {
        if view.directives().is_empty() {
            return Condensed::Unchanged(view);
        }

        // Map each resolvable target to its redaction string. First directive
        // wins when several target the same observation.
        let mut redactions: HashMap<EventId, String> = HashMap::new();
        for directive_event in view.directives() {
            let Some(directive) = directive_event.as_directive() else {
                continue;
            };
            let summary = directive.summary.trim();
            if summary.is_empty() {
                continue;
            }

            match resolve_target(&view, &directive.target) {
                Some((_, target)) if target.is_observation() => {
                    redactions
                        .entry(target.id.clone())
                        .or_insert_with(|| format!("{REDACTION_PREFIX}{summary}"));
                }
                Some((_, target)) => {
                    debug!(
                        directive = %directive_event.id,
                        target = %target.id,
                        "directive target is not an observation; ignoring"
                    );
                }
                None => {
                    debug!(
                        directive = %directive_event.id,
                        "directive target not present in view; ignoring"
                    );
                }
            }
        }

        if redactions.is_empty() {
            return Condensed::Unchanged(view);
        }

        // Single walk: rewrite targeted observations in place, keeping id,
        // tool name, and call id so action/observation pairing survives.
        // Everything else passes through untouched.
        let View {
            mut events,
            directives,
        } = view;
        for event in &mut events {
            let Some(text) = redactions.get(&event.id) else {
                continue;
            };
            if let EventKind::Observation { body, .. } = &mut event.kind {
                let replacement = match &*body {
                    ObservationBody::Success { .. } => ObservationBody::Success {
                        output: text.clone(),
                    },
                    ObservationBody::Error { .. } => ObservationBody::Error {
                        message: text.clone(),
                    },
                    ObservationBody::Rejected { .. } => ObservationBody::Rejected {
                        reason: text.clone(),
                    },
                };
                *body = replacement;
            }
        }

        Condensed::Rewritten(View { events, directives })
    }
}
