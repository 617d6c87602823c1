//! Forget-with-summary policy — shrink the projection, keep the gist.
//!
//! For every active directive, the target observation (and the directive
//! itself) joins the forgotten-id set of a single forgetting record; trimmed
//! summaries are concatenated one per line, prefixed `Response redacted: `,
//! and surface as a condensation-summary marker at the earliest redacted
//! position. Directives whose target no longer resolves are still consumed —
//! a stale directive must never be reconsidered on the next run.

use std::collections::HashSet;

use tracing::debug;

use alembic_core::event::{Condensation, EventId};

use crate::condenser::{resolve_target, Condensed, Condenser};
use crate::view::View;

/// Prefix for every redaction summary line.
pub const REDACTION_PREFIX: &str = "Response redacted: ";

/// The forget-with-summary condenser (canonical policy A).
#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceCondenser;

impl Condenser for RelevanceCondenser {
    fn condense(&self, view: View) -> Condensed {
        if view.directives().is_empty() {
            return Condensed::Unchanged(view);
        }

        let mut forgotten: Vec<EventId> = Vec::new();
        let mut seen: HashSet<EventId> = HashSet::new();
        let mut summary_lines: Vec<String> = Vec::new();
        let mut summary_offsets: Vec<usize> = Vec::new();

        for directive_event in view.directives() {
            let Some(directive) = directive_event.as_directive() else {
                continue;
            };

            match resolve_target(&view, &directive.target) {
                Some((index, target)) if target.is_observation() => {
                    // First directive wins; duplicates deduplicate by id.
                    if seen.insert(target.id.clone()) {
                        forgotten.push(target.id.clone());
                        summary_offsets.push(index);
                    }
                }
                Some((_, target)) => {
                    debug!(
                        directive = %directive_event.id,
                        target = %target.id,
                        "directive target is not an observation; keeping event in view"
                    );
                }
                None => {
                    debug!(
                        directive = %directive_event.id,
                        "directive target not present in view; skipping"
                    );
                }
            }

            // Resolved or not, the directive itself is retired.
            if seen.insert(directive_event.id.clone()) {
                forgotten.push(directive_event.id.clone());
            }

            let summary = directive.summary.trim();
            if !summary.is_empty() {
                summary_lines.push(format!("{REDACTION_PREFIX}{summary}"));
            }
        }

        if forgotten.is_empty() {
            return Condensed::Unchanged(view);
        }

        let summary = if summary_lines.is_empty() {
            None
        } else {
            Some(summary_lines.join("\n"))
        };
        let summary_offset = summary_offsets.into_iter().min();

        Condensed::Forget(Condensation {
            forgotten_event_ids: forgotten,
            summary,
            summary_offset,
        })
    }
}
