//! # Alembic Context
//!
//! The context-condensation engine: rebuildable projections of the event log
//! and the policies that shrink them.
//!
//! As a conversation grows its log exceeds the model's usable context budget.
//! This crate derives a [`View`] (the live events plus active directives)
//! from the full log, and runs a [`Condenser`] over it to retire stale
//! observations — either by forgetting them with a summary marker
//! ([`RelevanceCondenser`]) or by redacting their content in place
//! ([`InPlaceRedactionCondenser`]). Action/observation pairing, event order,
//! and idempotence are preserved by construction; the durable log is only
//! ever extended, never rewritten.

pub mod condenser;
pub mod config;
pub mod materialize;
pub mod redact;
pub mod relevance;
pub mod view;

pub use condenser::{apply_condensation, Applied, Condensed, Condenser};
pub use config::{CondenserConfig, Policy};
pub use materialize::{materialize, ToolInvocation, Turn};
pub use redact::InPlaceRedactionCondenser;
pub use relevance::{RelevanceCondenser, REDACTION_PREFIX};
pub use view::View;
