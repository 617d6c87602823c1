//! # Alembic Core
//!
//! Domain types, traits, and error definitions for the Alembic
//! context-condensation engine. This crate has **zero framework
//! dependencies** — it defines the event model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! The event model is a closed tagged-variant type ([`event::EventKind`]):
//! redaction logic switches exhaustively over the variant tag instead of
//! probing an open inheritance hierarchy. The log is append-only; everything
//! the model sees is a rebuildable projection computed in `alembic-context`.

pub mod error;
pub mod event;
pub mod log;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{DirectiveError, Error, Result, ToolError};
pub use event::{
    Condensation, Directive, DirectiveTarget, Event, EventId, EventKind, ObservationBody, Role,
    Source, SUMMARY_MAX_CHARS,
};
pub use log::{AppendCallback, EventLog};
pub use tool::{Tool, ToolCall, ToolDefinition, ToolRegistry, ToolResult};
