//! Conversation event model — the append-only vocabulary of the runtime.
//!
//! Every turn of an agent conversation is recorded as an immutable [`Event`]:
//! user/assistant messages, model-issued tool invocations ([`EventKind::Action`]),
//! their results ([`EventKind::Observation`]), redaction requests
//! ([`EventKind::Directive`]), and the condensation records produced when the
//! engine retires stale events from the model-facing projection.
//!
//! Events are created once, appended to the log, and never mutated in place.
//! Redaction happens in the *projection* (see `alembic-context`), not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DirectiveError;

/// Maximum length of a directive summary, in characters, after trimming.
pub const SUMMARY_MAX_CHARS: usize = 1028;

/// Unique identifier for an event (UUID v4, stable for the event's lifetime).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// The end user
    User,
    /// The model-driven agent
    Agent,
    /// The runtime itself (directives, condensation records)
    Environment,
    /// Tool execution
    Tool,
}

/// The role of a conversational message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// The result payload of an executed action.
///
/// Success, error, and user-rejection results are all "an observation" to the
/// redaction logic — each is an equally valid redaction target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ObservationBody {
    /// The tool ran and produced output.
    Success { output: String },
    /// The tool ran and failed.
    Error { message: String },
    /// The user rejected the invocation before it ran.
    Rejected { reason: String },
}

impl ObservationBody {
    /// The human-readable content of this observation, whatever its outcome.
    pub fn content(&self) -> &str {
        match self {
            Self::Success { output } => output,
            Self::Error { message } => message,
            Self::Rejected { reason } => reason,
        }
    }
}

/// How a directive addresses its target observation.
///
/// Event-id and call-id addressing are stable across view rebuilds and are
/// resolved lazily by the condenser. A message index is only meaningful
/// against the view the model just saw, so it is re-resolved against the
/// *current* view at application time and never persisted as a permanent
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveTarget {
    /// Direct event identifier of the observation.
    Event(EventId),
    /// The call identifier shared by an action and its observation.
    Call(String),
    /// Index into the materialized message sequence.
    MessageIndex(usize),
}

/// A request to redact one prior observation from the model-facing view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    /// Which observation to redact.
    pub target: DirectiveTarget,

    /// Short synopsis (1–3 sentences) that keeps conversational continuity.
    /// Non-empty after trimming, at most [`SUMMARY_MAX_CHARS`] characters.
    pub summary: String,

    /// The action event whose tool call produced this directive, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requesting_action_id: Option<EventId>,

    /// Model response identifier associated with the requesting tool call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,

    /// Agent step ordinal when the directive was recorded (for auditing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_index: Option<usize>,
}

/// A forgetting record: the ids to drop from future views, plus an optional
/// replacement summary and its logical insertion offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condensation {
    /// Event ids no longer part of the projection (deduplicated).
    pub forgotten_event_ids: Vec<EventId>,

    /// Replacement summary text, one `Response redacted:` line per directive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Position in the pre-condensation view where the summary belongs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_offset: Option<usize>,
}

/// The discriminated payload of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// A conversational turn.
    Message { role: Role, content: String },

    /// A model-issued tool invocation.
    Action {
        tool_name: String,
        /// Pairing key shared with the resulting observation.
        call_id: String,
        /// Groups actions emitted within the same model turn.
        response_id: String,
        arguments: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thought: Option<String>,
    },

    /// The result of executing an action.
    Observation {
        tool_name: String,
        call_id: String,
        body: ObservationBody,
    },

    /// A redaction request recorded by the directive-issuing tool.
    Directive(Directive),

    /// A forgetting record appended after the condenser runs.
    Condensation(Condensation),

    /// Marker synthesized into views where forgotten events were removed.
    CondensationSummary { summary: String },
}

/// A single immutable conversation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Globally unique, stable identifier.
    pub id: EventId,

    /// Who produced this event.
    pub source: Source,

    /// When this event was recorded.
    pub timestamp: DateTime<Utc>,

    /// Kind-specific payload.
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    fn new(source: Source, kind: EventKind) -> Self {
        Self {
            id: EventId::new(),
            source,
            timestamp: Utc::now(),
            kind,
        }
    }

    /// Create a user message event.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(
            Source::User,
            EventKind::Message {
                role: Role::User,
                content: content.into(),
            },
        )
    }

    /// Create an assistant message event.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(
            Source::Agent,
            EventKind::Message {
                role: Role::Assistant,
                content: content.into(),
            },
        )
    }

    /// Create a system message event.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(
            Source::Environment,
            EventKind::Message {
                role: Role::System,
                content: content.into(),
            },
        )
    }

    /// Create an action event (a model-issued tool invocation).
    pub fn action(
        tool_name: impl Into<String>,
        call_id: impl Into<String>,
        response_id: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self::new(
            Source::Agent,
            EventKind::Action {
                tool_name: tool_name.into(),
                call_id: call_id.into(),
                response_id: response_id.into(),
                arguments,
                thought: None,
            },
        )
    }

    /// Attach a reasoning snippet to an action event. No-op for other kinds.
    pub fn with_thought(mut self, text: impl Into<String>) -> Self {
        if let EventKind::Action { thought, .. } = &mut self.kind {
            *thought = Some(text.into());
        }
        self
    }

    /// Create a successful observation event.
    pub fn observation(
        tool_name: impl Into<String>,
        call_id: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self::new(
            Source::Tool,
            EventKind::Observation {
                tool_name: tool_name.into(),
                call_id: call_id.into(),
                body: ObservationBody::Success {
                    output: output.into(),
                },
            },
        )
    }

    /// Create an error observation event.
    pub fn observation_error(
        tool_name: impl Into<String>,
        call_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            Source::Tool,
            EventKind::Observation {
                tool_name: tool_name.into(),
                call_id: call_id.into(),
                body: ObservationBody::Error {
                    message: message.into(),
                },
            },
        )
    }

    /// Create a user-rejection observation event.
    pub fn observation_rejected(
        tool_name: impl Into<String>,
        call_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(
            Source::Tool,
            EventKind::Observation {
                tool_name: tool_name.into(),
                call_id: call_id.into(),
                body: ObservationBody::Rejected {
                    reason: reason.into(),
                },
            },
        )
    }

    /// Create a directive event. The summary is trimmed and validated:
    /// it must be non-empty and at most [`SUMMARY_MAX_CHARS`] characters.
    pub fn directive(
        target: DirectiveTarget,
        summary: impl Into<String>,
    ) -> Result<Self, DirectiveError> {
        let trimmed = summary.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(DirectiveError::EmptySummary);
        }
        if trimmed.chars().count() > SUMMARY_MAX_CHARS {
            return Err(DirectiveError::SummaryTooLong {
                max: SUMMARY_MAX_CHARS,
            });
        }
        Ok(Self::new(
            Source::Environment,
            EventKind::Directive(Directive {
                target,
                summary: trimmed,
                requesting_action_id: None,
                response_id: None,
                step_index: None,
            }),
        ))
    }

    /// Record which action produced this directive. No-op for other kinds.
    pub fn with_requesting_action(mut self, action_id: EventId) -> Self {
        if let EventKind::Directive(d) = &mut self.kind {
            d.requesting_action_id = Some(action_id);
        }
        self
    }

    /// Record the model response id behind this directive. No-op for other kinds.
    pub fn with_response_id(mut self, response_id: impl Into<String>) -> Self {
        if let EventKind::Directive(d) = &mut self.kind {
            d.response_id = Some(response_id.into());
        }
        self
    }

    /// Record the agent step ordinal on this directive. No-op for other kinds.
    pub fn with_step_index(mut self, step: usize) -> Self {
        if let EventKind::Directive(d) = &mut self.kind {
            d.step_index = Some(step);
        }
        self
    }

    /// Create a condensation (forgetting) event.
    pub fn condensation(
        forgotten_event_ids: Vec<EventId>,
        summary: Option<String>,
        summary_offset: Option<usize>,
    ) -> Self {
        Self::new(
            Source::Environment,
            EventKind::Condensation(Condensation {
                forgotten_event_ids,
                summary,
                summary_offset,
            }),
        )
    }

    /// Create a condensation-summary marker event.
    pub fn condensation_summary(summary: impl Into<String>) -> Self {
        Self::new(
            Source::Environment,
            EventKind::CondensationSummary {
                summary: summary.into(),
            },
        )
    }

    // ── Accessors ──

    /// Wire-format name of this event's kind.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            EventKind::Message { .. } => "message",
            EventKind::Action { .. } => "action",
            EventKind::Observation { .. } => "observation",
            EventKind::Directive(_) => "directive",
            EventKind::Condensation(_) => "condensation",
            EventKind::CondensationSummary { .. } => "condensation_summary",
        }
    }

    /// Whether this event is an observation (of any outcome).
    pub fn is_observation(&self) -> bool {
        matches!(self.kind, EventKind::Observation { .. })
    }

    /// The pairing key, for actions and observations.
    pub fn call_id(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Action { call_id, .. } | EventKind::Observation { call_id, .. } => {
                Some(call_id)
            }
            _ => None,
        }
    }

    /// The directive payload, if this is a directive event.
    pub fn as_directive(&self) -> Option<&Directive> {
        match &self.kind {
            EventKind::Directive(d) => Some(d),
            _ => None,
        }
    }

    /// The condensation payload, if this is a condensation event.
    pub fn as_condensation(&self) -> Option<&Condensation> {
        match &self.kind {
            EventKind::Condensation(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_fields() {
        let event = Event::user("list the files");
        assert_eq!(event.source, Source::User);
        assert_eq!(event.kind_name(), "message");
        match &event.kind {
            EventKind::Message { role, content } => {
                assert_eq!(*role, Role::User);
                assert_eq!(content, "list the files");
            }
            _ => panic!("expected a message"),
        }
    }

    #[test]
    fn action_and_observation_share_call_id() {
        let action = Event::action("shell", "call_1", "resp_1", serde_json::json!({"cmd": "ls"}));
        let obs = Event::observation("shell", "call_1", "a.txt\nb.txt");
        assert_eq!(action.call_id(), Some("call_1"));
        assert_eq!(obs.call_id(), Some("call_1"));
        assert!(obs.is_observation());
        assert!(!action.is_observation());
    }

    #[test]
    fn observation_variants_expose_content() {
        let ok = Event::observation("shell", "c", "output");
        let err = Event::observation_error("shell", "c", "not found");
        let rej = Event::observation_rejected("shell", "c", "user said no");
        for (event, expected) in [(ok, "output"), (err, "not found"), (rej, "user said no")] {
            match &event.kind {
                EventKind::Observation { body, .. } => assert_eq!(body.content(), expected),
                _ => panic!("expected an observation"),
            }
        }
    }

    #[test]
    fn directive_trims_summary() {
        let event = Event::directive(
            DirectiveTarget::Call("call_1".into()),
            "  no longer relevant  ",
        )
        .unwrap();
        assert_eq!(event.as_directive().unwrap().summary, "no longer relevant");
        assert_eq!(event.source, Source::Environment);
    }

    #[test]
    fn directive_rejects_blank_summary() {
        let err = Event::directive(DirectiveTarget::Call("c".into()), "   ").unwrap_err();
        assert!(matches!(err, DirectiveError::EmptySummary));
    }

    #[test]
    fn directive_rejects_oversized_summary() {
        let long = "x".repeat(SUMMARY_MAX_CHARS + 1);
        let err = Event::directive(DirectiveTarget::Call("c".into()), long).unwrap_err();
        assert!(matches!(err, DirectiveError::SummaryTooLong { .. }));
    }

    #[test]
    fn directive_accepts_summary_at_limit() {
        let exact = "x".repeat(SUMMARY_MAX_CHARS);
        assert!(Event::directive(DirectiveTarget::Call("c".into()), exact).is_ok());
    }

    #[test]
    fn directive_builder_metadata() {
        let action_id = EventId::new();
        let event = Event::directive(DirectiveTarget::MessageIndex(3), "stale")
            .unwrap()
            .with_requesting_action(action_id.clone())
            .with_response_id("resp_9")
            .with_step_index(7);
        let directive = event.as_directive().unwrap();
        assert_eq!(directive.requesting_action_id, Some(action_id));
        assert_eq!(directive.response_id.as_deref(), Some("resp_9"));
        assert_eq!(directive.step_index, Some(7));
    }

    #[test]
    fn condensation_accessor() {
        let id = EventId::new();
        let event = Event::condensation(vec![id.clone()], Some("summary".into()), Some(2));
        let condensation = event.as_condensation().unwrap();
        assert_eq!(condensation.forgotten_event_ids, vec![id]);
        assert_eq!(condensation.summary_offset, Some(2));
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = Event::directive(DirectiveTarget::Event(EventId::new()), "keep the gist")
            .unwrap()
            .with_step_index(1);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""kind":"directive""#));
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn observation_serialization_tags_outcome() {
        let event = Event::observation_error("shell", "call_1", "boom");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""kind":"observation""#));
        assert!(json.contains(r#""outcome":"error""#));
    }
}
