//! Materialized message sequence — the flattened, model-facing turn list.
//!
//! Each run of consecutive actions sharing a response id collapses into one
//! logical assistant turn (several tool calls from one model turn become a
//! single outgoing assistant message); each observation becomes one
//! tool-result turn. The mapping is derived on demand from a view and never
//! persisted: a positional index is only meaningful against the view the
//! model just saw.

use serde::{Deserialize, Serialize};

use alembic_core::event::{Event, EventId, EventKind, Role};

/// One tool call within a collapsed assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: serde_json::Value,
}

/// A logical turn in the model-facing message sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "turn", rename_all = "snake_case")]
pub enum Turn {
    /// A conversational message.
    Message { role: Role, content: String },

    /// A collapsed assistant turn: every action from one model response.
    Assistant {
        response_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thought: Option<String>,
        calls: Vec<ToolInvocation>,
    },

    /// A tool-result turn, backed by exactly one observation event.
    ToolResult {
        event_id: EventId,
        call_id: String,
        tool_name: String,
        content: String,
    },

    /// A condensation-summary marker surfaced to the model.
    Summary { content: String },
}

/// Flatten a view's event sequence into logical turns.
///
/// Directive events never materialize — they are runtime bookkeeping, not
/// model-visible turns.
pub fn materialize(events: &[Event]) -> Vec<Turn> {
    let mut turns: Vec<Turn> = Vec::new();

    for event in events {
        match &event.kind {
            EventKind::Message { role, content } => turns.push(Turn::Message {
                role: *role,
                content: content.clone(),
            }),

            EventKind::Action {
                tool_name,
                call_id,
                response_id,
                arguments,
                thought,
            } => {
                let invocation = ToolInvocation {
                    call_id: call_id.clone(),
                    tool_name: tool_name.clone(),
                    arguments: arguments.clone(),
                };
                match turns.last_mut() {
                    Some(Turn::Assistant {
                        response_id: current,
                        calls,
                        ..
                    }) if current == response_id => calls.push(invocation),
                    _ => turns.push(Turn::Assistant {
                        response_id: response_id.clone(),
                        thought: thought.clone(),
                        calls: vec![invocation],
                    }),
                }
            }

            EventKind::Observation {
                tool_name,
                call_id,
                body,
            } => turns.push(Turn::ToolResult {
                event_id: event.id.clone(),
                call_id: call_id.clone(),
                tool_name: tool_name.clone(),
                content: body.content().to_string(),
            }),

            EventKind::CondensationSummary { summary } => turns.push(Turn::Summary {
                content: summary.clone(),
            }),

            EventKind::Directive(_) | EventKind::Condensation(_) => {}
        }
    }

    turns
}
