//! `mark_context_redundant` — the tool through which the model requests a
//! condensation.
//!
//! The tool validates its input, builds a directive event, and appends it to
//! the log (through the injected callback when one is wired, directly
//! otherwise). It never redacts anything itself: resolution and application
//! belong to the condenser, at the next step. Event-id and call-id addressing
//! may reference any event ever seen; a message index is only checked against
//! the view at application time.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use alembic_core::error::{DirectiveError, ToolError};
use alembic_core::event::{DirectiveTarget, Event, EventId, SUMMARY_MAX_CHARS};
use alembic_core::log::{AppendCallback, EventLog};
use alembic_core::tool::{Tool, ToolResult};

const TOOL_NAME: &str = "mark_context_redundant";

const TOOL_DESCRIPTION: &str = "\
Background tool for flagging stale, no longer relevant tool interactions.

Provide the identifier of a prior tool call or observation that no longer aids \
the current discussion, along with a short synopsis to preserve continuity. The \
condenser will retire the observation when safe while keeping the supplied \
summary available to the agent.

Guardrails:
- Only target tool calls or their observations that you are confident are no \
longer relevant.
- Never reference user messages, system prompts, or security warnings.
- Keep summaries concise (1-3 sentences) and avoid introducing new facts.";

/// Step context stamped onto every directive this tool records, for auditing.
#[derive(Debug, Clone, Default)]
pub struct StepContext {
    /// The action event whose tool call invoked this tool.
    pub requesting_action_id: Option<EventId>,
    /// Model response id associated with that tool call.
    pub response_id: Option<String>,
    /// Agent step ordinal.
    pub step_index: Option<usize>,
}

/// The directive-issuing tool.
pub struct MarkContextRedundantTool {
    log: Arc<Mutex<EventLog>>,
    append: Option<AppendCallback>,
    summary_max_chars: usize,
    step: StepContext,
}

impl MarkContextRedundantTool {
    /// Create the tool against a shared conversation log.
    pub fn new(log: Arc<Mutex<EventLog>>) -> Self {
        Self {
            log,
            append: None,
            summary_max_chars: SUMMARY_MAX_CHARS,
            step: StepContext::default(),
        }
    }

    /// Route appends through an event bus callback instead of the log.
    pub fn with_append_callback(mut self, callback: AppendCallback) -> Self {
        self.append = Some(callback);
        self
    }

    /// Override the accepted summary length (never above the hard cap).
    pub fn with_summary_limit(mut self, max_chars: usize) -> Self {
        self.summary_max_chars = max_chars.min(SUMMARY_MAX_CHARS);
        self
    }

    /// Attach per-step audit context to subsequently recorded directives.
    pub fn with_step_context(mut self, step: StepContext) -> Self {
        self.step = step;
        self
    }

    /// Pick exactly one addressing token out of the arguments.
    fn parse_target(arguments: &serde_json::Value) -> Result<DirectiveTarget, ToolError> {
        let event_id = arguments.get("event_id").filter(|v| !v.is_null());
        let call_id = arguments.get("call_id").filter(|v| !v.is_null());
        let index = arguments.get("message_index").filter(|v| !v.is_null());

        let supplied =
            [event_id.is_some(), call_id.is_some(), index.is_some()]
                .iter()
                .filter(|p| **p)
                .count();
        match supplied {
            0 => return Err(DirectiveError::MissingTarget.into()),
            1 => {}
            _ => return Err(DirectiveError::ConflictingTargets.into()),
        }

        if let Some(value) = event_id {
            let id = value.as_str().ok_or_else(|| {
                ToolError::InvalidArguments("'event_id' must be a string".into())
            })?;
            return Ok(DirectiveTarget::Event(EventId::from(id)));
        }
        if let Some(value) = call_id {
            let call = value.as_str().ok_or_else(|| {
                ToolError::InvalidArguments("'call_id' must be a string".into())
            })?;
            return Ok(DirectiveTarget::Call(call.to_string()));
        }
        // message_index is the only remaining possibility.
        let value = index.and_then(|v| v.as_i64()).ok_or_else(|| {
            ToolError::InvalidArguments("'message_index' must be an integer".into())
        })?;
        if value < 0 {
            return Err(DirectiveError::NegativeIndex.into());
        }
        Ok(DirectiveTarget::MessageIndex(value as usize))
    }

    fn record(&self, directive: Event) -> Result<(), ToolError> {
        if let Some(callback) = &self.append {
            callback(directive);
            return Ok(());
        }
        debug!(
            directive = %directive.id,
            "No append callback wired; appending directive directly to log"
        );
        let mut log = self.log.lock().map_err(|_| ToolError::ExecutionFailed {
            tool_name: TOOL_NAME.into(),
            reason: "event log lock poisoned".into(),
        })?;
        log.push(directive);
        Ok(())
    }
}

#[async_trait]
impl Tool for MarkContextRedundantTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        TOOL_DESCRIPTION
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "event_id": {
                    "type": "string",
                    "description": "Event id of the observation to redact."
                },
                "call_id": {
                    "type": "string",
                    "description": "Tool call id shared by the action and the observation to redact."
                },
                "message_index": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Index of the tool-result message in the message list you last saw."
                },
                "summary": {
                    "type": "string",
                    "description": "Short synopsis (1-3 sentences) that keeps the continuity of the conversation."
                }
            },
            "required": ["summary"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let target = Self::parse_target(&arguments)?;

        let summary = arguments["summary"].as_str().ok_or_else(|| {
            ToolError::InvalidArguments("Missing 'summary' argument".into())
        })?;
        let trimmed = summary.trim();
        if trimmed.is_empty() {
            return Err(DirectiveError::EmptySummary.into());
        }
        if trimmed.chars().count() > self.summary_max_chars {
            return Err(DirectiveError::SummaryTooLong {
                max: self.summary_max_chars,
            }
            .into());
        }

        let mut directive = Event::directive(target.clone(), trimmed)?;
        if let Some(action_id) = &self.step.requesting_action_id {
            directive = directive.with_requesting_action(action_id.clone());
        }
        if let Some(response_id) = &self.step.response_id {
            directive = directive.with_response_id(response_id.clone());
        }
        if let Some(step) = self.step.step_index {
            directive = directive.with_step_index(step);
        }

        self.record(directive)?;

        // Only direct event-id addressing can be echoed back as accepted;
        // call-id and index addressing are resolved lazily by the condenser.
        let accepted: Vec<String> = match &target {
            DirectiveTarget::Event(id) => vec![id.to_string()],
            _ => Vec::new(),
        };
        let message = match &target {
            DirectiveTarget::Event(id) => format!(
                "Condensation directive recorded. The condenser will retire {id} when applied."
            ),
            _ => "Condensation directive recorded; the condenser will resolve and apply the redaction.".to_string(),
        };

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: message,
            data: Some(serde_json::json!({
                "accepted_event_ids": accepted,
                "rejected_event_ids": [],
            })),
        })
    }
}
