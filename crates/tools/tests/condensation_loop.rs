//! End-to-end condensation flow: the model invokes the directive tool, the
//! view is rebuilt, the condenser applies the directive, and the next view
//! no longer carries the redacted observation. Re-running is a no-op.

use std::sync::{Arc, Mutex};

use alembic_context::{
    apply_condensation, Applied, InPlaceRedactionCondenser, RelevanceCondenser, View,
};
use alembic_core::event::{Event, EventKind, ObservationBody};
use alembic_core::log::EventLog;
use alembic_core::tool::Tool;
use alembic_tools::MarkContextRedundantTool;

fn seeded_log() -> (Arc<Mutex<EventLog>>, alembic_core::event::EventId) {
    let mut log = EventLog::new();
    log.push(Event::user("List repo files"));
    log.push(Event::action(
        "shell",
        "call_1",
        "resp_1",
        serde_json::json!({"cmd": "cd project && ls"}),
    ));
    let obs = Event::observation_error("shell", "call_1", "bash: cd project: No such file or directory");
    let obs_id = obs.id.clone();
    log.push(obs);
    (Arc::new(Mutex::new(log)), obs_id)
}

#[tokio::test]
async fn forget_with_summary_loop_is_idempotent() {
    let (log, obs_id) = seeded_log();
    let tool = MarkContextRedundantTool::new(log.clone());

    let result = tool
        .execute(serde_json::json!({
            "event_id": obs_id.to_string(),
            "summary": "Directory listing failure no longer relevant.",
        }))
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(log.lock().unwrap().len(), 4);

    drop(tool);
    let mut log = Arc::try_unwrap(log).unwrap().into_inner().unwrap();
    let (view, applied) = apply_condensation(&mut log, &RelevanceCondenser);

    // Observation and directive retired; the summary marker survives.
    assert_eq!(applied, Applied::Condensed { forgotten: 2 });
    assert!(view.events().iter().all(|e| e.id != obs_id));
    assert!(view.directives().is_empty());
    let summary = view
        .events()
        .iter()
        .find_map(|e| match &e.kind {
            EventKind::CondensationSummary { summary } => Some(summary.as_str()),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        summary,
        "Response redacted: Directory listing failure no longer relevant."
    );

    // Second pass over the unchanged log: nothing left to do.
    let (second, applied) = apply_condensation(&mut log, &RelevanceCondenser);
    assert_eq!(applied, Applied::Unchanged);
    assert_eq!(second, view);
}

#[tokio::test]
async fn redact_in_place_loop_keeps_turn_count() {
    let (log, _) = seeded_log();
    let tool = MarkContextRedundantTool::new(log.clone());

    tool.execute(serde_json::json!({
        "call_id": "call_1",
        "summary": "Failed listing superseded by later steps.",
    }))
    .await
    .unwrap();

    drop(tool);
    let mut log = Arc::try_unwrap(log).unwrap().into_inner().unwrap();
    let before = View::from_events(log.events()).len();
    let (view, applied) = apply_condensation(&mut log, &InPlaceRedactionCondenser);

    assert_eq!(applied, Applied::Rewritten);
    assert_eq!(view.len(), before);
    // Nothing was appended to the durable log.
    assert_eq!(log.len(), 4);

    let redacted = view
        .events()
        .iter()
        .find_map(|e| match &e.kind {
            EventKind::Observation { body, .. } => Some(body),
            _ => None,
        })
        .unwrap();
    assert!(matches!(redacted, ObservationBody::Error { .. }));
    assert_eq!(
        redacted.content(),
        "Response redacted: Failed listing superseded by later steps."
    );
    // The directive stays active; a second run rewrites to identical bytes.
    assert_eq!(view.directives().len(), 1);
    let (second, _) = apply_condensation(&mut log, &InPlaceRedactionCondenser);
    assert_eq!(second, view);
}

#[tokio::test]
async fn index_addressing_resolves_at_application_time() {
    let (log, obs_id) = seeded_log();
    let tool = MarkContextRedundantTool::new(log.clone());

    // The view the model saw: [user message, assistant turn, tool result].
    tool.execute(serde_json::json!({
        "message_index": 2,
        "summary": "Not useful for next steps.",
    }))
    .await
    .unwrap();

    drop(tool);
    let mut log = Arc::try_unwrap(log).unwrap().into_inner().unwrap();
    let (view, applied) = apply_condensation(&mut log, &RelevanceCondenser);

    assert_eq!(applied, Applied::Condensed { forgotten: 2 });
    assert!(view.events().iter().all(|e| e.id != obs_id));
}
