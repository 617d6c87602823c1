//! Tool implementations for Alembic.
//!
//! One tool lives here: `mark_context_redundant`, the boundary through which
//! the model asks the runtime to redact a stale tool observation. Everything
//! else a deployment registers (shell, file access, search) belongs to the
//! host runtime, not to the condensation engine.

pub mod mark_redundant;

use std::sync::{Arc, Mutex};

use alembic_core::log::EventLog;
use alembic_core::tool::ToolRegistry;

pub use mark_redundant::{MarkContextRedundantTool, StepContext};

/// Create a registry exposing the condensation tool against a shared log.
pub fn condensation_registry(log: Arc<Mutex<EventLog>>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(MarkContextRedundantTool::new(log)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_exposes_condensation_tool() {
        let log = Arc::new(Mutex::new(EventLog::new()));
        let registry = condensation_registry(log);
        assert!(registry.get("mark_context_redundant").is_some());
        assert_eq!(registry.definitions().len(), 1);
    }
}
