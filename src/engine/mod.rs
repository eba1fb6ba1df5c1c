//! Workflow engine — the event-dispatch path.
//!
//! [`WorkflowEngine::handle_event`] is called synchronously by in-request
//! state changes and asynchronously by the SLA monitor; both converge on the
//! same rule store / condition evaluator / action executor pipeline. Rules
//! are evaluated independently: one rule's malformed payload or failed
//! action never blocks the others, and nothing propagates to the caller.

mod context;
mod executor;

pub use context::EventContext;
pub use executor::ActionExecutor;

use std::sync::Arc;

use crate::domain::WorkflowEventType;
use crate::rules::conditions_match;
use crate::store::RuleStore;

pub struct WorkflowEngine {
    rules: Arc<dyn RuleStore>,
    executor: ActionExecutor,
}

impl WorkflowEngine {
    pub fn new(rules: Arc<dyn RuleStore>, executor: ActionExecutor) -> Self {
        Self { rules, executor }
    }

    /// Dispatch one lifecycle event.
    ///
    /// Fire-and-forget: there is no return value and no error surface. A
    /// caller that needs to know whether rules fired has to observe the side
    /// effects.
    pub async fn handle_event(&self, event_type: WorkflowEventType, context: &EventContext) {
        let rules = match self.rules.find_enabled(event_type).await {
            Ok(rules) => rules,
            Err(err) => {
                tracing::error!(%event_type, error = %err, "rule lookup failed, skipping dispatch");
                return;
            }
        };

        for rule in rules {
            let matched = match conditions_match(rule.conditions.as_deref(), context) {
                Ok(matched) => matched,
                Err(err) => {
                    tracing::error!(
                        rule_id = %rule.id,
                        error = %err,
                        "rule conditions failed to parse, treating as no match"
                    );
                    continue;
                }
            };
            if !matched {
                continue;
            }

            if let Err(err) = self.executor.execute(&rule.actions, context).await {
                tracing::error!(rule_id = %rule.id, error = %err, "rule actions failed");
            }
        }
    }
}
