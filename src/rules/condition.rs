//! Condition-set evaluation.
//!
//! A rule's condition set is a flat JSON object mapping context keys to
//! expected scalar values. Matching is a strict equality check over the
//! canonical textual representation of both sides. There are no patterns,
//! ranges, OR or negation. An empty or absent set matches vacuously; a key
//! the context cannot resolve fails the match closed.

use std::collections::HashMap;

use serde_json::Value;

use crate::engine::EventContext;
use crate::error::ConditionError;

/// Evaluate a serialized condition set against an event context.
///
/// Pure: parse failures are returned, not logged, so the dispatcher can log
/// them with the owning rule's identity.
pub fn conditions_match(
    conditions_json: Option<&str>,
    context: &EventContext,
) -> Result<bool, ConditionError> {
    let Some(raw) = conditions_json else {
        return Ok(true);
    };
    if raw.trim().is_empty() {
        return Ok(true);
    }

    let conditions: HashMap<String, Value> = serde_json::from_str(raw)?;

    for (key, expected) in &conditions {
        let Some(actual) = context.condition_value(key) else {
            return Ok(false);
        };
        if actual != canonical_text(expected) {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Canonical textual representation of an expected value. Strings compare by
/// their content, everything else by its JSON rendering.
fn canonical_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Project, ProjectId, Task, TaskId, TaskPriority, TaskStatus, User,
    };
    use chrono::Utc;

    fn make_context() -> EventContext {
        let now = Utc::now();
        let manager = User::new(10, "meredith");
        let task = Task {
            id: TaskId(1),
            title: "Prepare audit".into(),
            description: None,
            status: TaskStatus::Done,
            priority: TaskPriority::High,
            due_date: None,
            sla_hours: None,
            sla_deadline: None,
            sla_breached: false,
            escalated: false,
            project_id: ProjectId(5),
            assignee: Some(User::new(2, "bob")),
            created_by: User::new(1, "alice"),
            created_at: now,
            updated_at: now,
        };
        let project = Project::new(5, "Compliance", Some(manager));
        EventContext::for_task(task, project)
    }

    #[test]
    fn test_absent_conditions_match() {
        assert!(conditions_match(None, &make_context()).unwrap());
    }

    #[test]
    fn test_blank_conditions_match() {
        assert!(conditions_match(Some("   "), &make_context()).unwrap());
    }

    #[test]
    fn test_empty_object_matches() {
        assert!(conditions_match(Some("{}"), &make_context()).unwrap());
    }

    #[test]
    fn test_equality_on_status() {
        let ctx = make_context();
        assert!(conditions_match(Some(r#"{"status":"DONE"}"#), &ctx).unwrap());
        assert!(!conditions_match(Some(r#"{"status":"TODO"}"#), &ctx).unwrap());
    }

    #[test]
    fn test_missing_key_fails_closed() {
        let ctx = make_context();
        assert!(!conditions_match(Some(r#"{"sprint":"12"}"#), &ctx).unwrap());
    }

    #[test]
    fn test_all_keys_must_match() {
        let ctx = make_context();
        assert!(conditions_match(
            Some(r#"{"status":"DONE","priority":"HIGH"}"#),
            &ctx
        )
        .unwrap());
        assert!(!conditions_match(
            Some(r#"{"status":"DONE","priority":"LOW"}"#),
            &ctx
        )
        .unwrap());
    }

    #[test]
    fn test_non_string_expected_value() {
        // Numbers compare through their canonical text.
        let ctx = make_context();
        assert!(!conditions_match(Some(r#"{"status":1}"#), &ctx).unwrap());
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        let ctx = make_context();
        assert!(conditions_match(Some("{not json"), &ctx).is_err());
        assert!(conditions_match(Some(r#"["status"]"#), &ctx).is_err());
    }
}
