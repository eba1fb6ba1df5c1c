use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RuleId;

/// Lifecycle events that can trigger workflow rules. Closed set; the
/// monitor synthesizes `TaskSlaBreached`, everything else originates from
/// in-request state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowEventType {
    TaskCreated,
    TaskUpdated,
    TaskAssigned,
    TaskStatusChanged,
    TaskSlaBreached,
    ProjectArchived,
}

impl WorkflowEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowEventType::TaskCreated => "TASK_CREATED",
            WorkflowEventType::TaskUpdated => "TASK_UPDATED",
            WorkflowEventType::TaskAssigned => "TASK_ASSIGNED",
            WorkflowEventType::TaskStatusChanged => "TASK_STATUS_CHANGED",
            WorkflowEventType::TaskSlaBreached => "TASK_SLA_BREACHED",
            WorkflowEventType::ProjectArchived => "PROJECT_ARCHIVED",
        }
    }
}

impl fmt::Display for WorkflowEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored automation rule.
///
/// `conditions` and `actions` are serialized JSON objects attached to the
/// record; the engine parses them at dispatch time, so a malformed payload
/// is only discovered when a matching event actually occurs. Rules are
/// read-only to the engine; an administrative surface creates and toggles
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRule {
    pub id: RuleId,
    pub event_type: WorkflowEventType,
    /// JSON object mapping context keys to expected values. Empty or absent
    /// means the rule always matches.
    #[serde(default)]
    pub conditions: Option<String>,
    /// JSON object in the action-descriptor format.
    pub actions: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowRule {
    pub fn new(
        id: i64,
        event_type: WorkflowEventType,
        conditions: Option<&str>,
        actions: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RuleId(id),
            event_type,
            conditions: conditions.map(str::to_string),
            actions: actions.to_string(),
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_canonical_text() {
        assert_eq!(
            WorkflowEventType::TaskSlaBreached.to_string(),
            "TASK_SLA_BREACHED"
        );
        assert_eq!(
            serde_json::to_string(&WorkflowEventType::ProjectArchived).unwrap(),
            "\"PROJECT_ARCHIVED\""
        );
    }

    #[test]
    fn test_event_type_round_trip() {
        let parsed: WorkflowEventType = serde_json::from_str("\"TASK_ASSIGNED\"").unwrap();
        assert_eq!(parsed, WorkflowEventType::TaskAssigned);
    }
}
