use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ProjectId, TaskId, User};

/// Closed set of notification kinds the engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    TaskAssigned,
    TaskStatusChanged,
    SlaBreached,
    SlaEscalated,
    WorkflowTriggered,
    ProjectArchived,
}

/// Durable notification record created through the [`Notifier`] sink.
///
/// [`Notifier`]: crate::store::Notifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: User,
    pub kind: NotificationType,
    pub message: String,
    pub project_id: ProjectId,
    pub task_id: Option<TaskId>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
