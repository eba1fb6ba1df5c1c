use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TaskId, User};

/// Append-only audit entry. Both workflow-triggered and monitor-triggered
/// mutations record one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskActivity {
    pub task_id: TaskId,
    pub actor: User,
    pub action: String,
    pub created_at: DateTime<Utc>,
}
