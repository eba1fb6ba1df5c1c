use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ProjectId, TaskId, User};

/// Task workflow states. `Done` is the terminal closing status: tasks in it
/// are excluded from SLA monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed, ordered priority levels. `setPriority` actions must name one of
/// these; anything else is rejected for that action only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Critical => "CRITICAL",
        }
    }

    /// Resolve a priority token. Returns `None` for out-of-set values.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "LOW" => Some(TaskPriority::Low),
            "MEDIUM" => Some(TaskPriority::Medium),
            "HIGH" => Some(TaskPriority::High),
            "CRITICAL" => Some(TaskPriority::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task with the fields the engine reads and writes.
///
/// `sla_deadline` is derived: it is recomputed from `sla_hours` on
/// assignment and on SLA reset, never set independently. `sla_breached` and
/// `escalated` move false→true exactly once per deadline episode; resetting
/// the SLA clears both and opens a fresh episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub sla_hours: Option<i64>,
    #[serde(default)]
    pub sla_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sla_breached: bool,
    #[serde(default)]
    pub escalated: bool,
    pub project_id: ProjectId,
    #[serde(default)]
    pub assignee: Option<User>,
    pub created_by: User,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Recompute the deadline from `now + sla_hours` and clear the breach and
    /// escalation flags. No-op for tasks without a configured SLA.
    pub fn reset_sla_window(&mut self, now: DateTime<Utc>) {
        let Some(hours) = self.sla_hours else {
            return;
        };
        self.sla_deadline = Some(now + Duration::hours(hours));
        self.sla_breached = false;
        self.escalated = false;
    }

    /// Whether the deadline has passed for a task that is still being
    /// monitored.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.sla_breached || self.status.is_terminal() {
            return false;
        }
        match self.sla_deadline {
            Some(deadline) => self.sla_hours.is_some() && deadline <= now,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task(sla_hours: Option<i64>) -> Task {
        let now = Utc::now();
        Task {
            id: TaskId(1),
            title: "Ship release".into(),
            description: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            due_date: None,
            sla_hours,
            sla_deadline: None,
            sla_breached: false,
            escalated: false,
            project_id: ProjectId(1),
            assignee: None,
            created_by: User::new(1, "alice"),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(TaskPriority::parse("HIGH"), Some(TaskPriority::High));
        assert_eq!(TaskPriority::parse("URGENT"), None);
        assert_eq!(TaskPriority::parse("high"), None);
    }

    #[test]
    fn test_status_canonical_text() {
        assert_eq!(TaskStatus::InProgress.to_string(), "IN_PROGRESS");
        assert!(TaskStatus::Done.is_terminal());
        assert!(!TaskStatus::Todo.is_terminal());
    }

    #[test]
    fn test_reset_sla_window() {
        let now = Utc::now();
        let mut task = sample_task(Some(8));
        task.sla_breached = true;
        task.escalated = true;

        task.reset_sla_window(now);

        assert_eq!(task.sla_deadline, Some(now + Duration::hours(8)));
        assert!(!task.sla_breached);
        assert!(!task.escalated);
    }

    #[test]
    fn test_reset_sla_window_without_sla_hours() {
        let mut task = sample_task(None);
        task.reset_sla_window(Utc::now());
        assert_eq!(task.sla_deadline, None);
    }

    #[test]
    fn test_is_overdue() {
        let now = Utc::now();
        let mut task = sample_task(Some(1));
        task.sla_deadline = Some(now - Duration::hours(1));
        assert!(task.is_overdue(now));

        task.sla_breached = true;
        assert!(!task.is_overdue(now));

        task.sla_breached = false;
        task.status = TaskStatus::Done;
        assert!(!task.is_overdue(now));
    }
}
