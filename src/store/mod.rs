//! Collaborator contracts the engine consumes.
//!
//! Persistence, notification delivery and audit recording are external
//! concerns; the core only depends on these traits. [`memory`] provides
//! in-process implementations used by the tests and the demo wiring.
//!
//! `try_mark_breached` and `try_mark_escalated` are the atomic
//! conditional-update primitives: each observes the current flag and flips
//! it in one storage operation, so that at most one breach transition and at
//! most one escalation are observable per deadline episode no matter how
//! many writers race over the same task.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    NotificationType, Project, ProjectId, Task, TaskId, User, WorkflowEventType, WorkflowRule,
};
use crate::error::StoreError;

pub mod memory;

pub use memory::{
    InMemoryActivitySink, InMemoryNotifier, InMemoryProjectStore, InMemoryRuleStore,
    InMemoryTaskStore,
};

pub type StoreResult<T> = Result<T, StoreError>;

/// Rule lookup. Read-only from the engine's perspective; the returned order
/// is store-defined but must be fixed and repeatable.
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn find_enabled(&self, event_type: WorkflowEventType)
        -> StoreResult<Vec<WorkflowRule>>;
}

/// Task persistence as the engine sees it.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Idempotent upsert by identity.
    async fn save(&self, task: &Task) -> StoreResult<()>;

    async fn find_by_id(&self, id: TaskId) -> StoreResult<Option<Task>>;

    /// Tasks with a configured SLA whose deadline has passed, excluding
    /// already-breached tasks and tasks in a terminal closing status.
    async fn find_overdue(&self, now: DateTime<Utc>) -> StoreResult<Vec<Task>>;

    /// Atomically flip `sla_breached` false→true, conditioned on the
    /// deadline being set and in the past and the task still being
    /// monitored. Returns the task as stored after the flip when *this*
    /// call made the transition, `None` when another writer got there first
    /// or the task no longer qualifies.
    async fn try_mark_breached(
        &self,
        id: TaskId,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Task>>;

    /// Atomically flip `escalated` false→true, conditioned on the task
    /// being breached. Returns whether this call made the transition.
    async fn try_mark_escalated(&self, id: TaskId) -> StoreResult<bool>;
}

/// Project lookup for context assembly and archival.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn save(&self, project: &Project) -> StoreResult<()>;
    async fn find_by_id(&self, id: ProjectId) -> StoreResult<Option<Project>>;
}

/// Notification sink: durable record creation plus a best-effort real-time
/// push. A push failure must not fail record creation.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn create(
        &self,
        recipient: &User,
        kind: NotificationType,
        message: &str,
        project_id: ProjectId,
        task_id: Option<TaskId>,
    ) -> StoreResult<()>;
}

/// Append-only activity/audit sink.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn record(&self, task_id: TaskId, actor: &User, action: &str) -> StoreResult<()>;
}
