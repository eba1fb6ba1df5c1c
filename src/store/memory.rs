//! In-memory collaborator implementations.
//!
//! Used by the test suite and the demo wiring. The task store implements the
//! conditional flag updates under the per-entry lock of its map, so the
//! check and the mutation are one atomic step with respect to any other
//! writer going through the same store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::{
    Notification, NotificationType, Project, ProjectId, Task, TaskActivity, TaskId, User,
    WorkflowEventType, WorkflowRule,
};
use crate::error::StoreError;

use super::{ActivitySink, Notifier, ProjectStore, RuleStore, StoreResult, TaskStore};

// ================================
// Rules
// ================================

#[derive(Default)]
pub struct InMemoryRuleStore {
    rules: RwLock<Vec<WorkflowRule>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, rule: WorkflowRule) {
        let mut rules = self.rules.write();
        rules.retain(|r| r.id != rule.id);
        rules.push(rule);
    }
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn find_enabled(
        &self,
        event_type: WorkflowEventType,
    ) -> StoreResult<Vec<WorkflowRule>> {
        let mut matching: Vec<WorkflowRule> = self
            .rules
            .read()
            .iter()
            .filter(|r| r.enabled && r.event_type == event_type)
            .cloned()
            .collect();
        // Store-defined order: ascending rule id, fixed and repeatable.
        matching.sort_by_key(|r| r.id);
        Ok(matching)
    }
}

// ================================
// Tasks
// ================================

#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: DashMap<TaskId, Task>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn save(&self, task: &Task) -> StoreResult<()> {
        self.tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> StoreResult<Option<Task>> {
        Ok(self.tasks.get(&id).map(|t| t.clone()))
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> StoreResult<Vec<Task>> {
        Ok(self
            .tasks
            .iter()
            .filter(|t| t.is_overdue(now))
            .map(|t| t.clone())
            .collect())
    }

    async fn try_mark_breached(
        &self,
        id: TaskId,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Task>> {
        let mut entry = self
            .tasks
            .get_mut(&id)
            .ok_or(StoreError::TaskNotFound(id))?;
        if !entry.is_overdue(now) {
            return Ok(None);
        }
        entry.sla_breached = true;
        entry.updated_at = now;
        Ok(Some(entry.clone()))
    }

    async fn try_mark_escalated(&self, id: TaskId) -> StoreResult<bool> {
        let mut entry = self
            .tasks
            .get_mut(&id)
            .ok_or(StoreError::TaskNotFound(id))?;
        if !entry.sla_breached || entry.escalated {
            return Ok(false);
        }
        entry.escalated = true;
        entry.updated_at = Utc::now();
        Ok(true)
    }
}

// ================================
// Projects
// ================================

#[derive(Default)]
pub struct InMemoryProjectStore {
    projects: DashMap<ProjectId, Project>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn save(&self, project: &Project) -> StoreResult<()> {
        self.projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        Ok(self.projects.get(&id).map(|p| p.clone()))
    }
}

// ================================
// Notifications
// ================================

/// Keeps durable notification records and pushes each one to subscribers on
/// a broadcast channel. The push is best-effort: with no subscriber attached
/// the send fails and the record is kept anyway.
pub struct InMemoryNotifier {
    records: RwLock<Vec<Notification>>,
    push: broadcast::Sender<Notification>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        let (push, _) = broadcast::channel(64);
        Self {
            records: RwLock::new(Vec::new()),
            push,
        }
    }

    /// Subscribe to real-time pushes.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.push.subscribe()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.records.read().clone()
    }

    pub fn count_of(&self, kind: NotificationType) -> usize {
        self.records.read().iter().filter(|n| n.kind == kind).count()
    }
}

impl Default for InMemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn create(
        &self,
        recipient: &User,
        kind: NotificationType,
        message: &str,
        project_id: ProjectId,
        task_id: Option<TaskId>,
    ) -> StoreResult<()> {
        let notification = Notification {
            id: Uuid::new_v4(),
            recipient: recipient.clone(),
            kind,
            message: message.to_string(),
            project_id,
            task_id,
            read: false,
            created_at: Utc::now(),
        };
        self.records.write().push(notification.clone());
        let _ = self.push.send(notification);
        Ok(())
    }
}

// ================================
// Activity
// ================================

#[derive(Default)]
pub struct InMemoryActivitySink {
    entries: RwLock<Vec<TaskActivity>>,
}

impl InMemoryActivitySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<TaskActivity> {
        self.entries.read().clone()
    }
}

#[async_trait]
impl ActivitySink for InMemoryActivitySink {
    async fn record(&self, task_id: TaskId, actor: &User, action: &str) -> StoreResult<()> {
        self.entries.write().push(TaskActivity {
            task_id,
            actor: actor.clone(),
            action: action.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskPriority, TaskStatus};
    use chrono::Duration;
    use std::sync::Arc;

    fn overdue_task(id: i64, now: DateTime<Utc>) -> Task {
        Task {
            id: TaskId(id),
            title: format!("task-{id}"),
            description: None,
            status: TaskStatus::InProgress,
            priority: TaskPriority::Medium,
            due_date: None,
            sla_hours: Some(1),
            sla_deadline: Some(now - Duration::hours(1)),
            sla_breached: false,
            escalated: false,
            project_id: ProjectId(1),
            assignee: None,
            created_by: User::new(1, "alice"),
            created_at: now - Duration::hours(2),
            updated_at: now - Duration::hours(2),
        }
    }

    #[tokio::test]
    async fn test_find_overdue_exclusions() {
        let now = Utc::now();
        let store = InMemoryTaskStore::new();

        store.save(&overdue_task(1, now)).await.unwrap();

        let mut breached = overdue_task(2, now);
        breached.sla_breached = true;
        store.save(&breached).await.unwrap();

        let mut done = overdue_task(3, now);
        done.status = TaskStatus::Done;
        store.save(&done).await.unwrap();

        let mut no_sla = overdue_task(4, now);
        no_sla.sla_hours = None;
        no_sla.sla_deadline = None;
        store.save(&no_sla).await.unwrap();

        let mut not_due = overdue_task(5, now);
        not_due.sla_deadline = Some(now + Duration::hours(1));
        store.save(&not_due).await.unwrap();

        let overdue = store.find_overdue(now).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, TaskId(1));
    }

    #[tokio::test]
    async fn test_try_mark_breached_transitions_once() {
        let now = Utc::now();
        let store = InMemoryTaskStore::new();
        store.save(&overdue_task(1, now)).await.unwrap();

        let first = store.try_mark_breached(TaskId(1), now).await.unwrap();
        assert!(first.is_some());
        assert!(first.unwrap().sla_breached);

        let second = store.try_mark_breached(TaskId(1), now).await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_try_mark_breached_respects_deadline() {
        let now = Utc::now();
        let store = InMemoryTaskStore::new();
        let mut task = overdue_task(1, now);
        task.sla_deadline = Some(now + Duration::hours(1));
        store.save(&task).await.unwrap();

        assert!(store
            .try_mark_breached(TaskId(1), now)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_concurrent_breach_writers_single_transition() {
        let now = Utc::now();
        let store = Arc::new(InMemoryTaskStore::new());
        store.save(&overdue_task(1, now)).await.unwrap();

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.try_mark_breached(TaskId(1), now).await.unwrap() })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.try_mark_breached(TaskId(1), now).await.unwrap() })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(
            a.is_some() as usize + b.is_some() as usize,
            1,
            "exactly one writer may observe the breach transition"
        );
    }

    #[tokio::test]
    async fn test_try_mark_escalated_requires_breach() {
        let now = Utc::now();
        let store = InMemoryTaskStore::new();
        store.save(&overdue_task(1, now)).await.unwrap();

        // Not breached yet: refused.
        assert!(!store.try_mark_escalated(TaskId(1)).await.unwrap());

        store.try_mark_breached(TaskId(1), now).await.unwrap();
        assert!(store.try_mark_escalated(TaskId(1)).await.unwrap());
        // Second escalation within the same episode: refused.
        assert!(!store.try_mark_escalated(TaskId(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_task_is_an_error() {
        let store = InMemoryTaskStore::new();
        let err = store
            .try_mark_breached(TaskId(99), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TaskNotFound(TaskId(99))));
    }

    #[tokio::test]
    async fn test_rule_store_order_and_filtering() {
        let now = Utc::now();
        let store = InMemoryRuleStore::new();
        store.insert(WorkflowRule::new(
            2,
            WorkflowEventType::TaskCreated,
            None,
            "{}",
            now,
        ));
        store.insert(WorkflowRule::new(
            1,
            WorkflowEventType::TaskCreated,
            None,
            "{}",
            now,
        ));
        let mut disabled =
            WorkflowRule::new(3, WorkflowEventType::TaskCreated, None, "{}", now);
        disabled.enabled = false;
        store.insert(disabled);
        store.insert(WorkflowRule::new(
            4,
            WorkflowEventType::ProjectArchived,
            None,
            "{}",
            now,
        ));

        let rules = store
            .find_enabled(WorkflowEventType::TaskCreated)
            .await
            .unwrap();
        let ids: Vec<i64> = rules.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_notifier_push_is_best_effort() {
        let notifier = InMemoryNotifier::new();
        // No subscriber attached: record creation must still succeed.
        notifier
            .create(
                &User::new(1, "alice"),
                NotificationType::WorkflowTriggered,
                "hello",
                ProjectId(1),
                None,
            )
            .await
            .unwrap();
        assert_eq!(notifier.all().len(), 1);

        let mut rx = notifier.subscribe();
        notifier
            .create(
                &User::new(1, "alice"),
                NotificationType::WorkflowTriggered,
                "again",
                ProjectId(1),
                None,
            )
            .await
            .unwrap();
        let pushed = rx.recv().await.unwrap();
        assert_eq!(pushed.message, "again");
    }
}
