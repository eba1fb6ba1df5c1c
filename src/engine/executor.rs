//! Action execution.
//!
//! The executor interprets a rule's action descriptor against an event
//! context and applies effects through the persistence and notification
//! collaborators. Every sub-action is best-effort: a failure is logged where
//! it happens and the remaining sub-actions still run. There is no
//! cross-action rollback and no automatic retry.

use std::sync::Arc;

use crate::domain::{NotificationType, Task, TaskId, TaskPriority, User};
use crate::engine::EventContext;
use crate::error::{ActionError, StoreError};
use crate::rules::{ActionDescriptor, NotifyTarget};
use crate::store::{ActivitySink, Notifier, TaskStore};
use crate::time::TimeProvider;

pub struct ActionExecutor {
    tasks: Arc<dyn TaskStore>,
    notifier: Arc<dyn Notifier>,
    activity: Arc<dyn ActivitySink>,
    time: Arc<dyn TimeProvider>,
}

impl ActionExecutor {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        notifier: Arc<dyn Notifier>,
        activity: Arc<dyn ActivitySink>,
        time: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            tasks,
            notifier,
            activity,
            time,
        }
    }

    /// Apply a serialized action descriptor to the context.
    ///
    /// Returns `Err` only when the descriptor itself fails to parse, in
    /// which case the whole call is a no-op. Individual sub-action failures
    /// are logged here and absorbed.
    pub async fn execute(
        &self,
        actions_json: &str,
        context: &EventContext,
    ) -> Result<(), ActionError> {
        let descriptor = ActionDescriptor::parse(actions_json)?;

        if !descriptor.notify.is_empty() {
            self.notify(&descriptor.notify, context).await;
        }

        if let Some(token) = &descriptor.set_priority {
            if let Err(err) = self.set_priority(token, context).await {
                tracing::error!(error = %err, "setPriority action failed");
            }
        }

        if descriptor.reset_sla {
            if let Err(err) = self.reset_sla(context).await {
                tracing::error!(error = %err, "resetSla action failed");
            }
        }

        if descriptor.escalate {
            if let Err(err) = self.escalate(context).await {
                tracing::error!(error = %err, "escalate action failed");
            }
        }

        Ok(())
    }

    /// Resolve each role token against the context and create one
    /// workflow-triggered notification per resolved recipient. Tokens that
    /// resolve to no recipient are skipped.
    async fn notify(&self, tokens: &[String], context: &EventContext) {
        let project = context.project();
        let (message, task_id) = match context.task() {
            Some(task) => (
                format!("Workflow triggered on task: {}", task.title),
                Some(task.id),
            ),
            None => (
                format!("Workflow triggered on project: {}", project.name),
                None,
            ),
        };

        for token in tokens {
            let recipient: Option<&User> = match NotifyTarget::from_token(token) {
                Some(NotifyTarget::Assignee) => {
                    context.task().and_then(|t| t.assignee.as_ref())
                }
                Some(NotifyTarget::Creator) => context.task().map(|t| &t.created_by),
                Some(NotifyTarget::Manager) => project.manager.as_ref(),
                None => None,
            };
            let Some(recipient) = recipient else {
                continue;
            };

            if let Err(err) = self
                .notifier
                .create(
                    recipient,
                    NotificationType::WorkflowTriggered,
                    &message,
                    project.id,
                    task_id,
                )
                .await
            {
                tracing::error!(
                    recipient = %recipient.username,
                    error = %err,
                    "notify action failed for recipient"
                );
            }
        }
    }

    async fn set_priority(&self, token: &str, context: &EventContext) -> Result<(), ActionError> {
        let task = context.task().ok_or(ActionError::NoTaskInContext)?;
        let priority = TaskPriority::parse(token)
            .ok_or_else(|| ActionError::InvalidPriority(token.to_string()))?;

        let mut stored = self.fetch_task(task.id).await?;
        stored.priority = priority;
        stored.updated_at = self.time.now();
        self.tasks.save(&stored).await?;

        self.record_activity(context, &stored, &format!("Workflow set priority to {priority}"))
            .await;

        tracing::info!(task_id = %stored.id, %priority, "workflow set task priority");
        Ok(())
    }

    async fn reset_sla(&self, context: &EventContext) -> Result<(), ActionError> {
        let task = context.task().ok_or(ActionError::NoTaskInContext)?;
        let mut stored = self.fetch_task(task.id).await?;

        if stored.sla_hours.is_none() {
            tracing::debug!(task_id = %stored.id, "resetSla skipped: task has no SLA");
            return Ok(());
        }

        let now = self.time.now();
        stored.reset_sla_window(now);
        stored.updated_at = now;
        self.tasks.save(&stored).await?;

        self.record_activity(context, &stored, "Workflow reset SLA").await;

        tracing::info!(task_id = %stored.id, "workflow reset task SLA");
        Ok(())
    }

    /// Idempotent: the conditional update flips the flag at most once per
    /// breach episode, and only the flipping call notifies.
    async fn escalate(&self, context: &EventContext) -> Result<(), ActionError> {
        let task = context.task().ok_or(ActionError::NoTaskInContext)?;

        if !self.tasks.try_mark_escalated(task.id).await? {
            return Ok(());
        }

        let project = context.project();
        let Some(manager) = project.manager.as_ref() else {
            tracing::warn!(task_id = %task.id, "task escalated but project has no manager");
            return Ok(());
        };

        self.notifier
            .create(
                manager,
                NotificationType::SlaEscalated,
                &format!("SLA escalated for task: {}", task.title),
                project.id,
                Some(task.id),
            )
            .await?;

        self.activity
            .record(
                task.id,
                manager,
                &format!("SLA escalated to project manager: {}", manager.username),
            )
            .await?;

        tracing::warn!(task_id = %task.id, "task escalated to project manager");
        Ok(())
    }

    /// Re-read the task so the mutation applies to current stored state, not
    /// the snapshot captured when the context was built.
    async fn fetch_task(&self, id: TaskId) -> Result<Task, ActionError> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or(ActionError::Store(StoreError::TaskNotFound(id)))
    }

    /// Audit entries for workflow mutations are attributed to the owning
    /// project's manager; skipped when the project has none.
    async fn record_activity(&self, context: &EventContext, task: &Task, action: &str) {
        let Some(manager) = context.project().manager.as_ref() else {
            return;
        };
        if let Err(err) = self.activity.record(task.id, manager, action).await {
            tracing::error!(task_id = %task.id, error = %err, "activity record failed");
        }
    }
}
