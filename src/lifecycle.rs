//! In-request trigger source.
//!
//! State changes made on behalf of a user flow through here: the mutation is
//! persisted, direct notifications and audit entries are written, and the
//! matching lifecycle event is dispatched synchronously through the workflow
//! engine. Authorization, querying and identity belong to outer layers; this
//! module only covers the fields the engine reads and writes.

use std::sync::Arc;

use crate::domain::{
    NotificationType, Project, ProjectId, Task, TaskId, TaskStatus, User, WorkflowEventType,
};
use crate::engine::{EventContext, WorkflowEngine};
use crate::error::StoreError;
use crate::store::{ActivitySink, Notifier, ProjectStore, StoreResult, TaskStore};
use crate::time::TimeProvider;

pub struct TaskLifecycle {
    tasks: Arc<dyn TaskStore>,
    projects: Arc<dyn ProjectStore>,
    notifier: Arc<dyn Notifier>,
    activity: Arc<dyn ActivitySink>,
    time: Arc<dyn TimeProvider>,
    engine: Arc<WorkflowEngine>,
}

impl TaskLifecycle {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        projects: Arc<dyn ProjectStore>,
        notifier: Arc<dyn Notifier>,
        activity: Arc<dyn ActivitySink>,
        time: Arc<dyn TimeProvider>,
        engine: Arc<WorkflowEngine>,
    ) -> Self {
        Self {
            tasks,
            projects,
            notifier,
            activity,
            time,
            engine,
        }
    }

    /// Persist a new task and dispatch `TASK_CREATED`.
    ///
    /// Identity allocation belongs to the persistence collaborator; the
    /// caller hands in a task with its id already assigned. The initial SLA
    /// deadline is derived here from `sla_hours`.
    pub async fn create_task(&self, mut task: Task) -> StoreResult<Task> {
        let now = self.time.now();
        task.created_at = now;
        task.updated_at = now;
        if task.sla_hours.is_some() {
            task.reset_sla_window(now);
        }
        self.tasks.save(&task).await?;

        let project = self.project_of(task.project_id).await?;
        self.engine
            .handle_event(
                WorkflowEventType::TaskCreated,
                &EventContext::for_task(task.clone(), project),
            )
            .await;
        Ok(task)
    }

    /// Set the assignee, open a fresh SLA window, notify the assignee and
    /// dispatch `TASK_ASSIGNED`.
    pub async fn assign_task(
        &self,
        task_id: TaskId,
        assignee: User,
        actor: &User,
    ) -> StoreResult<Task> {
        let now = self.time.now();
        let mut task = self.fetch_task(task_id).await?;
        task.assignee = Some(assignee.clone());
        task.reset_sla_window(now);
        task.updated_at = now;
        self.tasks.save(&task).await?;

        let project = self.project_of(task.project_id).await?;

        self.notifier
            .create(
                &assignee,
                NotificationType::TaskAssigned,
                &format!("You have been assigned a task: {}", task.title),
                project.id,
                Some(task.id),
            )
            .await?;
        self.activity
            .record(
                task.id,
                actor,
                &format!("Assigned task to {}", assignee.username),
            )
            .await?;

        self.engine
            .handle_event(
                WorkflowEventType::TaskAssigned,
                &EventContext::for_task(task.clone(), project),
            )
            .await;
        Ok(task)
    }

    /// Apply a status transition and dispatch `TASK_STATUS_CHANGED`.
    ///
    /// Closing a task clears its breach flag; reopening a closed task opens
    /// a fresh SLA window.
    pub async fn change_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
        actor: &User,
    ) -> StoreResult<Task> {
        let now = self.time.now();
        let mut task = self.fetch_task(task_id).await?;
        let old_status = task.status;

        if status == TaskStatus::Done {
            task.sla_breached = false;
        }
        if old_status == TaskStatus::Done && status != TaskStatus::Done {
            task.reset_sla_window(now);
        }

        task.status = status;
        task.updated_at = now;
        self.tasks.save(&task).await?;

        let project = self.project_of(task.project_id).await?;

        if task.created_by.id != actor.id {
            self.notifier
                .create(
                    &task.created_by,
                    NotificationType::TaskStatusChanged,
                    &format!("Task '{}' status changed to {}", task.title, status),
                    project.id,
                    Some(task.id),
                )
                .await?;
        }
        self.activity
            .record(
                task.id,
                actor,
                &format!("Changed status from {old_status} to {status}"),
            )
            .await?;

        self.engine
            .handle_event(
                WorkflowEventType::TaskStatusChanged,
                &EventContext::for_task(task.clone(), project),
            )
            .await;
        Ok(task)
    }

    /// Persist an edited task and dispatch `TASK_UPDATED`.
    pub async fn update_task(&self, mut task: Task) -> StoreResult<Task> {
        task.updated_at = self.time.now();
        self.tasks.save(&task).await?;

        let project = self.project_of(task.project_id).await?;
        self.engine
            .handle_event(
                WorkflowEventType::TaskUpdated,
                &EventContext::for_task(task.clone(), project),
            )
            .await;
        Ok(task)
    }

    async fn fetch_task(&self, id: TaskId) -> StoreResult<Task> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or(StoreError::TaskNotFound(id))
    }

    async fn project_of(&self, id: ProjectId) -> StoreResult<Project> {
        self.projects
            .find_by_id(id)
            .await?
            .ok_or(StoreError::ProjectNotFound(id))
    }
}

pub struct ProjectLifecycle {
    projects: Arc<dyn ProjectStore>,
    engine: Arc<WorkflowEngine>,
}

impl ProjectLifecycle {
    pub fn new(projects: Arc<dyn ProjectStore>, engine: Arc<WorkflowEngine>) -> Self {
        Self { projects, engine }
    }

    /// Flip the archived flag and dispatch `PROJECT_ARCHIVED`.
    pub async fn archive_project(&self, id: ProjectId) -> StoreResult<Project> {
        let mut project = self
            .projects
            .find_by_id(id)
            .await?
            .ok_or(StoreError::ProjectNotFound(id))?;
        project.archived = true;
        self.projects.save(&project).await?;

        self.engine
            .handle_event(
                WorkflowEventType::ProjectArchived,
                &EventContext::for_project(project.clone()),
            )
            .await;
        Ok(project)
    }
}
