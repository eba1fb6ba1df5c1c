//! Event contexts.
//!
//! A context is the ephemeral bundle of entities relevant to one dispatched
//! event. It is a closed variant per event family rather than a loose map,
//! so rules can only reference entities that event actually carries. Built
//! fresh per dispatch, never stored.

use crate::domain::{Project, Task};

#[derive(Debug, Clone)]
pub enum EventContext {
    /// Task lifecycle events carry the task and its owning project.
    Task { task: Task, project: Project },
    /// Project lifecycle events carry the project alone.
    Project { project: Project },
}

impl EventContext {
    pub fn for_task(task: Task, project: Project) -> Self {
        EventContext::Task { task, project }
    }

    pub fn for_project(project: Project) -> Self {
        EventContext::Project { project }
    }

    pub fn task(&self) -> Option<&Task> {
        match self {
            EventContext::Task { task, .. } => Some(task),
            EventContext::Project { .. } => None,
        }
    }

    pub fn project(&self) -> &Project {
        match self {
            EventContext::Task { project, .. } => project,
            EventContext::Project { project } => project,
        }
    }

    /// Resolve a condition key to the canonical text of its current value.
    ///
    /// The key set is closed; anything else yields `None`, which fails the
    /// owning condition closed. An unassigned task likewise yields `None`
    /// for `assignee`.
    pub fn condition_value(&self, key: &str) -> Option<String> {
        match key {
            "status" => self.task().map(|t| t.status.to_string()),
            "priority" => self.task().map(|t| t.priority.to_string()),
            "title" => self.task().map(|t| t.title.clone()),
            "assignee" => self
                .task()
                .and_then(|t| t.assignee.as_ref())
                .map(|u| u.username.clone()),
            "creator" => self.task().map(|t| t.created_by.username.clone()),
            "project" => Some(self.project().name.clone()),
            "manager" => self
                .project()
                .manager
                .as_ref()
                .map(|u| u.username.clone()),
            "archived" => Some(self.project().archived.to_string()),
            _ => None,
        }
    }
}
