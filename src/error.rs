//! Error types.
//!
//! Nothing inside the rule-dispatch or monitor path propagates an error past
//! its own boundary; these types exist so failures can be logged with enough
//! detail at the point where they are absorbed.

use thiserror::Error;

use crate::domain::{ProjectId, TaskId};

/// Errors surfaced by persistence collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A rule's `conditions` payload failed to parse as a JSON object.
///
/// Treated as "does not match" by the dispatcher.
#[derive(Debug, Error)]
pub enum ConditionError {
    #[error("conditions payload is not a JSON object: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures inside the action executor.
///
/// [`ActionError::MalformedDescriptor`] turns the whole rule into a no-op;
/// the remaining variants are absorbed per sub-action.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("action descriptor is not a valid JSON object: {0}")]
    MalformedDescriptor(#[from] serde_json::Error),
    #[error("unknown priority level: {0}")]
    InvalidPriority(String),
    #[error("action requires a task in the event context")]
    NoTaskInContext,
    #[error(transparent)]
    Store(#[from] StoreError),
}
