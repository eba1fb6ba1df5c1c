//! # Taskflow — rule-driven workflow automation for task lifecycles
//!
//! `taskflow` reacts to lifecycle events in a work-tracking domain. When an
//! event occurs (task created, assigned, status changed, SLA breached,
//! project archived), stored rules are evaluated against the event's context
//! and matching rules trigger side-effecting actions: notify a role, change
//! priority, reset a deadline, escalate. A periodic SLA monitor scans
//! outstanding deadlines and synthesizes breach events into the same
//! dispatch pipeline, closing the loop between time and events.
//!
//! The rule language is deliberately small: conditions are a flat equality
//! match over a closed key set, actions are a structured descriptor with
//! four recognized fields. Rules fail independently: a malformed payload or
//! a failed action is logged and absorbed, never surfaced to the caller.
//!
//! Persistence, notification delivery and audit recording are collaborator
//! traits ([`store`]); in-memory implementations back the tests and the
//! demo binary.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use taskflow::engine::{ActionExecutor, WorkflowEngine};
//! use taskflow::monitor::{MonitorConfig, SlaMonitor};
//! use taskflow::store::{
//!     InMemoryActivitySink, InMemoryNotifier, InMemoryProjectStore, InMemoryRuleStore,
//!     InMemoryTaskStore,
//! };
//! use taskflow::time::RealTimeProvider;
//!
//! #[tokio::main]
//! async fn main() {
//!     let tasks = Arc::new(InMemoryTaskStore::new());
//!     let projects = Arc::new(InMemoryProjectStore::new());
//!     let rules = Arc::new(InMemoryRuleStore::new());
//!     let notifier = Arc::new(InMemoryNotifier::new());
//!     let activity = Arc::new(InMemoryActivitySink::new());
//!     let time = Arc::new(RealTimeProvider::new());
//!
//!     let executor = ActionExecutor::new(
//!         tasks.clone(),
//!         notifier.clone(),
//!         activity.clone(),
//!         time.clone(),
//!     );
//!     let engine = Arc::new(WorkflowEngine::new(rules.clone(), executor));
//!
//!     let monitor = Arc::new(SlaMonitor::new(
//!         tasks,
//!         projects,
//!         activity,
//!         engine,
//!         time,
//!         MonitorConfig::default(),
//!     ));
//!     let handle = monitor.spawn();
//!     // ... drive task state changes through TaskLifecycle ...
//!     handle.stop().await;
//! }
//! ```

pub mod domain;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod monitor;
pub mod rules;
pub mod store;
pub mod time;

pub use crate::domain::{
    Notification, NotificationType, Project, ProjectId, RuleId, Task, TaskActivity, TaskId,
    TaskPriority, TaskStatus, User, UserId, WorkflowEventType, WorkflowRule,
};
pub use crate::engine::{ActionExecutor, EventContext, WorkflowEngine};
pub use crate::error::{ActionError, ConditionError, StoreError};
pub use crate::lifecycle::{ProjectLifecycle, TaskLifecycle};
pub use crate::monitor::{MonitorConfig, MonitorHandle, SlaMonitor};
pub use crate::rules::{ActionDescriptor, NotifyTarget};
pub use crate::time::{FakeTimeProvider, RealTimeProvider, TimeProvider};
