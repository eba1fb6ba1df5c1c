//! SLA monitor — the time-based trigger source.
//!
//! Runs on a fixed period, scans tasks with an active, unbreached deadline,
//! and for each overdue one performs the atomic breach transition, records
//! an audit entry, and synthesizes a `TASK_SLA_BREACHED` event through the
//! workflow engine. Breach detection lives here and only here; escalation is
//! delegated entirely to whatever rules match the synthesized event.
//!
//! Per-task state machine: no SLA → active (deadline set) → breached →
//! escalated, with `resetSla` returning any state to active under a fresh
//! deadline. A task already marked breached is excluded from the scan and
//! cannot be reprocessed; the conditional update in the store bounds the
//! transition to at most one writer even when a tick races an in-request
//! dispatch over the same task.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::{Task, WorkflowEventType};
use crate::engine::{EventContext, WorkflowEngine};
use crate::error::StoreError;
use crate::store::{ActivitySink, ProjectStore, TaskStore};
use crate::time::TimeProvider;

/// Monitor configuration, passed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between scans.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    300
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

pub struct SlaMonitor {
    tasks: Arc<dyn TaskStore>,
    projects: Arc<dyn ProjectStore>,
    activity: Arc<dyn ActivitySink>,
    engine: Arc<WorkflowEngine>,
    time: Arc<dyn TimeProvider>,
    config: MonitorConfig,
}

impl SlaMonitor {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        projects: Arc<dyn ProjectStore>,
        activity: Arc<dyn ActivitySink>,
        engine: Arc<WorkflowEngine>,
        time: Arc<dyn TimeProvider>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            tasks,
            projects,
            activity,
            engine,
            time,
            config,
        }
    }

    /// One scan over the outstanding deadlines.
    ///
    /// Failures are isolated per task: one task's error is logged with its
    /// identity and the rest of the scan continues. The tick itself never
    /// returns an error.
    pub async fn tick(&self) {
        let now = self.time.now();
        let candidates = match self.tasks.find_overdue(now).await {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::error!(error = %err, "overdue scan failed, skipping tick");
                return;
            }
        };

        for task in candidates {
            if let Err(err) = self.process_overdue(&task).await {
                tracing::error!(task_id = %task.id, error = %err, "sla check failed for task");
            }
        }
    }

    async fn process_overdue(&self, task: &Task) -> Result<(), StoreError> {
        let now = self.time.now();

        // Conditional update: whoever loses the race sees no transition and
        // does nothing further with this task.
        let Some(breached) = self.tasks.try_mark_breached(task.id, now).await? else {
            return Ok(());
        };

        let project = self
            .projects
            .find_by_id(breached.project_id)
            .await?
            .ok_or(StoreError::ProjectNotFound(breached.project_id))?;

        if let Some(manager) = project.manager.as_ref() {
            self.activity
                .record(breached.id, manager, "SLA breached for task")
                .await?;
        }

        tracing::warn!(task_id = %breached.id, "sla breached");

        let context = EventContext::for_task(breached, project);
        self.engine
            .handle_event(WorkflowEventType::TaskSlaBreached, &context)
            .await;

        Ok(())
    }

    /// Run the periodic scan until stopped. The first scan happens one full
    /// interval after startup.
    pub fn spawn(self: Arc<Self>) -> MonitorHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        // tokio panics on a zero period; clamp to one second.
        let interval = Duration::from_secs(self.config.interval_secs.max(1));

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The immediate first tick from `interval` is consumed so scans
            // start one period in, matching a fixed-delay schedule.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.tick().await,
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        MonitorHandle {
            shutdown: shutdown_tx,
            join,
        }
    }
}

/// Handle to a spawned monitor loop.
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl MonitorHandle {
    /// Signal the loop to stop and wait for it to exit.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.join.await;
    }
}
