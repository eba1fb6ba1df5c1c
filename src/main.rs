use std::sync::Arc;

use chrono::{Duration, Utc};

use taskflow::engine::{ActionExecutor, WorkflowEngine};
use taskflow::monitor::{MonitorConfig, SlaMonitor};
use taskflow::store::{
    InMemoryActivitySink, InMemoryNotifier, InMemoryProjectStore, InMemoryRuleStore,
    InMemoryTaskStore, ProjectStore, TaskStore,
};
use taskflow::time::RealTimeProvider;
use taskflow::{
    Project, Task, TaskId, TaskPriority, TaskStatus, User, WorkflowEventType, WorkflowRule,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Taskflow Engine ===\n");

    let tasks = Arc::new(InMemoryTaskStore::new());
    let projects = Arc::new(InMemoryProjectStore::new());
    let rules = Arc::new(InMemoryRuleStore::new());
    let notifier = Arc::new(InMemoryNotifier::new());
    let activity = Arc::new(InMemoryActivitySink::new());
    let time = Arc::new(RealTimeProvider::new());

    let executor = ActionExecutor::new(
        tasks.clone(),
        notifier.clone(),
        activity.clone(),
        time.clone(),
    );
    let engine = Arc::new(WorkflowEngine::new(rules.clone(), executor));

    let now = Utc::now();

    // On breach: escalate and notify both the manager and the assignee.
    rules.insert(WorkflowRule::new(
        1,
        WorkflowEventType::TaskSlaBreached,
        None,
        r#"{"escalate": true, "notify": ["MANAGER", "ASSIGNEE"], "setPriority": "CRITICAL"}"#,
        now,
    ));

    let manager = User::new(1, "meredith");
    let assignee = User::new(2, "bob");
    let project = Project::new(1, "Platform", Some(manager));
    projects.save(&project).await.expect("seed project");

    // A task whose one-hour SLA expired two hours ago.
    let task = Task {
        id: TaskId(1),
        title: "Rotate signing keys".into(),
        description: None,
        status: TaskStatus::InProgress,
        priority: TaskPriority::Medium,
        due_date: None,
        sla_hours: Some(1),
        sla_deadline: Some(now - Duration::hours(1)),
        sla_breached: false,
        escalated: false,
        project_id: project.id,
        assignee: Some(assignee),
        created_by: User::new(3, "alice"),
        created_at: now - Duration::hours(2),
        updated_at: now - Duration::hours(2),
    };
    tasks.save(&task).await.expect("seed task");

    let monitor = SlaMonitor::new(
        tasks.clone(),
        projects,
        activity.clone(),
        engine,
        time,
        MonitorConfig::default(),
    );
    monitor.tick().await;

    let task = tasks
        .find_by_id(TaskId(1))
        .await
        .expect("task store")
        .expect("seeded task");
    println!(
        "task '{}': breached={} escalated={} priority={}\n",
        task.title, task.sla_breached, task.escalated, task.priority
    );

    println!("notifications:");
    for n in notifier.all() {
        println!("  [{:?}] to {}: {}", n.kind, n.recipient.username, n.message);
    }

    println!("\nactivity:");
    for entry in activity.all() {
        println!("  task {} by {}: {}", entry.task_id, entry.actor.username, entry.action);
    }
}
