use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use hackathon_coordinator::adapters::memory::InMemoryTaskRepository;
use hackathon_coordinator::domain::models::{
    NewTask, Task, TaskFilter, TaskId, TaskPriority, TaskStatus,
};
use hackathon_coordinator::services::{EventBus, TaskService};
use proptest::prelude::*;

const PRIORITIES: [TaskPriority; 4] = [
    TaskPriority::Low,
    TaskPriority::Medium,
    TaskPriority::High,
    TaskPriority::Urgent,
];

#[derive(Debug, Clone)]
struct TaskShape {
    priority: usize,
    due_in_hours: Option<i64>,
    status: usize,
    /// Indices of earlier tasks this one depends on.
    depends_on: Vec<usize>,
    /// Also depend on a task that was never stored.
    missing_dependency: bool,
}

fn task_shape() -> impl Strategy<Value = TaskShape> {
    (
        0..PRIORITIES.len(),
        proptest::option::of(-48i64..240),
        0..TaskStatus::ALL.len(),
        proptest::collection::vec(0usize..20, 0..3),
        proptest::bool::weighted(0.1),
    )
        .prop_map(|(priority, due_in_hours, status, depends_on, missing_dependency)| TaskShape {
            priority,
            due_in_hours,
            status,
            depends_on,
            missing_dependency,
        })
}

fn build(shapes: &[TaskShape]) -> TaskService {
    let service = TaskService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(EventBus::default()),
    );
    let now = Utc::now();
    let mut ids: Vec<TaskId> = Vec::new();

    for (i, shape) in shapes.iter().enumerate() {
        let mut new_task = NewTask::new(format!("Task {i}"), "Property test task", "logistics", "coordinator")
            .with_priority(PRIORITIES[shape.priority]);
        if let Some(hours) = shape.due_in_hours {
            new_task = new_task.with_due_date(now + Duration::hours(hours));
        }
        for dep in shape.depends_on.iter().filter(|&&d| d < i) {
            new_task = new_task.with_dependency(ids[*dep]);
        }
        if shape.missing_dependency {
            new_task = new_task.with_dependency(TaskId::new());
        }
        let task = service.create_task(new_task).unwrap();
        ids.push(task.id);
    }

    for (shape, id) in shapes.iter().zip(&ids) {
        let status = TaskStatus::ALL[shape.status];
        if status != TaskStatus::Pending {
            service
                .update_task_status(*id, status, &"logistics".into(), None)
                .unwrap();
        }
    }
    service
}

fn sort_key(task: &Task) -> impl Ord {
    (
        Reverse(task.priority),
        task.due_date.is_none(),
        task.due_date,
        task.created_at,
    )
}

fn is_actionable(task: &Task, status_of: &HashMap<TaskId, TaskStatus>) -> bool {
    !task.status.is_closed()
        && task
            .dependencies
            .iter()
            .all(|dep| status_of.get(dep) == Some(&TaskStatus::Completed))
}

proptest! {
    /// Property: Actionable tasks come back in priority, due date, creation order
    #[test]
    fn prop_actionable_tasks_are_ordered(
        shapes in proptest::collection::vec(task_shape(), 0..20),
        limit in 1usize..25,
    ) {
        let service = build(&shapes);
        let actionable = service.get_next_actionable_tasks(limit);

        prop_assert!(actionable.len() <= limit);
        for pair in actionable.windows(2) {
            prop_assert!(sort_key(&pair[0]) <= sort_key(&pair[1]),
                "{} should not precede {}", pair[0].title, pair[1].title);
        }
    }

    /// Property: Only open tasks with every dependency completed are actionable,
    /// and none of them are left out when the limit allows
    #[test]
    fn prop_actionable_tasks_respect_dependencies(
        shapes in proptest::collection::vec(task_shape(), 0..20),
    ) {
        let service = build(&shapes);
        let all = service.get_tasks(&TaskFilter::default());
        let status_of: HashMap<TaskId, TaskStatus> = all.iter().map(|t| (t.id, t.status)).collect();

        let actionable = service.get_next_actionable_tasks(all.len() + 1);
        for task in &actionable {
            prop_assert!(is_actionable(task, &status_of), "{} is not actionable", task.title);
        }

        let expected = all.iter().filter(|t| is_actionable(t, &status_of)).count();
        prop_assert_eq!(actionable.len(), expected);
    }

    /// Property: Due-soon results are open and fall inside the window
    #[test]
    fn prop_due_soon_window(
        shapes in proptest::collection::vec(task_shape(), 0..20),
        days in 0u32..10,
    ) {
        let service = build(&shapes);
        let now = Utc::now();
        let horizon = now + Duration::days(i64::from(days));

        for task in service.get_tasks_due_soon_at(days, now) {
            prop_assert!(!task.status.is_closed());
            let due = task.due_date.unwrap();
            prop_assert!(due > now && due <= horizon);
        }
    }
}
