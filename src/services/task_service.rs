//! Task service implementing the task store.
//!
//! Wraps a [`TaskRepository`] with creation defaults, status bookkeeping,
//! priority/dependency-aware queries, and the bus events that announce
//! task changes.

use chrono::{DateTime, Duration, Utc};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::event_bus::EventBus;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AgentId, EventPayload, HackathonPhase, NewTask, StatusReport, Task, TaskFilter, TaskId,
    TaskStatus,
};
use crate::domain::ports::TaskRepository;

/// Default limit for [`TaskService::get_next_actionable_tasks`].
pub const DEFAULT_ACTIONABLE_LIMIT: usize = 5;

pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
    bus: Arc<EventBus>,
    strict_transitions: bool,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>, bus: Arc<EventBus>) -> Self {
        Self {
            repo,
            bus,
            strict_transitions: false,
        }
    }

    /// Reject status changes outside [`TaskStatus::valid_transitions`].
    pub fn with_strict_transitions(mut self, strict: bool) -> Self {
        self.strict_transitions = strict;
        self
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Create a task and announce its assignment.
    pub fn create_task(&self, new_task: NewTask) -> DomainResult<Task> {
        new_task.validate().map_err(DomainError::ValidationFailed)?;

        let task = new_task.into_task(Utc::now());
        self.repo.insert(task.clone());
        tracing::info!(
            task_id = %task.id,
            title = %task.title,
            assigned_to = %task.assigned_to,
            priority = %task.priority,
            phase = %task.phase,
            "task created"
        );

        self.bus.publish(
            EventPayload::TaskAssigned {
                task_id: task.id,
                title: task.title.clone(),
                assigned_to: task.assigned_to.clone(),
                previous_assignee: None,
                assigned_by: task.created_by.clone(),
                priority: task.priority,
            },
            task.created_by.clone(),
            None,
        );
        Ok(task)
    }

    /// Change a task's status.
    ///
    /// Returns `Ok(None)` for an unknown id. Completion publishes a
    /// task-completed event; every other status publishes a status update.
    pub fn update_task_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
        updated_by: &AgentId,
        note: Option<&str>,
    ) -> DomainResult<Option<Task>> {
        let strict = self.strict_transitions;
        let mut old_status = status;
        let updated = self.repo.update(task_id, &mut |task: &mut Task| {
            if strict && !task.status.can_transition_to(status) {
                return Err(DomainError::InvalidStateTransition {
                    task_id,
                    from: task.status,
                    to: status,
                });
            }
            let now = Utc::now();
            old_status = task.status;
            task.set_status(status, now);
            if let Some(text) = note {
                task.push_note(text, updated_by, now);
            }
            Ok(())
        })?;

        let Some(task) = updated else {
            tracing::debug!(%task_id, "status update for unknown task");
            return Ok(None);
        };
        tracing::info!(%task_id, from = %old_status, to = %status, by = %updated_by, "task status updated");

        let payload = if status == TaskStatus::Completed {
            EventPayload::TaskCompleted {
                task_id,
                title: task.title.clone(),
                assigned_to: task.assigned_to.clone(),
                completed_by: updated_by.clone(),
            }
        } else {
            EventPayload::StatusUpdate(StatusReport::TaskStatusChange {
                task_id,
                title: task.title.clone(),
                old_status,
                new_status: status,
                updated_by: updated_by.clone(),
            })
        };
        self.bus.publish(payload, updated_by.clone(), None);

        Ok(Some(task))
    }

    /// Hand a task to another agent.
    pub fn reassign_task(
        &self,
        task_id: TaskId,
        new_assignee: &AgentId,
        assigned_by: &AgentId,
        note: Option<&str>,
    ) -> DomainResult<Option<Task>> {
        let mut previous = None;
        let updated = self.repo.update(task_id, &mut |task: &mut Task| {
            let now = Utc::now();
            previous = Some(std::mem::replace(&mut task.assigned_to, new_assignee.clone()));
            task.updated_at = now;
            if let Some(text) = note {
                task.push_note(text, assigned_by, now);
            }
            Ok(())
        })?;

        let Some(task) = updated else {
            return Ok(None);
        };
        tracing::info!(%task_id, from = ?previous, to = %new_assignee, "task reassigned");

        self.bus.publish(
            EventPayload::TaskAssigned {
                task_id,
                title: task.title.clone(),
                assigned_to: new_assignee.clone(),
                previous_assignee: previous,
                assigned_by: assigned_by.clone(),
                priority: task.priority,
            },
            assigned_by.clone(),
            None,
        );
        Ok(Some(task))
    }

    /// Append a note without changing anything else.
    pub fn add_task_note(
        &self,
        task_id: TaskId,
        text: &str,
        added_by: &AgentId,
    ) -> DomainResult<Option<Task>> {
        self.repo.update(task_id, &mut |task: &mut Task| {
            let now = Utc::now();
            task.push_note(text, added_by, now);
            task.updated_at = now;
            Ok(())
        })
    }

    pub fn get_task(&self, task_id: TaskId) -> Option<Task> {
        self.repo.get(task_id)
    }

    pub fn get_tasks(&self, filter: &TaskFilter) -> Vec<Task> {
        self.repo.list(filter)
    }

    pub fn get_tasks_by_assignee(&self, agent: &AgentId, status: Option<TaskStatus>) -> Vec<Task> {
        self.repo.list(&TaskFilter {
            assigned_to: Some(agent.clone()),
            status,
            ..Default::default()
        })
    }

    /// Open tasks due after now and no later than `days` from now.
    pub fn get_tasks_due_soon(&self, days: u32) -> Vec<Task> {
        self.get_tasks_due_soon_at(days, Utc::now())
    }

    pub fn get_tasks_due_soon_at(&self, days: u32, now: DateTime<Utc>) -> Vec<Task> {
        let horizon = now + Duration::days(i64::from(days));
        self.repo
            .list(&TaskFilter::default())
            .into_iter()
            .filter(|t| !t.status.is_closed())
            .filter(|t| t.due_date.is_some_and(|due| due > now && due <= horizon))
            .collect()
    }

    /// Open tasks whose dependencies are all completed, most pressing first.
    ///
    /// Order: priority (urgent first), then due date (dated before undated,
    /// earlier first), then creation time. A dependency on a task that does
    /// not exist keeps the dependent out.
    pub fn get_next_actionable_tasks(&self, limit: usize) -> Vec<Task> {
        let all = self.repo.list(&TaskFilter::default());
        let status_of: HashMap<TaskId, TaskStatus> = all.iter().map(|t| (t.id, t.status)).collect();

        let mut actionable: Vec<Task> = all
            .into_iter()
            .filter(|t| !t.status.is_closed())
            .filter(|t| {
                t.dependencies
                    .iter()
                    .all(|dep| status_of.get(dep) == Some(&TaskStatus::Completed))
            })
            .collect();

        actionable.sort_by_key(|t| {
            (
                Reverse(t.priority),
                t.due_date.is_none(),
                t.due_date,
                t.created_at,
            )
        });
        actionable.truncate(limit);
        actionable
    }

    /// All tasks grouped by phase. Every phase has an entry.
    pub fn get_task_schedule_by_phase(&self) -> BTreeMap<HackathonPhase, Vec<Task>> {
        let mut schedule: BTreeMap<HackathonPhase, Vec<Task>> =
            HackathonPhase::ALL.iter().map(|p| (*p, Vec::new())).collect();
        for task in self.repo.list(&TaskFilter::default()) {
            schedule.entry(task.phase).or_default().push(task);
        }
        schedule
    }

    /// Number of tasks per status, in [`TaskStatus::ALL`] order.
    pub fn count_by_status(&self) -> Vec<(TaskStatus, usize)> {
        TaskStatus::ALL
            .iter()
            .map(|status| {
                let filter = TaskFilter {
                    status: Some(*status),
                    ..Default::default()
                };
                (*status, self.repo.count(&filter))
            })
            .collect()
    }
}
