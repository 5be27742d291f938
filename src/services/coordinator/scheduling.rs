//! Periodic scheduling cycle.
//!
//! The only autonomous behavior of the coordinator: remind about tasks that
//! are due soon, nudge the owners of the most pressing actionable tasks, and
//! rebroadcast system status.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::Coordinator;
use crate::domain::models::{EventPayload, StatusReport};

/// What one scheduling cycle published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Due-soon reminders broadcast.
    pub reminders: usize,
    /// High-priority notices sent to assignees.
    pub notices: usize,
}

impl Coordinator {
    /// Run one scheduling cycle now.
    pub fn run_scheduling_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        let due_soon = self.tasks.get_tasks_due_soon(self.config.due_soon_days);
        for task in &due_soon {
            let Some(due_date) = task.due_date else {
                continue;
            };
            self.bus.publish(
                EventPayload::StatusUpdate(StatusReport::TaskReminder {
                    task_id: task.id,
                    title: task.title.clone(),
                    due_date,
                }),
                self.id.clone(),
                None,
            );
            report.reminders += 1;
        }

        for task in self.tasks.get_next_actionable_tasks(self.config.actionable_limit) {
            self.bus.publish(
                EventPayload::StatusUpdate(StatusReport::HighPriorityTask {
                    task_id: task.id,
                    title: task.title.clone(),
                    priority: task.priority,
                }),
                self.id.clone(),
                Some(task.assigned_to.clone()),
            );
            report.notices += 1;
        }

        self.broadcast_system_status();
        tracing::info!(
            reminders = report.reminders,
            notices = report.notices,
            "scheduling cycle complete"
        );
        report
    }

    /// Run [`run_scheduling_cycle`](Self::run_scheduling_cycle) on the
    /// configured interval until `cancel` fires.
    pub fn spawn_scheduling_cycle(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        let period = Duration::from_millis(self.config.scheduling_interval_ms);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        coordinator.run_scheduling_cycle();
                    }
                }
            }
            tracing::debug!("scheduling cycle stopped");
        })
    }
}
