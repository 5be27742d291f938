//! Phase progress and transitions.

use super::Coordinator;
use crate::domain::errors::DomainResult;
use crate::domain::models::{EventPayload, HackathonPhase, StatusReport, TaskFilter, TaskStatus};

/// Rounded percentage of `completed` over `total`.
///
/// Only a finished phase reports 100; anything short of that stays at 99 or below.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    if completed >= total {
        return 100;
    }
    let percent = (completed * 200 + total) / (total * 2);
    u8::try_from(percent.min(99)).unwrap_or(99)
}

impl Coordinator {
    /// Recompute current-phase progress and advance once every counted task is done.
    ///
    /// Follow-up tasks are not counted. A phase with no counted tasks keeps
    /// its progress untouched.
    pub(super) fn update_phase_progress(&self) -> DomainResult<()> {
        let phase = self.current_phase();
        let tasks = self.tasks.get_tasks(&TaskFilter {
            phase: Some(phase),
            ..Default::default()
        });
        let counted: Vec<_> = tasks.iter().filter(|t| !t.is_follow_up()).collect();
        if counted.is_empty() {
            return Ok(());
        }
        let completed = counted
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let progress = progress_percent(completed, counted.len());
        let finished = completed == counted.len();

        let next = {
            let mut state = self.lock_state();
            if state.hackathon.current_phase != phase {
                // Another completion already moved the phase on
                return Ok(());
            }
            state.hackathon.phase_progress = progress;
            match phase.next() {
                Some(next) if finished => {
                    state.hackathon.current_phase = next;
                    state.hackathon.phase_progress = 0;
                    Some(next)
                }
                _ => None,
            }
        };
        tracing::debug!(%phase, progress, completed, total = counted.len(), "phase progress updated");

        if let Some(next) = next {
            self.enter_phase(phase, next)?;
        }
        self.broadcast_system_status();
        Ok(())
    }

    fn enter_phase(&self, old_phase: HackathonPhase, new_phase: HackathonPhase) -> DomainResult<()> {
        tracing::info!(from = %old_phase, to = %new_phase, "phase transition");

        self.bus.publish(
            EventPayload::StatusUpdate(StatusReport::PhaseChange {
                old_phase,
                new_phase,
            }),
            self.id.clone(),
            None,
        );

        let created = self.create_from_templates(self.playbook.tasks_for(new_phase), new_phase)?;
        tracing::info!(phase = %new_phase, tasks = created, "phase tasks created");
        Ok(())
    }
}
