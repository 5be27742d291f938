//! Coordinator - the stateful orchestrator of the hackathon lifecycle.
//!
//! The coordinator subscribes to every event type on the bus and owns the
//! [`HackathonState`]. It is split into:
//!
//! - **handlers**: per-event-type reactions (registrations, schedule, alerts, ...)
//! - **phase**: phase progress and forward-only transitions
//! - **scheduling**: the periodic reminder / notice cycle
//!
//! State sits behind a mutex that is only held for short critical sections.
//! It is never held while publishing or creating tasks, since both re-enter
//! the coordinator's own handlers synchronously.

mod handlers;
mod phase;
mod scheduling;

pub use phase::progress_percent;
pub use scheduling::CycleReport;

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::event_bus::EventBus;
use super::task_service::TaskService;
use crate::domain::errors::DomainResult;
use crate::domain::models::{
    AgentId, Config, CoordinationConfig, Event, EventPayload, EventType, HackathonPhase,
    HackathonState, NewTask, PhasePlaybook, Statistics, SystemStatusReport, Task, TaskTemplate,
};

pub(super) struct CoordinatorState {
    pub(super) hackathon: HackathonState,
    pub(super) team_formation_triggered: bool,
}

/// The hackathon coordinator.
pub struct Coordinator {
    pub(super) id: AgentId,
    pub(super) bus: Arc<EventBus>,
    pub(super) tasks: Arc<TaskService>,
    pub(super) config: CoordinationConfig,
    pub(super) playbook: PhasePlaybook,
    pub(super) state: Mutex<CoordinatorState>,
    started: AtomicBool,
}

impl Coordinator {
    pub fn new(bus: Arc<EventBus>, tasks: Arc<TaskService>, config: &Config) -> Arc<Self> {
        Arc::new(Self {
            id: AgentId::coordinator(),
            bus,
            tasks,
            config: config.coordination.clone(),
            playbook: config.playbook.clone(),
            state: Mutex::new(CoordinatorState {
                hackathon: HackathonState::new(config.event.clone()),
                team_formation_triggered: false,
            }),
            started: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn task_service(&self) -> &Arc<TaskService> {
        &self.tasks
    }

    /// Subscribe to the bus, seed the current phase's tasks and broadcast status.
    ///
    /// Calling `start` again is a no-op.
    pub fn start(self: &Arc<Self>) -> DomainResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("coordinator already started");
            return Ok(());
        }

        let weak = Arc::downgrade(self);
        self.bus
            .subscribe(EventType::ALL, self.id.clone(), move |event: &Event| {
                match weak.upgrade() {
                    Some(coordinator) => coordinator.handle_event(event),
                    None => Ok(()),
                }
            });

        let phase = self.current_phase();
        let created = self.create_from_templates(self.playbook.tasks_for(phase), phase)?;
        tracing::info!(%phase, initial_tasks = created, "coordinator initialized");

        self.broadcast_system_status();
        Ok(())
    }

    /// Drop every subscription held by the coordinator.
    pub fn stop(&self) {
        self.bus.unsubscribe(EventType::ALL, self.id.clone());
        self.started.store(false, Ordering::SeqCst);
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Route one bus event to its handler.
    pub fn handle_event(&self, event: &Event) -> anyhow::Result<()> {
        tracing::debug!(event_type = %event.event_type(), sender = %event.sender, "coordinator received event");

        match &event.payload {
            EventPayload::RegistrationUpdated { new_registrations } => {
                self.on_registration_updated(*new_registrations)?;
            }
            EventPayload::ScheduleChanged { changes, new_items } => {
                self.on_schedule_changed(changes, new_items)?;
            }
            EventPayload::TaskCompleted { task_id, .. } => self.on_task_completed(*task_id)?,
            EventPayload::DataRequest { request_id, query } => {
                self.on_data_request(*request_id, query, &event.sender);
            }
            EventPayload::Alert {
                kind,
                message,
                severity,
            } => self.on_alert(kind, message, *severity, &event.sender)?,
            EventPayload::StatusUpdate(report) => self.on_status_update(&event.sender, report),
            EventPayload::TaskAssigned { .. }
            | EventPayload::DataResponse { .. }
            | EventPayload::SystemStatus(_) => {
                tracing::trace!(event_type = %event.event_type(), "no coordinator action");
            }
        }
        Ok(())
    }

    /// Copy of the full hackathon state.
    pub fn snapshot(&self) -> HackathonState {
        self.lock_state().hackathon.clone()
    }

    pub fn current_phase(&self) -> HackathonPhase {
        self.lock_state().hackathon.current_phase
    }

    pub fn phase_progress(&self) -> u8 {
        self.lock_state().hackathon.phase_progress
    }

    pub fn statistics(&self) -> Statistics {
        self.lock_state().hackathon.statistics
    }

    pub fn team_formation_triggered(&self) -> bool {
        self.lock_state().team_formation_triggered
    }

    /// Publish the aggregate status to every agent.
    pub fn broadcast_system_status(&self) -> usize {
        let report = {
            let state = self.lock_state();
            SystemStatusReport {
                current_phase: state.hackathon.current_phase,
                phase_progress: state.hackathon.phase_progress,
                statistics: state.hackathon.statistics,
                active_agents: state.hackathon.active_agents.keys().cloned().collect(),
                timestamp: Utc::now(),
            }
        };
        self.bus
            .publish(EventPayload::SystemStatus(report), self.id.clone(), None)
    }

    pub(super) fn lock_state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a task on the coordinator's behalf and count it as pending.
    pub(super) fn create_task(&self, new_task: NewTask) -> DomainResult<Task> {
        let task = self.tasks.create_task(new_task)?;
        let mut state = self.lock_state();
        state.hackathon.statistics.pending_tasks =
            state.hackathon.statistics.pending_tasks.saturating_add(1);
        Ok(task)
    }

    pub(super) fn create_from_templates(
        &self,
        templates: &[TaskTemplate],
        phase: HackathonPhase,
    ) -> DomainResult<usize> {
        for template in templates {
            self.create_task(template.instantiate(&self.id, phase))?;
        }
        Ok(templates.len())
    }
}
