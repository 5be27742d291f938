//! `simulate`: drive a hackathon through every phase with mock agents.
//!
//! Every task is handed to the mock agent of its assignee, whose answer is
//! recorded as the completion note. Registrations are published when
//! registration opens and a resource alert is raised before the event, so the
//! run exercises team formation and alert handling as well as phase changes.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::CoordinatorStack;
use crate::adapters::agents::MockAgent;
use crate::cli::display::{colorize_status, list_table, output, render_list, CommandOutput};
use crate::domain::models::{
    AgentId, AgentRole, AlertKind, AlertSeverity, Config, DataQuery, EventPayload, HackathonPhase,
    QueryResult, Statistics, Task, TaskFilter, TaskStatus,
};
use crate::domain::ports::Agent;
use crate::services::{AgentClient, BusStats, CycleReport};

/// Passes over a phase's open tasks before giving up on it.
const MAX_ROUNDS: usize = 8;

/// Expected participants used when the configuration does not name any.
const DEFAULT_EXPECTED_PARTICIPANTS: u32 = 100;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Registrations published when registration opens
    #[arg(short, long, default_value_t = 120)]
    pub registrations: u32,

    /// Expected participant count (defaults to the configured value, or 100)
    #[arg(short, long)]
    pub expected: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PhaseRow {
    pub phase: HackathonPhase,
    pub tasks: usize,
    pub completed: usize,
    pub follow_ups: usize,
    pub open: usize,
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: TaskStatus,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub event: String,
    pub phases_visited: Vec<HackathonPhase>,
    pub final_phase: HackathonPhase,
    pub phase_progress: u8,
    pub statistics: Statistics,
    pub team_formation_triggered: bool,
    /// Statistics as returned to an agent through a data request.
    pub queried_statistics: Option<Statistics>,
    pub first_cycle: CycleReport,
    pub schedule: Vec<PhaseRow>,
    pub by_status: Vec<StatusCount>,
    pub bus: BusStats,
}

impl SimulationReport {
    fn status_summary(&self) -> String {
        self.by_status
            .iter()
            .map(|entry| format!("{} {}", colorize_status(entry.status.as_str()), entry.count))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl CommandOutput for SimulationReport {
    fn to_human(&self) -> String {
        let visited: Vec<&str> = self.phases_visited.iter().map(HackathonPhase::as_str).collect();
        let mut lines = vec![
            format!("Simulated hackathon: {}", self.event),
            format!("Phases: {}", visited.join(" -> ")),
            format!("Final phase: {} ({}%)", self.final_phase, self.phase_progress),
            format!(
                "Participants: {} registered, team formation {}",
                self.statistics.registered_participants,
                if self.team_formation_triggered {
                    "triggered"
                } else {
                    "not triggered"
                }
            ),
            format!(
                "Tasks: {} completed, {} pending",
                self.statistics.completed_tasks, self.statistics.pending_tasks
            ),
            format!("By status: {}", self.status_summary()),
            format!(
                "First scheduling cycle: {} reminders, {} priority notices",
                self.first_cycle.reminders, self.first_cycle.notices
            ),
            format!(
                "Bus: {} events, {} deliveries, {} handler failures",
                self.bus.published, self.bus.deliveries, self.bus.handler_failures
            ),
            String::new(),
        ];

        let mut table = list_table(&["phase", "tasks", "completed", "follow-ups", "open"]);
        for row in &self.schedule {
            table.add_row(vec![
                row.phase.to_string(),
                row.tasks.to_string(),
                row.completed.to_string(),
                row.follow_ups.to_string(),
                row.open.to_string(),
            ]);
        }
        lines.push(render_list("phase", &table, self.schedule.len()));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: SimulateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let report = run_simulation(&args, config).await?;
    output(&report, json_mode);
    Ok(())
}

/// Run the whole lifecycle in-process and summarize the outcome.
pub async fn run_simulation(args: &SimulateArgs, config: &Config) -> Result<SimulationReport> {
    let mut config = config.clone();
    if let Some(expected) = args.expected {
        config.event.expected_participants = expected;
    } else if config.event.expected_participants == 0 {
        config.event.expected_participants = DEFAULT_EXPECTED_PARTICIPANTS;
    }

    let simulation = Simulation::new(&config);
    simulation.stack.coordinator.start()?;
    let first_cycle = simulation.stack.coordinator.run_scheduling_cycle();

    let mut phases_visited = vec![simulation.stack.coordinator.current_phase()];
    loop {
        let phase = simulation.stack.coordinator.current_phase();
        simulation.phase_events(phase, args.registrations);
        let completed = simulation.work_phase(phase).await?;
        tracing::info!(%phase, completed, "simulated phase");

        let next = simulation.stack.coordinator.current_phase();
        if next == phase {
            break;
        }
        phases_visited.push(next);
    }

    let queried_statistics = simulation.query_statistics().await;
    let coordinator = &simulation.stack.coordinator;
    Ok(SimulationReport {
        event: config.event.name.clone(),
        phases_visited,
        final_phase: coordinator.current_phase(),
        phase_progress: coordinator.phase_progress(),
        statistics: coordinator.statistics(),
        team_formation_triggered: coordinator.team_formation_triggered(),
        queried_statistics,
        first_cycle,
        schedule: simulation.schedule(),
        by_status: simulation
            .stack
            .tasks
            .count_by_status()
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect(),
        bus: simulation.stack.bus.stats(),
    })
}

struct Simulation {
    stack: CoordinatorStack,
    agents: HashMap<AgentId, MockAgent>,
    clients: HashMap<AgentRole, AgentClient>,
}

impl Simulation {
    fn new(config: &Config) -> Self {
        let stack = CoordinatorStack::build(config);
        let agents = AgentRole::ALL
            .into_iter()
            .map(|role| (AgentId::from(role), MockAgent::new(role)))
            .collect();
        let clients = AgentRole::ALL
            .into_iter()
            .filter(|role| *role != AgentRole::Coordinator)
            .map(|role| (role, AgentClient::new(role, Arc::clone(&stack.bus))))
            .collect();
        Self {
            stack,
            agents,
            clients,
        }
    }

    /// Outside events that happen while `phase` is current.
    fn phase_events(&self, phase: HackathonPhase, registrations: u32) {
        match phase {
            HackathonPhase::Registration => {
                if let Some(client) = self.clients.get(&AgentRole::Registration) {
                    client.publish_event(
                        EventPayload::RegistrationUpdated {
                            new_registrations: registrations,
                        },
                        None,
                    );
                }
            }
            HackathonPhase::PreEvent => {
                if let Some(client) = self.clients.get(&AgentRole::Logistics) {
                    client.alert_coordinator(
                        AlertKind::ResourceShortage {
                            resource: "power strips".to_string(),
                            current: 20,
                            required: 60,
                        },
                        "Not enough power strips for the hacking floor",
                        AlertSeverity::High,
                    );
                }
            }
            _ => {}
        }
    }

    /// Work the open tasks of `phase` until none remain.
    async fn work_phase(&self, phase: HackathonPhase) -> Result<usize> {
        let mut completed = 0;
        for _ in 0..MAX_ROUNDS {
            let open: Vec<Task> = self
                .stack
                .tasks
                .get_tasks(&TaskFilter {
                    phase: Some(phase),
                    ..Default::default()
                })
                .into_iter()
                .filter(|task| !task.status.is_closed())
                .collect();
            if open.is_empty() {
                break;
            }
            for task in &open {
                if self.work_task(task).await? {
                    completed += 1;
                }
            }
        }
        Ok(completed)
    }

    async fn work_task(&self, task: &Task) -> Result<bool> {
        let tasks = &self.stack.tasks;
        let Some(agent) = self.agents.get(&task.assigned_to) else {
            tracing::warn!(task_id = %task.id, assignee = %task.assigned_to, "no agent for task");
            tasks.update_task_status(
                task.id,
                TaskStatus::Canceled,
                self.stack.coordinator.id(),
                Some("No agent available"),
            )?;
            return Ok(false);
        };

        let context = serde_json::json!({
            "task_id": task.id,
            "phase": task.phase,
            "priority": task.priority,
        });
        let prompt = format!("Complete task: {}\n{}", task.title, task.description);
        match agent.generate_response(&prompt, &context).await {
            Ok(response) => {
                tasks.update_task_status(
                    task.id,
                    TaskStatus::Completed,
                    agent.id(),
                    Some(&response.content),
                )?;
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(task_id = %task.id, error = %err, "agent could not complete task");
                tasks.update_task_status(
                    task.id,
                    TaskStatus::Blocked,
                    agent.id(),
                    Some(&err.to_string()),
                )?;
                Ok(false)
            }
        }
    }

    async fn query_statistics(&self) -> Option<Statistics> {
        let client = self.clients.get(&AgentRole::Communication)?;
        match client.request_data(DataQuery::Statistics).await {
            Ok(QueryResult::Statistics(statistics)) => Some(statistics),
            Ok(other) => {
                tracing::warn!(?other, "unexpected statistics response");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "statistics request failed");
                None
            }
        }
    }

    fn schedule(&self) -> Vec<PhaseRow> {
        self.stack
            .tasks
            .get_task_schedule_by_phase()
            .into_iter()
            .map(|(phase, tasks)| PhaseRow {
                phase,
                tasks: tasks.len(),
                completed: tasks
                    .iter()
                    .filter(|t| t.status == TaskStatus::Completed)
                    .count(),
                follow_ups: tasks.iter().filter(|t| t.is_follow_up()).count(),
                open: tasks.iter().filter(|t| !t.status.is_closed()).count(),
            })
            .collect()
    }
}
