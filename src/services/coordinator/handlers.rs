//! Per-event-type reactions of the coordinator.

use chrono::{DateTime, Utc};

use super::Coordinator;
use crate::domain::errors::DomainResult;
use crate::domain::models::{
    AgentActivity, AgentId, AgentRole, AlertKind, AlertSeverity, DataQuery, EventPayload,
    NewTask, QueryResult, RequestId, ScheduleItem, StatusReport, TaskFilter, TaskId,
    TaskPriority, FOLLOW_UP_TAG,
};

/// Deadline reminders are only raised inside this window.
const DEADLINE_REMINDER_HOURS: f64 = 24.0;

impl Coordinator {
    pub(super) fn on_registration_updated(&self, new_registrations: u32) -> DomainResult<()> {
        let form_teams = {
            let mut state = self.lock_state();
            let stats = &mut state.hackathon.statistics;
            stats.registered_participants =
                stats.registered_participants.saturating_add(new_registrations);
            let registered = stats.registered_participants;
            let expected = state.hackathon.event_details.expected_participants;

            let threshold_met = expected > 0
                && f64::from(registered) >= self.config.team_formation_threshold * f64::from(expected);
            if threshold_met && !state.team_formation_triggered {
                state.team_formation_triggered = true;
                true
            } else {
                false
            }
        };

        if form_teams {
            tracing::info!("registration threshold reached, preparing team formation");
            self.create_from_templates(
                &self.playbook.team_formation,
                self.playbook.team_formation_phase,
            )?;
        }
        Ok(())
    }

    pub(super) fn on_schedule_changed(
        &self,
        changes: &[String],
        new_items: &[ScheduleItem],
    ) -> DomainResult<()> {
        self.bus.publish(
            EventPayload::StatusUpdate(StatusReport::ScheduleUpdate {
                changes: changes.to_vec(),
            }),
            self.id.clone(),
            None,
        );

        for item in new_items {
            let phase = {
                let state = self.lock_state();
                state
                    .hackathon
                    .event_details
                    .phase_for_date(item.date, state.hackathon.current_phase)
            };
            self.create_task(
                NewTask::new(
                    format!("Prepare for: {}", item.title),
                    format!(
                        "Setup needed for event: {} at {}, {}",
                        item.title, item.time, item.location
                    ),
                    item.kind.responsible_role(),
                    self.id.clone(),
                )
                .with_phase(phase)
                .with_due_date(item.date),
            )?;
        }
        Ok(())
    }

    pub(super) fn on_task_completed(&self, task_id: TaskId) -> DomainResult<()> {
        let is_follow_up = self
            .tasks
            .get_task(task_id)
            .is_some_and(|task| task.is_follow_up());

        let phase = {
            let mut state = self.lock_state();
            let stats = &mut state.hackathon.statistics;
            stats.completed_tasks = stats.completed_tasks.saturating_add(1);
            stats.pending_tasks = stats.pending_tasks.saturating_sub(1);
            state.hackathon.current_phase
        };

        if !is_follow_up {
            self.create_task(
                self.playbook
                    .follow_up
                    .instantiate(&self.id, phase)
                    .with_tag(FOLLOW_UP_TAG),
            )?;
        }

        self.update_phase_progress()
    }

    pub(super) fn on_data_request(&self, request_id: RequestId, query: &DataQuery, requester: &AgentId) {
        tracing::debug!(%request_id, %requester, query = query.name(), "answering data request");
        let result = self.answer_query(query);
        self.bus
            .respond_to_request(request_id, result, self.id.clone(), requester.clone());
    }

    /// Look up one of the queryable state views.
    ///
    /// Unknown custom queries yield [`QueryResult::Error`]; an unknown agent
    /// type yields an empty responsibility list.
    pub fn answer_query(&self, query: &DataQuery) -> QueryResult {
        match query {
            DataQuery::HackathonState => QueryResult::HackathonState(Box::new(self.snapshot())),
            DataQuery::EventDetails => {
                QueryResult::EventDetails(self.lock_state().hackathon.event_details.clone())
            }
            DataQuery::CurrentPhase => {
                let state = self.lock_state();
                QueryResult::CurrentPhase {
                    phase: state.hackathon.current_phase,
                    progress: state.hackathon.phase_progress,
                }
            }
            DataQuery::AgentResponsibilities { agent_type } => QueryResult::AgentResponsibilities(
                AgentRole::from_str(agent_type)
                    .map(|role| {
                        role.responsibilities()
                            .iter()
                            .map(ToString::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
            DataQuery::Statistics => QueryResult::Statistics(self.statistics()),
            DataQuery::TasksByPhase { phase } => QueryResult::Tasks(self.tasks.get_tasks(&TaskFilter {
                phase: Some(*phase),
                ..Default::default()
            })),
            DataQuery::Custom { name, .. } => {
                tracing::warn!(query = %name, "unknown data type requested");
                QueryResult::error(format!("Unknown data type requested: {name}"))
            }
        }
    }

    pub(super) fn on_alert(
        &self,
        kind: &AlertKind,
        message: &str,
        severity: AlertSeverity,
        sender: &AgentId,
    ) -> DomainResult<()> {
        let alert_type = kind.alert_type();
        tracing::warn!(%sender, %severity, alert_type, message, "alert received");

        match kind {
            AlertKind::DeadlineApproaching {
                deadline,
                due_at,
                task_type,
                time_remaining_hours,
            } => {
                let hours = time_remaining_hours.unwrap_or_else(|| {
                    // Minutes keep sub-hour precision
                    #[allow(clippy::cast_precision_loss)]
                    let minutes = (*due_at - Utc::now()).num_minutes() as f64;
                    minutes / 60.0
                });
                self.on_deadline_alert(deadline, *due_at, task_type.as_deref(), hours)?;
            }
            AlertKind::ResourceShortage {
                resource,
                current,
                required,
            } => {
                let phase = self.current_phase();
                self.create_task(
                    NewTask::new(
                        format!("Resolve resource shortage: {resource}"),
                        format!(
                            "Current {resource}: {current}, Required: {required}. Please address this shortage."
                        ),
                        AgentRole::Logistics,
                        self.id.clone(),
                    )
                    .with_priority(TaskPriority::High)
                    .with_phase(phase),
                )?;
            }
            AlertKind::SystemIssue {
                system,
                issue,
                impact,
            } => {
                tracing::warn!(%system, %issue, %impact, "system issue reported");
                if impact.is_severe() {
                    self.bus.publish(
                        EventPayload::StatusUpdate(StatusReport::SystemIssue {
                            system: system.clone(),
                            issue: issue.clone(),
                            impact: *impact,
                        }),
                        self.id.clone(),
                        None,
                    );
                }
            }
            AlertKind::ParticipantProblem {
                participant_id,
                issue,
                urgency,
            } => {
                let priority = if urgency.is_severe() {
                    TaskPriority::High
                } else {
                    TaskPriority::Medium
                };
                let phase = self.current_phase();
                self.create_task(
                    NewTask::new(
                        format!("Participant issue: {issue}"),
                        format!("Participant {participant_id} has reported: {issue}"),
                        AgentRole::Communication,
                        self.id.clone(),
                    )
                    .with_priority(priority)
                    .with_phase(phase),
                )?;
            }
            AlertKind::Other { .. } => {}
        }

        if self.config.is_urgent(severity) {
            let phase = self.current_phase();
            self.create_task(
                NewTask::new(
                    format!("ADDRESS ALERT: {alert_type}"),
                    format!("Urgent attention needed: {message}"),
                    self.config.route_alert(alert_type),
                    self.id.clone(),
                )
                .with_priority(TaskPriority::Urgent)
                .with_phase(phase)
                .with_tag("alert")
                .with_tag(severity.as_str())
                .with_tag(alert_type),
            )?;
        }
        Ok(())
    }

    fn on_deadline_alert(
        &self,
        deadline: &str,
        due_at: DateTime<Utc>,
        task_type: Option<&str>,
        hours: f64,
    ) -> DomainResult<()> {
        if !(hours > 0.0 && hours < DEADLINE_REMINDER_HOURS) {
            tracing::debug!(deadline, hours, "deadline not close enough for a reminder");
            return Ok(());
        }

        let phase = self.current_phase();
        self.create_task(
            NewTask::new(
                format!("REMINDER: {deadline} approaching"),
                format!(
                    "Deadline {deadline} is in {hours:.1} hours. Ensure all preparations are complete."
                ),
                self.config
                    .route_alert(task_type.unwrap_or("deadline_approaching")),
                self.id.clone(),
            )
            .with_priority(TaskPriority::High)
            .with_phase(phase)
            .with_due_date(due_at),
        )?;

        self.bus.publish(
            EventPayload::StatusUpdate(StatusReport::DeadlineReminder {
                deadline: deadline.to_string(),
                time_remaining_hours: hours,
            }),
            self.id.clone(),
            None,
        );
        Ok(())
    }

    pub(super) fn on_status_update(&self, sender: &AgentId, report: &StatusReport) {
        let mut state = self.lock_state();
        state.hackathon.active_agents.insert(
            sender.clone(),
            AgentActivity {
                last_update: Utc::now(),
                status: report.agent_status().unwrap_or("active").to_string(),
            },
        );
        if let StatusReport::AgentReport { statistics, .. } = report {
            statistics.apply_to(&mut state.hackathon.statistics);
        }
    }
}
