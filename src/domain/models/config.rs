use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::agent::{AgentId, AgentRole};
use super::event::AlertSeverity;
use super::hackathon::{EventDetails, HackathonPhase};
use super::task::{NewTask, TaskPriority};

/// Main configuration structure for the coordinator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Timing, thresholds and routing for coordination
    #[serde(default)]
    pub coordination: CoordinationConfig,

    /// Facts about the hackathon being run
    #[serde(default)]
    pub event: EventDetails,

    /// Task batches created at each lifecycle step
    #[serde(default)]
    pub playbook: PhasePlaybook,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Coordination tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CoordinationConfig {
    /// How long a data request waits for its response
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// How often stale pending requests are swept
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,

    /// How often the scheduling cycle runs
    #[serde(default = "default_scheduling_interval_ms")]
    pub scheduling_interval_ms: u64,

    /// Window for due-soon reminders, in days
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: u32,

    /// Number of actionable tasks announced per cycle
    #[serde(default = "default_actionable_limit")]
    pub actionable_limit: usize,

    /// Fraction of expected participants that triggers team formation
    #[serde(default = "default_team_formation_threshold")]
    pub team_formation_threshold: f64,

    /// Alert severities that raise an urgent task
    #[serde(default = "default_urgent_severities")]
    pub urgent_severities: Vec<AlertSeverity>,

    /// Alert type to responsible agent. Unlisted types go to the coordinator.
    #[serde(default = "default_alert_routes")]
    pub alert_routes: BTreeMap<String, AgentId>,

    /// Reject task status changes outside the transition table
    #[serde(default)]
    pub strict_transitions: bool,
}

const fn default_request_timeout_ms() -> u64 {
    5_000
}

const fn default_sweep_interval_ms() -> u64 {
    60_000
}

const fn default_scheduling_interval_ms() -> u64 {
    60_000
}

const fn default_due_soon_days() -> u32 {
    2
}

const fn default_actionable_limit() -> usize {
    3
}

const fn default_team_formation_threshold() -> f64 {
    0.5
}

fn default_urgent_severities() -> Vec<AlertSeverity> {
    vec![AlertSeverity::High, AlertSeverity::Critical]
}

fn default_alert_routes() -> BTreeMap<String, AgentId> {
    [
        ("deadline_approaching", AgentRole::Scheduling),
        ("submission_issue", AgentRole::Submission),
        ("registration_problem", AgentRole::Registration),
        ("team_conflict", AgentRole::TeamFormation),
        ("venue_issue", AgentRole::Logistics),
        ("judging_question", AgentRole::Judging),
        ("system_issue", AgentRole::Coordinator),
        ("resource_shortage", AgentRole::Logistics),
        ("participant_problem", AgentRole::Communication),
    ]
    .into_iter()
    .map(|(alert, role)| (alert.to_string(), AgentId::from(role)))
    .collect()
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
            scheduling_interval_ms: default_scheduling_interval_ms(),
            due_soon_days: default_due_soon_days(),
            actionable_limit: default_actionable_limit(),
            team_formation_threshold: default_team_formation_threshold(),
            urgent_severities: default_urgent_severities(),
            alert_routes: default_alert_routes(),
            strict_transitions: false,
        }
    }
}

impl CoordinationConfig {
    /// Agent responsible for an alert type.
    pub fn route_alert(&self, alert_type: &str) -> AgentId {
        self.alert_routes
            .get(alert_type)
            .cloned()
            .unwrap_or_else(AgentId::coordinator)
    }

    pub fn is_urgent(&self, severity: AlertSeverity) -> bool {
        self.urgent_severities.contains(&severity)
    }
}

/// Template for a task the coordinator creates on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub title: String,
    pub description: String,
    pub assigned_to: AgentRole,
    #[serde(default)]
    pub priority: TaskPriority,
}

impl TaskTemplate {
    pub fn new(
        title: &str,
        description: &str,
        assigned_to: AgentRole,
        priority: TaskPriority,
    ) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            assigned_to,
            priority,
        }
    }

    /// Task fields for this template in `phase`.
    pub fn instantiate(&self, created_by: &AgentId, phase: HackathonPhase) -> NewTask {
        NewTask::new(
            self.title.as_str(),
            self.description.as_str(),
            self.assigned_to,
            created_by.clone(),
        )
        .with_priority(self.priority)
        .with_phase(phase)
    }
}

/// Task batches per lifecycle step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhasePlaybook {
    /// Created when the coordinator starts, in the planning phase
    pub planning: Vec<TaskTemplate>,
    pub registration: Vec<TaskTemplate>,
    pub pre_event: Vec<TaskTemplate>,
    pub event_day: Vec<TaskTemplate>,
    pub post_event: Vec<TaskTemplate>,
    /// Created once registrations cross the team formation threshold
    pub team_formation: Vec<TaskTemplate>,
    pub team_formation_phase: HackathonPhase,
    /// Created after every non-follow-up task completion
    pub follow_up: TaskTemplate,
}

impl PhasePlaybook {
    pub fn tasks_for(&self, phase: HackathonPhase) -> &[TaskTemplate] {
        match phase {
            HackathonPhase::Planning => &self.planning,
            HackathonPhase::Registration => &self.registration,
            HackathonPhase::PreEvent => &self.pre_event,
            HackathonPhase::EventDay => &self.event_day,
            HackathonPhase::PostEvent => &self.post_event,
        }
    }
}

impl Default for PhasePlaybook {
    fn default() -> Self {
        use AgentRole::{
            Communication, Coordinator, Judging, Logistics, Marketing, Registration, Scheduling,
            Submission, TeamFormation,
        };
        use TaskPriority::{High, Low, Medium, Urgent};

        Self {
            planning: vec![
                TaskTemplate::new(
                    "Define hackathon theme and objectives",
                    "Establish the core theme, objectives, and success metrics for the hackathon",
                    Coordinator,
                    High,
                ),
                TaskTemplate::new(
                    "Create registration form",
                    "Design and implement the participant registration form",
                    Registration,
                    High,
                ),
                TaskTemplate::new(
                    "Develop initial marketing plan",
                    "Create a comprehensive marketing strategy to promote the hackathon",
                    Marketing,
                    Medium,
                ),
                TaskTemplate::new(
                    "Prepare logistics checklist",
                    "Create a detailed checklist for venue, equipment, and catering needs",
                    Logistics,
                    Medium,
                ),
                TaskTemplate::new(
                    "Design judging criteria",
                    "Establish evaluation framework and scoring system for project submissions",
                    Judging,
                    Medium,
                ),
                TaskTemplate::new(
                    "Set up submission platform",
                    "Configure and test the project submission system",
                    Submission,
                    Medium,
                ),
            ],
            registration: vec![
                TaskTemplate::new(
                    "Launch registration form",
                    "Finalize and publish the participant registration form",
                    Registration,
                    Urgent,
                ),
                TaskTemplate::new(
                    "Prepare marketing campaign",
                    "Create social media and email campaign to promote registration",
                    Marketing,
                    High,
                ),
            ],
            pre_event: vec![
                TaskTemplate::new(
                    "Finalize workshop schedule",
                    "Confirm all workshops, speakers, and timeslots",
                    Scheduling,
                    High,
                ),
                TaskTemplate::new(
                    "Send pre-event instructions",
                    "Email all participants with event details and preparation instructions",
                    Communication,
                    High,
                ),
                TaskTemplate::new(
                    "Prepare venue setup plan",
                    "Create detailed plan for venue layout, equipment, and signage",
                    Logistics,
                    Medium,
                ),
            ],
            event_day: vec![
                TaskTemplate::new(
                    "Coordinate check-in process",
                    "Setup and manage participant check-in stations",
                    Registration,
                    Urgent,
                ),
                TaskTemplate::new(
                    "Monitor submission platform",
                    "Ensure project submission system is working and assist teams",
                    Submission,
                    High,
                ),
                TaskTemplate::new(
                    "Brief judges on evaluation process",
                    "Provide judges with evaluation criteria and scoring instructions",
                    Judging,
                    High,
                ),
            ],
            post_event: vec![
                TaskTemplate::new(
                    "Collect participant feedback",
                    "Send feedback survey to all participants and analyze results",
                    Communication,
                    High,
                ),
                TaskTemplate::new(
                    "Publish event highlights",
                    "Create recap of the event with photos, statistics, and winning projects",
                    Marketing,
                    Medium,
                ),
                TaskTemplate::new(
                    "Prepare event report",
                    "Compile comprehensive report on the hackathon outcomes, metrics, and learnings",
                    Coordinator,
                    Medium,
                ),
            ],
            team_formation: vec![
                TaskTemplate::new(
                    "Prepare team formation strategy",
                    "Analyze registered participants and develop a strategy for optimal team formation",
                    TeamFormation,
                    High,
                ),
                TaskTemplate::new(
                    "Create skill assessment form",
                    "Develop questionnaire to assess participant skills and team preferences",
                    TeamFormation,
                    Medium,
                ),
            ],
            team_formation_phase: HackathonPhase::Registration,
            follow_up: TaskTemplate::new(
                "Send task completion notification",
                "Notify relevant stakeholders about recent task completion",
                Communication,
                Low,
            ),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,

    /// Also log to stderr when writing files
    #[serde(default = "default_true")]
    pub enable_console: bool,

    /// Number of days to retain logs
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_retention_days() -> u32 {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
            enable_console: true,
            retention_days: default_retention_days(),
        }
    }
}
