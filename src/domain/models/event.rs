//! Bus event model.
//!
//! Every event carries a strongly typed [`EventPayload`]; the event type is
//! derived from the payload so the two can never disagree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::agent::{AgentId, AgentRole};
use super::hackathon::{EventDetails, HackathonPhase, HackathonState, Statistics, StatisticsPatch};
use super::task::{Task, TaskId, TaskPriority, TaskStatus};

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation id for a data request and its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of event types a subscriber can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    RegistrationUpdated,
    ScheduleChanged,
    TaskCompleted,
    TaskAssigned,
    DataRequest,
    DataResponse,
    Alert,
    StatusUpdate,
    SystemStatus,
}

impl EventType {
    pub const ALL: [Self; 9] = [
        Self::RegistrationUpdated,
        Self::ScheduleChanged,
        Self::TaskCompleted,
        Self::TaskAssigned,
        Self::DataRequest,
        Self::DataResponse,
        Self::Alert,
        Self::StatusUpdate,
        Self::SystemStatus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegistrationUpdated => "registration_updated",
            Self::ScheduleChanged => "schedule_changed",
            Self::TaskCompleted => "task_completed",
            Self::TaskAssigned => "task_assigned",
            Self::DataRequest => "data_request",
            Self::DataResponse => "data_response",
            Self::Alert => "alert",
            Self::StatusUpdate => "status_update",
            Self::SystemStatus => "system_status",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity attached to alerts and to impact/urgency fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    /// High and critical.
    pub fn is_severe(&self) -> bool {
        *self >= Self::High
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an alert is about, with the details each kind needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    DeadlineApproaching {
        deadline: String,
        due_at: DateTime<Utc>,
        /// Alert type used to route the reminder, if not the deadline itself.
        task_type: Option<String>,
        time_remaining_hours: Option<f64>,
    },
    ResourceShortage {
        resource: String,
        current: u32,
        required: u32,
    },
    SystemIssue {
        system: String,
        issue: String,
        impact: AlertSeverity,
    },
    ParticipantProblem {
        participant_id: String,
        issue: String,
        urgency: AlertSeverity,
    },
    /// Any alert type without a dedicated handler, routed by name.
    Other { alert_type: String },
}

impl AlertKind {
    /// Routing key for the alert.
    pub fn alert_type(&self) -> &str {
        match self {
            Self::DeadlineApproaching { .. } => "deadline_approaching",
            Self::ResourceShortage { .. } => "resource_shortage",
            Self::SystemIssue { .. } => "system_issue",
            Self::ParticipantProblem { .. } => "participant_problem",
            Self::Other { alert_type } => alert_type,
        }
    }

    pub fn other(alert_type: impl Into<String>) -> Self {
        Self::Other {
            alert_type: alert_type.into(),
        }
    }
}

/// Kind of a schedule entry, used to pick who prepares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleItemKind {
    Workshop,
    Judging,
    Announcement,
    #[serde(other)]
    Other,
}

impl ScheduleItemKind {
    pub fn responsible_role(&self) -> AgentRole {
        match self {
            Self::Workshop => AgentRole::Scheduling,
            Self::Judging => AgentRole::Judging,
            Self::Announcement => AgentRole::Communication,
            Self::Other => AgentRole::Logistics,
        }
    }
}

/// A new entry on the event schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub title: String,
    pub kind: ScheduleItemKind,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
}

/// State views answerable through a data request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "data_type", rename_all = "snake_case")]
pub enum DataQuery {
    HackathonState,
    EventDetails,
    CurrentPhase,
    AgentResponsibilities { agent_type: String },
    Statistics,
    TasksByPhase { phase: HackathonPhase },
    /// Free-form query for views outside the built-in set.
    Custom {
        name: String,
        #[serde(default)]
        params: serde_json::Value,
    },
}

impl DataQuery {
    pub fn name(&self) -> &str {
        match self {
            Self::HackathonState => "hackathon_state",
            Self::EventDetails => "event_details",
            Self::CurrentPhase => "current_phase",
            Self::AgentResponsibilities { .. } => "agent_responsibilities",
            Self::Statistics => "statistics",
            Self::TasksByPhase { .. } => "tasks_by_phase",
            Self::Custom { name, .. } => name,
        }
    }
}

/// Payload of a data response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryResult {
    HackathonState(Box<HackathonState>),
    EventDetails(EventDetails),
    CurrentPhase { phase: HackathonPhase, progress: u8 },
    AgentResponsibilities(Vec<String>),
    Statistics(Statistics),
    Tasks(Vec<Task>),
    Custom(serde_json::Value),
    /// Lookup failure, returned instead of raising.
    Error { error: String },
}

impl QueryResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

/// Body of a status-update event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusReport {
    /// An agent reporting its own status and any statistics it owns.
    AgentReport {
        status: Option<String>,
        #[serde(default)]
        statistics: StatisticsPatch,
    },
    TaskStatusChange {
        task_id: TaskId,
        title: String,
        old_status: TaskStatus,
        new_status: TaskStatus,
        updated_by: AgentId,
    },
    ScheduleUpdate {
        changes: Vec<String>,
    },
    PhaseChange {
        old_phase: HackathonPhase,
        new_phase: HackathonPhase,
    },
    DeadlineReminder {
        deadline: String,
        time_remaining_hours: f64,
    },
    SystemIssue {
        system: String,
        issue: String,
        impact: AlertSeverity,
    },
    TaskReminder {
        task_id: TaskId,
        title: String,
        due_date: DateTime<Utc>,
    },
    HighPriorityTask {
        task_id: TaskId,
        title: String,
        priority: TaskPriority,
    },
}

impl StatusReport {
    /// Status the sender reports for itself, if any.
    pub fn agent_status(&self) -> Option<&str> {
        match self {
            Self::AgentReport { status, .. } => status.as_deref(),
            _ => None,
        }
    }
}

/// Periodic snapshot broadcast by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatusReport {
    pub current_phase: HackathonPhase,
    pub phase_progress: u8,
    pub statistics: Statistics,
    pub active_agents: Vec<AgentId>,
    pub timestamp: DateTime<Utc>,
}

/// Typed event body, one variant per [`EventType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    RegistrationUpdated {
        new_registrations: u32,
    },
    ScheduleChanged {
        #[serde(default)]
        changes: Vec<String>,
        #[serde(default)]
        new_items: Vec<ScheduleItem>,
    },
    TaskCompleted {
        task_id: TaskId,
        title: String,
        assigned_to: AgentId,
        completed_by: AgentId,
    },
    TaskAssigned {
        task_id: TaskId,
        title: String,
        assigned_to: AgentId,
        previous_assignee: Option<AgentId>,
        assigned_by: AgentId,
        priority: TaskPriority,
    },
    DataRequest {
        request_id: RequestId,
        query: DataQuery,
    },
    DataResponse {
        request_id: RequestId,
        data: QueryResult,
    },
    Alert {
        kind: AlertKind,
        message: String,
        severity: AlertSeverity,
    },
    StatusUpdate(StatusReport),
    SystemStatus(SystemStatusReport),
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::RegistrationUpdated { .. } => EventType::RegistrationUpdated,
            Self::ScheduleChanged { .. } => EventType::ScheduleChanged,
            Self::TaskCompleted { .. } => EventType::TaskCompleted,
            Self::TaskAssigned { .. } => EventType::TaskAssigned,
            Self::DataRequest { .. } => EventType::DataRequest,
            Self::DataResponse { .. } => EventType::DataResponse,
            Self::Alert { .. } => EventType::Alert,
            Self::StatusUpdate(_) => EventType::StatusUpdate,
            Self::SystemStatus(_) => EventType::SystemStatus,
        }
    }
}

/// Envelope delivered to subscribers. Exists only for the length of a dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub sender: AgentId,
    pub target_agent: Option<AgentId>,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(payload: EventPayload, sender: impl Into<AgentId>) -> Self {
        Self {
            id: EventId::new(),
            sender: sender.into(),
            target_agent: None,
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn with_target(mut self, target: impl Into<AgentId>) -> Self {
        self.target_agent = Some(target.into());
        self
    }

    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }

    /// Whether `subscriber` should see this event given its target.
    pub fn is_addressed_to(&self, subscriber: &AgentId) -> bool {
        self.target_agent.as_ref().is_none_or(|t| t == subscriber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_follows_payload() {
        let event = Event::new(
            EventPayload::RegistrationUpdated {
                new_registrations: 3,
            },
            "registration",
        );
        assert_eq!(event.event_type(), EventType::RegistrationUpdated);

        let status = EventPayload::StatusUpdate(StatusReport::ScheduleUpdate { changes: vec![] });
        assert_eq!(status.event_type(), EventType::StatusUpdate);
    }

    #[test]
    fn test_targeted_event_addresses_single_agent() {
        let event = Event::new(
            EventPayload::Alert {
                kind: AlertKind::other("venue_issue"),
                message: "Projector broken".to_string(),
                severity: AlertSeverity::Medium,
            },
            "logistics",
        )
        .with_target(AgentRole::Coordinator);

        assert!(event.is_addressed_to(&AgentId::coordinator()));
        assert!(!event.is_addressed_to(&AgentId::from("judging")));
    }

    #[test]
    fn test_alert_type_names() {
        let kind = AlertKind::ResourceShortage {
            resource: "chairs".to_string(),
            current: 50,
            required: 120,
        };
        assert_eq!(kind.alert_type(), "resource_shortage");
        assert_eq!(AlertKind::other("team_conflict").alert_type(), "team_conflict");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(AlertSeverity::Critical.is_severe());
        assert!(AlertSeverity::High.is_severe());
        assert!(!AlertSeverity::Medium.is_severe());
        assert_eq!(AlertSeverity::from_str("CRITICAL"), Some(AlertSeverity::Critical));
    }

    #[test]
    fn test_payload_serializes_with_type_tag() {
        let payload = EventPayload::RegistrationUpdated {
            new_registrations: 7,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "registration_updated");
        assert_eq!(json["data"]["new_registrations"], 7);
    }

    #[test]
    fn test_schedule_item_kind_routing() {
        assert_eq!(ScheduleItemKind::Workshop.responsible_role(), AgentRole::Scheduling);
        assert_eq!(ScheduleItemKind::Judging.responsible_role(), AgentRole::Judging);
        assert_eq!(
            ScheduleItemKind::Announcement.responsible_role(),
            AgentRole::Communication
        );
        assert_eq!(ScheduleItemKind::Other.responsible_role(), AgentRole::Logistics);

        let kind: ScheduleItemKind = serde_json::from_str("\"networking\"").unwrap();
        assert_eq!(kind, ScheduleItemKind::Other);
    }
}
