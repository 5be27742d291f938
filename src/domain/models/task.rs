//! Task domain model.
//!
//! Tasks are units of hackathon work assigned to an agent. They carry a
//! lifecycle phase, an optional due date, and may depend on other tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::agent::AgentId;
use super::hackathon::HackathonPhase;

/// Tag carried by follow-up tasks spawned after a completion.
pub const FOLLOW_UP_TAG: &str = "follow_up";

/// Unique identifier for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Blocked,
    Canceled,
}

impl TaskStatus {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Blocked,
        Self::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
            Self::Canceled => "canceled",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "pending" => Some(Self::Pending),
            "in_progress" | "inprogress" => Some(Self::InProgress),
            "completed" | "complete" => Some(Self::Completed),
            "blocked" => Some(Self::Blocked),
            "canceled" | "cancelled" => Some(Self::Canceled),
            _ => None,
        }
    }

    /// Completed and canceled tasks are closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }

    /// Transitions permitted when strict checking is enabled.
    pub fn valid_transitions(&self) -> Vec<TaskStatus> {
        match self {
            Self::Pending => vec![Self::InProgress, Self::Blocked, Self::Canceled, Self::Completed],
            Self::InProgress => vec![Self::Completed, Self::Blocked, Self::Pending, Self::Canceled],
            Self::Blocked => vec![Self::Pending, Self::InProgress, Self::Canceled],
            Self::Completed | Self::Canceled => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority level for tasks. Only used for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
    Urgent = 4,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "normal" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A note appended to a task's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNote {
    pub text: String,
    pub added_by: AgentId,
    pub timestamp: DateTime<Utc>,
}

/// A unit of hackathon work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub assigned_to: AgentId,
    pub created_by: AgentId,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub phase: HackathonPhase,
    pub due_date: Option<DateTime<Utc>>,
    pub dependencies: Vec<TaskId>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Vec<TaskNote>,
}

impl Task {
    pub fn is_follow_up(&self) -> bool {
        self.has_tag(FOLLOW_UP_TAG)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Appends a note unless the text is blank.
    pub fn push_note(&mut self, text: &str, added_by: &AgentId, at: DateTime<Utc>) {
        if text.trim().is_empty() {
            return;
        }
        self.notes.push(TaskNote {
            text: text.to_string(),
            added_by: added_by.clone(),
            timestamp: at,
        });
    }

    /// Moves the task to `status`, keeping `completed_at` in step with it.
    pub fn set_status(&mut self, status: TaskStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
        self.completed_at = if status == TaskStatus::Completed {
            Some(at)
        } else {
            None
        };
    }
}

/// Fields accepted when creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub assigned_to: AgentId,
    pub created_by: AgentId,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub phase: HackathonPhase,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        assigned_to: impl Into<AgentId>,
        created_by: impl Into<AgentId>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            assigned_to: assigned_to.into(),
            created_by: created_by.into(),
            priority: TaskPriority::default(),
            phase: HackathonPhase::default(),
            due_date: None,
            dependencies: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_phase(mut self, phase: HackathonPhase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_dependency(mut self, task_id: TaskId) -> Self {
        if !self.dependencies.contains(&task_id) {
            self.dependencies.push(task_id);
        }
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Materializes the task with a fresh id and timestamps.
    pub fn into_task(self, now: DateTime<Utc>) -> Task {
        Task {
            id: TaskId::new(),
            title: self.title,
            description: self.description,
            assigned_to: self.assigned_to,
            created_by: self.created_by,
            status: TaskStatus::Pending,
            priority: self.priority,
            phase: self.phase,
            due_date: self.due_date,
            dependencies: self.dependencies,
            tags: self.tags,
            created_at: now,
            updated_at: now,
            completed_at: None,
            notes: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Task title cannot be empty".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("Task description cannot be empty".to_string());
        }
        if self.assigned_to.as_str().is_empty() {
            return Err("Task must be assigned to an agent".to_string());
        }
        if self.created_by.as_str().is_empty() {
            return Err("Task creator cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Exact-match filter over task fields.
///
/// `tag` and `depends_on` match by membership in the task's list fields.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub phase: Option<HackathonPhase>,
    pub assigned_to: Option<AgentId>,
    pub created_by: Option<AgentId>,
    pub tag: Option<String>,
    pub depends_on: Option<TaskId>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|s| task.status == s)
            && self.priority.is_none_or(|p| task.priority == p)
            && self.phase.is_none_or(|p| task.phase == p)
            && self.assigned_to.as_ref().is_none_or(|a| &task.assigned_to == a)
            && self.created_by.as_ref().is_none_or(|c| &task.created_by == c)
            && self.tag.as_deref().is_none_or(|t| task.has_tag(t))
            && self.depends_on.is_none_or(|d| task.dependencies.contains(&d))
    }
}
