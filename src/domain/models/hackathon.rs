//! Hackathon lifecycle model.
//!
//! [`HackathonState`] is the coordinator-owned record of where the event
//! stands: the current phase, its progress, aggregate statistics, and which
//! agents have checked in recently.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::agent::AgentId;

/// Days before the event start that count as pre-event.
const PRE_EVENT_WINDOW_DAYS: i64 = 14;

/// Sequential lifecycle stage of a hackathon.
///
/// Ordering follows the lifecycle, so `Planning < PostEvent`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum HackathonPhase {
    #[default]
    Planning,
    Registration,
    PreEvent,
    EventDay,
    PostEvent,
}

impl HackathonPhase {
    /// All phases in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Planning,
        Self::Registration,
        Self::PreEvent,
        Self::EventDay,
        Self::PostEvent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Registration => "registration",
            Self::PreEvent => "pre_event",
            Self::EventDay => "event_day",
            Self::PostEvent => "post_event",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "planning" => Some(Self::Planning),
            "registration" => Some(Self::Registration),
            "pre_event" => Some(Self::PreEvent),
            "event_day" => Some(Self::EventDay),
            "post_event" => Some(Self::PostEvent),
            _ => None,
        }
    }

    /// The phase that follows this one, or `None` for the terminal phase.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Planning => Some(Self::Registration),
            Self::Registration => Some(Self::PreEvent),
            Self::PreEvent => Some(Self::EventDay),
            Self::EventDay => Some(Self::PostEvent),
            Self::PostEvent => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for HackathonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static facts about the event being organized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDetails {
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: String,
    pub expected_participants: u32,
    pub budget: f64,
    pub theme: String,
    pub sponsors: Vec<String>,
}

impl EventDetails {
    /// Lifecycle phase a calendar date falls into.
    ///
    /// Without a start date there is nothing to anchor on, so `fallback` is
    /// returned. A missing end date means a single-day window.
    pub fn phase_for_date(&self, date: DateTime<Utc>, fallback: HackathonPhase) -> HackathonPhase {
        let Some(start) = self.start_date else {
            return fallback;
        };
        let end = self.end_date.unwrap_or(start);

        if date < start {
            if date < start - Duration::days(PRE_EVENT_WINDOW_DAYS) {
                HackathonPhase::Planning
            } else {
                HackathonPhase::PreEvent
            }
        } else if date <= end {
            HackathonPhase::EventDay
        } else {
            HackathonPhase::PostEvent
        }
    }
}

/// Aggregate counters maintained by the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub registered_participants: u32,
    pub formed_teams: u32,
    pub completed_tasks: u32,
    pub pending_tasks: u32,
}

/// Partial statistics reported by an agent. Present fields overwrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsPatch {
    pub registered_participants: Option<u32>,
    pub formed_teams: Option<u32>,
    pub completed_tasks: Option<u32>,
    pub pending_tasks: Option<u32>,
}

impl StatisticsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, stats: &mut Statistics) {
        if let Some(v) = self.registered_participants {
            stats.registered_participants = v;
        }
        if let Some(v) = self.formed_teams {
            stats.formed_teams = v;
        }
        if let Some(v) = self.completed_tasks {
            stats.completed_tasks = v;
        }
        if let Some(v) = self.pending_tasks {
            stats.pending_tasks = v;
        }
    }
}

/// Last known activity of an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentActivity {
    pub last_update: DateTime<Utc>,
    pub status: String,
}

/// Coordinator-owned lifecycle record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HackathonState {
    pub current_phase: HackathonPhase,
    /// Percentage of current-phase tasks completed, 0 to 100.
    pub phase_progress: u8,
    pub active_agents: BTreeMap<AgentId, AgentActivity>,
    pub event_details: EventDetails,
    pub statistics: Statistics,
}

impl HackathonState {
    pub fn new(event_details: EventDetails) -> Self {
        Self {
            event_details,
            ..Self::default()
        }
    }
}
