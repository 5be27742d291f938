//! Agent identity and role model.
//!
//! Every participant on the bus is addressed by an [`AgentId`]. The built-in
//! roles map onto well-known ids so that routing tables can be expressed in
//! configuration as plain strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a bus participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id of the coordinator agent.
    pub fn coordinator() -> Self {
        AgentRole::Coordinator.into()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<AgentRole> for AgentId {
    fn from(role: AgentRole) -> Self {
        Self(role.as_str().to_string())
    }
}

impl PartialEq<AgentRole> for AgentId {
    fn eq(&self, other: &AgentRole) -> bool {
        self.0 == other.as_str()
    }
}

/// Built-in agent roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Registration,
    TeamFormation,
    Scheduling,
    Submission,
    Judging,
    Communication,
    Marketing,
    Logistics,
    Coordinator,
}

impl AgentRole {
    /// All roles in a stable order.
    pub const ALL: [Self; 9] = [
        Self::Registration,
        Self::TeamFormation,
        Self::Scheduling,
        Self::Submission,
        Self::Judging,
        Self::Communication,
        Self::Marketing,
        Self::Logistics,
        Self::Coordinator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::TeamFormation => "team_formation",
            Self::Scheduling => "scheduling",
            Self::Submission => "submission",
            Self::Judging => "judging",
            Self::Communication => "communication",
            Self::Marketing => "marketing",
            Self::Logistics => "logistics",
            Self::Coordinator => "coordinator",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "registration" => Some(Self::Registration),
            "team_formation" | "teamformation" => Some(Self::TeamFormation),
            "scheduling" => Some(Self::Scheduling),
            "submission" => Some(Self::Submission),
            "judging" => Some(Self::Judging),
            "communication" => Some(Self::Communication),
            "marketing" => Some(Self::Marketing),
            "logistics" => Some(Self::Logistics),
            "coordinator" => Some(Self::Coordinator),
            _ => None,
        }
    }

    /// Areas this role is accountable for.
    pub fn responsibilities(&self) -> &'static [&'static str] {
        match self {
            Self::Registration => &[
                "participant_management",
                "attendee_tracking",
                "confirmation_emails",
            ],
            Self::TeamFormation => &["team_matching", "skill_assessment", "team_communication"],
            Self::Scheduling => &["event_timeline", "workshop_scheduling", "agenda_management"],
            Self::Submission => &[
                "project_collection",
                "submission_validation",
                "deadline_management",
            ],
            Self::Judging => &[
                "judge_coordination",
                "evaluation_criteria",
                "scoring_management",
            ],
            Self::Communication => &[
                "announcements",
                "q&a_support",
                "notification_delivery",
            ],
            Self::Marketing => &["promotion", "social_media", "content_creation"],
            Self::Logistics => &[
                "venue_management",
                "catering",
                "equipment_setup",
                "signage",
            ],
            Self::Coordinator => &[
                "task_delegation",
                "progress_monitoring",
                "inter_agent_coordination",
            ],
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
