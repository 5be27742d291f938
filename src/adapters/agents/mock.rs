//! Mock agent for development and testing.
//!
//! Answers prompts with canned, role-specific text chosen by keyword, so the
//! rest of the system can run without a language model behind it.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AgentId, AgentRole};
use crate::domain::ports::{Agent, AgentResponse, ResponseMetadata};

/// Scripted reply for a prompt keyword.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub content: String,
    pub fail: bool,
}

impl MockReply {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            fail: false,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            content: reason.into(),
            fail: true,
        }
    }
}

/// Mock agent returning canned responses.
pub struct MockAgent {
    id: AgentId,
    role: AgentRole,
    overrides: Mutex<HashMap<String, MockReply>>,
    prompts: Mutex<Vec<String>>,
}

impl MockAgent {
    pub fn new(role: AgentRole) -> Self {
        Self {
            id: role.into(),
            role,
            overrides: Mutex::new(HashMap::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Use `reply` for any prompt containing `keyword`.
    pub fn with_reply(self, keyword: impl Into<String>, reply: MockReply) -> Self {
        self.overrides
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(keyword.into().to_lowercase(), reply);
        self
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn scripted(&self, prompt: &str) -> Option<MockReply> {
        let overrides = self.overrides.lock().unwrap_or_else(PoisonError::into_inner);
        overrides
            .iter()
            .find(|(keyword, _)| prompt.contains(keyword.as_str()))
            .map(|(_, reply)| reply.clone())
    }

    fn canned(&self, prompt: &str) -> String {
        let mentions = |word: &str| prompt.contains(word);
        let text = match self.role {
            AgentRole::Registration if mentions("register") => {
                "Open the event page, choose the hackathon and press Register. Have your name, email and skills ready."
            }
            AgentRole::Registration => {
                "I can help with registration and profile setup. What do you need to know?"
            }
            AgentRole::TeamFormation if mentions("find") => {
                "Use team matching on the dashboard to browse participants by skill and send invitations."
            }
            AgentRole::TeamFormation => {
                "Teams work best with two to five members mixing engineering and design skills."
            }
            AgentRole::Scheduling if mentions("workshop") => {
                "Workshops run in the morning of each event day. Check the agenda for rooms and speakers."
            }
            AgentRole::Scheduling => "The full agenda is published on the schedule page.",
            AgentRole::Submission if mentions("deadline") => {
                "Submissions close at the end of the final event day. Late entries are not accepted."
            }
            AgentRole::Submission => {
                "Submit a repository link, a short demo video and a project description."
            }
            AgentRole::Judging => {
                "Projects are scored on innovation, technical execution, design and impact."
            }
            AgentRole::Communication => {
                "Announcements go out by email and on the event channel. Ask here if anything is unclear."
            }
            AgentRole::Marketing => {
                "Share the event with the official hashtag and tag sponsors to widen reach."
            }
            AgentRole::Logistics => {
                "Venue, catering and equipment are tracked on the logistics checklist."
            }
            AgentRole::Coordinator => {
                "I coordinate tasks across agents and track the hackathon's progress."
            }
        };
        text.to_string()
    }
}

#[async_trait]
impl Agent for MockAgent {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn role(&self) -> AgentRole {
        self.role
    }

    async fn generate_response(
        &self,
        prompt: &str,
        _context: &serde_json::Value,
    ) -> DomainResult<AgentResponse> {
        tracing::debug!(agent = %self.id, prompt_len = prompt.len(), "mock agent processing prompt");
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        let lowered = prompt.to_lowercase();
        let content = match self.scripted(&lowered) {
            Some(reply) if reply.fail => {
                return Err(DomainError::AgentFailed {
                    agent: self.id.to_string(),
                    reason: reply.content,
                });
            }
            Some(reply) => reply.content,
            None => self.canned(&lowered),
        };

        Ok(AgentResponse {
            content,
            metadata: ResponseMetadata {
                agent: self.id.clone(),
                role: self.role,
                generated_at: Utc::now(),
                model: Some("mock".to_string()),
            },
        })
    }
}
