//! Agent port - the response-generation capability every agent exposes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;
use crate::domain::models::{AgentId, AgentRole};

/// Metadata returned alongside generated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub agent: AgentId,
    pub role: AgentRole,
    pub generated_at: DateTime<Utc>,
    /// Backend that produced the content, if any.
    pub model: Option<String>,
}

/// Content generated by an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub content: String,
    pub metadata: ResponseMetadata,
}

/// A bus participant able to answer free-form prompts.
///
/// Implementations may call out to an LLM; the coordinator core never
/// depends on what happens behind this trait.
#[async_trait]
pub trait Agent: Send + Sync {
    fn id(&self) -> &AgentId;

    fn role(&self) -> AgentRole;

    async fn generate_response(
        &self,
        prompt: &str,
        context: &serde_json::Value,
    ) -> DomainResult<AgentResponse>;
}
