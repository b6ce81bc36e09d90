//! Agents and the chat turn
//!
//! An agent is a persona with its own system prompt. Each agent sees the
//! knowledge-base documents it owns plus the shared ones.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::message::{validate_messages, Message};
use crate::provider::{ChatRequest, Provider};
use crate::rag::RetrievalService;

/// A chat persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Identifier, also used to scope knowledge-base documents
    pub id: String,
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Personality summary
    pub personality: String,
    /// System prompt sent with every turn
    pub system_prompt: String,
}

impl AgentProfile {
    /// Create a profile
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        personality: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            personality: personality.into(),
            system_prompt: system_prompt.into(),
        }
    }

    /// System prompt with retrieved knowledge appended, when there is any
    pub fn compose_system_prompt(&self, context: Option<&str>) -> String {
        match context {
            Some(ctx) if !ctx.trim().is_empty() => format!(
                "{}\n\nAdditional context from the knowledge base:\n{}",
                self.system_prompt, ctx
            ),
            _ => self.system_prompt.clone(),
        }
    }
}

/// The built-in agents
pub fn default_roster() -> Vec<AgentProfile> {
    vec![
        AgentProfile::new(
            "strategist",
            "Strategist",
            "Analytical agent focused on business planning and insights",
            "Analytical, strategic and data driven.",
            "You are a digital marketing and high-ticket business strategist. Answer using the \
             knowledge base provided with each question and the conversation so far. When the \
             sources do not cover the question, say so instead of guessing.",
        ),
        AgentProfile::new(
            "brand",
            "Brand Specialist",
            "Branding and marketing specialist focused on brand building and creative strategy",
            "Creative, inventive and brand obsessed.",
            "You are a branding specialist. Help the user build a strong brand identity and \
             creative marketing strategies. Ground your advice in the knowledge base when it \
             is provided.",
        ),
        AgentProfile::new(
            "sales",
            "Sales Development Rep",
            "Prospecting and sales agent with direct, persuasive language",
            "Direct, persuasive and results oriented.",
            "You are a sales development representative. Be direct and persuasive, focus on \
             prospecting, consultative selling and closing. Quote prices and conditions only \
             from the knowledge base.",
        ),
    ]
}

/// Look up a built-in agent by id
pub fn find_agent(id: &str) -> Option<AgentProfile> {
    default_roster().into_iter().find(|a| a.id == id)
}

/// Answers a user message as an agent, with knowledge-base context when
/// retrieval finds any
pub struct ChatResponder {
    provider: Arc<dyn Provider>,
    retrieval: Arc<RetrievalService>,
    model: Option<String>,
}

impl ChatResponder {
    /// Create a responder
    pub fn new(provider: Arc<dyn Provider>, retrieval: Arc<RetrievalService>) -> Self {
        Self {
            provider,
            retrieval,
            model: None,
        }
    }

    /// Override the provider's default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Messages for one turn: the (possibly context-augmented) system prompt
    /// followed by the user text, both trimmed
    pub fn build_messages(agent: &AgentProfile, user_text: &str, context: Option<&str>) -> Vec<Message> {
        vec![
            Message::system(agent.compose_system_prompt(context)).trimmed(),
            Message::user(user_text).trimmed(),
        ]
    }

    /// Produce the agent's reply.
    ///
    /// Retrieval never blocks the turn: without context the bare system
    /// prompt is used. Provider errors are returned to the caller.
    #[instrument(skip(self, agent, user_text), fields(agent = %agent.id, provider = self.provider.name()))]
    pub async fn respond(&self, agent: &AgentProfile, user_text: &str) -> Result<String> {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Err(Error::invalid_message("user message must not be empty"));
        }
        if agent.system_prompt.trim().is_empty() {
            return Err(Error::invalid_message(format!(
                "agent '{}' has no system prompt",
                agent.id
            )));
        }

        let context = self
            .retrieval
            .get_relevant_context_for(user_text, &agent.id)
            .await;
        tracing::debug!(context_found = context.is_some(), "Prepared chat turn");

        let messages = Self::build_messages(agent, user_text, context.as_deref());
        validate_messages(&messages)?;

        let mut request = ChatRequest::new(messages);
        request.model = self.model.clone();
        self.provider.complete(request).await
    }
}
