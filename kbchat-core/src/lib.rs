//! # KBChat Core
//!
//! Core types, traits, and the retrieval engine for the KBChat multi-agent
//! assistant.
//!
//! This crate provides:
//! - Retrieval (`rag`) - document store, embedding cache, ranking, context assembly
//! - Agents (`agent`) - agent roster and the chat turn
//! - Message types (`message`) - chat messages and validation
//! - Providers (`provider`) - chat completion provider trait
//! - Logging (`logging`) - tracing setup

#![warn(missing_docs)]

pub mod agent;
pub mod error;
pub mod logging;
pub mod message;
pub mod provider;
pub mod rag;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::agent::{default_roster, find_agent, AgentProfile, ChatResponder};
    pub use crate::error::{Error, Result};
    pub use crate::message::{Message, Role};
    pub use crate::provider::{ChatRequest, Provider};
    pub use crate::rag::{
        DocumentMetadata, DocumentStore, Embeddings, RagEvent, RetrievalConfig,
        RetrievalConfigUpdate, RetrievalService, StaticCorpus,
    };
}
