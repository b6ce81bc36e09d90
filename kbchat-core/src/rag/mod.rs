//! RAG (Retrieval-Augmented Generation)
//!
//! An in-memory knowledge base that embeds documents on demand, ranks them
//! against a query by cosine similarity and assembles a bounded text block
//! for prompting.
//!
//! - [`DocumentStore`] - seed corpus plus user-added documents
//! - [`StaticCorpus`] - read-only knowledge base loaded from JSON
//! - [`EmbeddingCache`] - document id to vector cache
//! - [`ranker`] - cosine similarity and ranking
//! - [`ContextBuilder`] - size-bounded context assembly
//! - [`RetrievalService`] - orchestration and observability

use async_trait::async_trait;

use crate::error::Result;

pub mod cache;
pub mod config;
pub mod context;
pub mod corpus;
pub mod document;
pub mod events;
pub mod ranker;
pub mod seed;
pub mod service;
pub mod store;

pub use cache::{EmbeddingCache, InMemoryEmbeddingCache, LruEmbeddingCache};
pub use config::{RetrievalConfig, RetrievalConfigUpdate};
pub use context::ContextBuilder;
pub use corpus::StaticCorpus;
pub use document::{Document, DocumentMetadata, RankedResult, GENERAL_CATEGORY};
pub use events::{BroadcastObserver, EventDispatcher, RagEvent, RagObserver, TracingObserver};
pub use ranker::{cosine_similarity, rank};
pub use service::{RetrievalService, RetrievalServiceBuilder};
pub use store::DocumentStore;

/// Interface for embeddings providers
#[async_trait]
pub trait Embeddings: Send + Sync {
    /// Generate embedding vector for text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
