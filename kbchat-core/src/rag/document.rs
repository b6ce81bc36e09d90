//! Document model shared by the store, the static corpus and the ranker

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Category marking a document as visible to every agent
pub const GENERAL_CATEGORY: &str = "general";

/// Title used when a document has none
pub const UNTITLED: &str = "Untitled";

/// Metadata attached to a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Human readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-form category; [`GENERAL_CATEGORY`] makes the document agent-agnostic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Where the content came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Ordered tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Owning agent; `None` means visible to all agents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Attributes without a dedicated field
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentMetadata {
    /// Metadata with a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Set the owning agent
    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Whether a document carrying this metadata may be retrieved for `agent_id`.
    ///
    /// Visible when owned by that agent, owned by nobody, or in the
    /// general category.
    pub fn is_visible_to(&self, agent_id: &str) -> bool {
        match &self.agent_id {
            None => true,
            Some(owner) if owner == agent_id => true,
            Some(_) => self.category.as_deref() == Some(GENERAL_CATEGORY),
        }
    }
}

/// A retrievable document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier, unique within the live document set
    pub id: String,
    /// The text body
    pub content: String,
    /// Embedding vector; empty until computed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
    /// Metadata associated with the document
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create an unembedded document
    pub fn new(id: impl Into<String>, content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            embedding: Vec::new(),
            metadata,
        }
    }

    /// Whether the embedding has been computed
    pub fn has_embedding(&self) -> bool {
        !self.embedding.is_empty()
    }

    /// Title, or a placeholder when absent
    pub fn title(&self) -> &str {
        self.metadata.title.as_deref().unwrap_or(UNTITLED)
    }

    /// Title for reporting, falling back to the id
    pub fn display_name(&self) -> &str {
        self.metadata.title.as_deref().unwrap_or(&self.id)
    }

    /// See [`DocumentMetadata::is_visible_to`]
    pub fn is_visible_to(&self, agent_id: &str) -> bool {
        self.metadata.is_visible_to(agent_id)
    }
}

/// A document with its similarity to a query
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    /// The matched document
    pub document: Document,
    /// Cosine similarity in [-1, 1]
    pub similarity: f32,
}
