//! Static knowledge-base corpus
//!
//! Reads the JSON knowledge base produced by the offline ingestion step.
//! Items may carry precomputed embeddings; those that do not are embedded
//! on demand by the retrieval service.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::rag::document::{Document, DocumentMetadata};

const DEFAULT_TITLE: &str = "Knowledge Base Item";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KnowledgeBaseFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    documents: Vec<KnowledgeBaseItem>,
}

#[derive(Debug, Deserialize)]
struct KnowledgeBaseItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    embedding: Vec<f32>,
    #[serde(default)]
    metadata: DocumentMetadata,
}

/// Read-only documents merged into every query's candidate set
#[derive(Debug, Clone, Default)]
pub struct StaticCorpus {
    documents: Vec<Document>,
}

impl StaticCorpus {
    /// Build a corpus from ready-made documents
    ///
    /// When several documents share an id only the first is kept.
    pub fn new(documents: Vec<Document>) -> Self {
        let mut seen = HashSet::new();
        let documents = documents
            .into_iter()
            .filter(|doc| {
                let first = seen.insert(doc.id.clone());
                if !first {
                    tracing::warn!(id = %doc.id, "Skipping knowledge base item with duplicate id");
                }
                first
            })
            .collect();
        Self { documents }
    }

    /// Parse a knowledge-base JSON document.
    ///
    /// Items without an id get the stable id `kb-{index}`. Items without
    /// content are dropped.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: KnowledgeBaseFile = serde_json::from_str(json)
            .map_err(|e| Error::Corpus(format!("invalid knowledge base: {}", e)))?;

        let mut documents = Vec::with_capacity(file.documents.len());
        for (index, item) in file.documents.into_iter().enumerate() {
            let id = item.id.unwrap_or_else(|| format!("kb-{}", index));
            let content = item.content.or(item.text).unwrap_or_default();
            if content.trim().is_empty() {
                tracing::warn!(id = %id, "Skipping knowledge base item without content");
                continue;
            }

            let mut metadata = item.metadata;
            metadata.title = item
                .title
                .or(metadata.title)
                .or_else(|| Some(DEFAULT_TITLE.to_string()));
            if metadata.source.is_none() {
                metadata.source = item.source;
            }

            documents.push(Document {
                id,
                content,
                embedding: item.embedding,
                metadata,
            });
        }

        let corpus = Self::new(documents);
        tracing::info!(
            version = file.version.as_deref().unwrap_or("unversioned"),
            documents = corpus.len(),
            "Loaded static corpus"
        );
        Ok(corpus)
    }

    /// Load a knowledge-base JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json_str(&json)
    }

    /// Documents visible to the given agent, or all of them
    pub fn visible_to<'a>(
        &'a self,
        agent_filter: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Document> + 'a {
        self.documents
            .iter()
            .filter(move |d| agent_filter.map_or(true, |agent| d.is_visible_to(agent)))
    }

    /// All documents
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KB: &str = r#"{
        "version": "1.0.0",
        "lastUpdate": "2024-05-01T10:00:00Z",
        "totalDocuments": 4,
        "documents": [
            { "source": "guide.pdf", "content": "chunk zero", "embedding": [0.1, 0.2] },
            { "id": "named", "text": "from text field", "title": "Named", "metadata": { "agentId": "sales" } },
            { "content": "   " },
            { "content": "owned elsewhere", "metadata": { "agentId": "brand", "title": "Brand Notes" } }
        ]
    }"#;

    #[test]
    fn test_parse_knowledge_base() {
        let corpus = StaticCorpus::from_json_str(KB).expect("parse");
        assert_eq!(corpus.len(), 3);

        let docs = corpus.documents();
        assert_eq!(docs[0].id, "kb-0");
        assert_eq!(docs[0].title(), DEFAULT_TITLE);
        assert_eq!(docs[0].metadata.source.as_deref(), Some("guide.pdf"));
        assert_eq!(docs[0].embedding, vec![0.1, 0.2]);

        assert_eq!(docs[1].id, "named");
        assert_eq!(docs[1].content, "from text field");
        assert_eq!(docs[1].title(), "Named");

        // index is taken before blank items are dropped, so ids stay stable
        assert_eq!(docs[2].id, "kb-3");
        assert_eq!(docs[2].title(), "Brand Notes");
    }

    #[test]
    fn test_visibility_filter() {
        let corpus = StaticCorpus::from_json_str(KB).expect("parse");
        let ids: Vec<_> = corpus.visible_to(Some("sales")).map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["kb-0", "named"]);
        assert_eq!(corpus.visible_to(None).count(), 3);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let corpus = StaticCorpus::from_json_str(
            r#"{ "documents": [
                { "id": "dup", "content": "first" },
                { "id": "dup", "content": "second" },
                { "content": "third" }
            ] }"#,
        )
        .expect("parse");

        let docs = corpus.documents();
        assert_eq!(corpus.len(), 2);
        assert_eq!(docs[0].content, "first");
        assert_eq!(docs[1].id, "kb-2");
    }

    #[test]
    fn test_invalid_json_is_corpus_error() {
        let err = StaticCorpus::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Corpus(_)));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("knowledgeBase.json");
        tokio::fs::write(&path, KB).await.expect("write");

        let corpus = StaticCorpus::load(&path).await.expect("load");
        assert_eq!(corpus.len(), 3);
    }
}
