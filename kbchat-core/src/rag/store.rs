//! In-memory document store
//!
//! Holds the seed corpus plus documents added at runtime. The whole set
//! lives behind one lock and every operation completes under a single
//! guard, so concurrent readers never observe a half-applied mutation.

use chrono::Utc;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::rag::document::{Document, DocumentMetadata};
use crate::rag::seed;

/// The working set of retrievable documents
pub struct DocumentStore {
    seed: Vec<Document>,
    documents: RwLock<Vec<Document>>,
}

impl DocumentStore {
    /// Create a store seeded with `seed`, restored on every [`clear`](Self::clear)
    pub fn new(seed: Vec<Document>) -> Self {
        Self {
            documents: RwLock::new(seed.clone()),
            seed,
        }
    }

    /// Create a store seeded with the built-in knowledge base
    pub fn with_default_seed() -> Self {
        Self::new(seed::default_corpus())
    }

    /// Create a store with no seed documents
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// List documents in insertion order.
    ///
    /// With an agent filter only documents visible to that agent are
    /// returned.
    pub fn list(&self, agent_filter: Option<&str>) -> Vec<Document> {
        let docs = self.documents.read();
        match agent_filter {
            None => docs.clone(),
            Some(agent_id) => docs
                .iter()
                .filter(|d| d.is_visible_to(agent_id))
                .cloned()
                .collect(),
        }
    }

    /// Look up a document by id
    pub fn get(&self, id: &str) -> Option<Document> {
        self.documents.read().iter().find(|d| d.id == id).cloned()
    }

    /// Add a document and return it with its assigned id.
    ///
    /// The embedding is left unset; a missing timestamp is filled with the
    /// current time.
    pub fn add(&self, content: impl Into<String>, mut metadata: DocumentMetadata) -> Result<Document> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(Error::invalid_document("content must not be empty"));
        }
        if metadata.timestamp.is_none() {
            metadata.timestamp = Some(Utc::now());
        }

        let doc = Document::new(uuid::Uuid::new_v4().to_string(), content, metadata);
        self.documents.write().push(doc.clone());

        tracing::debug!(id = %doc.id, "Added document");
        Ok(doc)
    }

    /// Remove a document. Removing an unknown id is a no-op.
    ///
    /// Returns whether a document was removed.
    pub fn remove(&self, id: &str) -> bool {
        let mut docs = self.documents.write();
        let before = docs.len();
        docs.retain(|d| d.id != id);
        before != docs.len()
    }

    /// Discard every document and restore the seed corpus
    pub fn clear(&self) {
        *self.documents.write() = self.seed.clone();
    }

    /// Record a computed embedding on a stored document.
    ///
    /// Returns false when the document is no longer in the store.
    pub fn set_embedding(&self, id: &str, embedding: Vec<f32>) -> bool {
        let mut docs = self.documents.write();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(doc) => {
                doc.embedding = embedding;
                true
            }
            None => false,
        }
    }

    /// Whether a document with this id is live
    pub fn contains(&self, id: &str) -> bool {
        self.documents.read().iter().any(|d| d.id == id)
    }

    /// Number of live documents
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Whether the store holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::with_default_seed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::document::GENERAL_CATEGORY;

    fn seeded() -> DocumentStore {
        DocumentStore::new(vec![
            Document::new("s1", "seed one", DocumentMetadata::titled("One").with_agent("x")),
            Document::new("s2", "seed two", DocumentMetadata::titled("Two").with_agent("y")),
        ])
    }

    #[test]
    fn test_agent_scoped_listing() {
        let store = seeded();

        let ids = |docs: Vec<Document>| docs.into_iter().map(|d| d.id).collect::<Vec<_>>();
        assert_eq!(ids(store.list(Some("x"))), vec!["s1"]);
        assert_eq!(ids(store.list(Some("y"))), vec!["s2"]);
        assert_eq!(ids(store.list(None)), vec!["s1", "s2"]);
    }

    #[test]
    fn test_general_category_visible_to_all() {
        let store = seeded();
        store
            .add(
                "shared",
                DocumentMetadata::default()
                    .with_agent("x")
                    .with_category(GENERAL_CATEGORY),
            )
            .expect("add");

        assert_eq!(store.list(Some("y")).len(), 2);
    }

    #[test]
    fn test_add_appends_in_order_with_unique_ids() {
        let store = seeded();
        let a = store.add("first", DocumentMetadata::default()).expect("add");
        let b = store.add("second", DocumentMetadata::default()).expect("add");

        assert_ne!(a.id, b.id);
        assert!(!a.has_embedding());
        assert!(a.metadata.timestamp.is_some());

        let ids: Vec<_> = store.list(None).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["s1".to_string(), "s2".to_string(), a.id, b.id]);
    }

    #[test]
    fn test_add_rejects_blank_content() {
        let store = seeded();
        let err = store.add("  ", DocumentMetadata::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidDocument(_)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = seeded();
        assert!(store.remove("s1"));
        assert!(!store.remove("s1"));
        assert!(!store.remove("missing"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_restores_seed() {
        let store = seeded();
        store.add("extra", DocumentMetadata::default()).expect("add");
        store.remove("s2");
        store.set_embedding("s1", vec![1.0]);

        store.clear();

        let docs = store.list(None);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].id, "s2");
        assert!(!docs[0].has_embedding());
    }

    #[test]
    fn test_set_embedding() {
        let store = seeded();
        assert!(store.set_embedding("s1", vec![0.5, 0.5]));
        assert!(!store.set_embedding("nope", vec![1.0]));
        assert_eq!(store.get("s1").map(|d| d.embedding), Some(vec![0.5, 0.5]));
    }

    #[test]
    fn test_default_seed_is_populated() {
        let store = DocumentStore::with_default_seed();
        assert!(!store.is_empty());
        assert!(store.list(None).iter().all(|d| !d.content.trim().is_empty()));
    }
}
