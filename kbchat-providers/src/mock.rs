//! Mock providers for testing and offline demos

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{ChatRequest, Embeddings, Error, Provider, Result};
use kbchat_core::message::validate_messages;

/// A mock chat provider that returns a fixed reply and records every request
pub struct MockProvider {
    response: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with predefined response
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        validate_messages(&request.messages)?;
        self.requests.lock().push(request);
        Ok(self.response.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Deterministic bag-of-words embeddings.
///
/// Each lowercase alphanumeric token is hashed into one of `dimensions`
/// buckets. Texts sharing vocabulary get a high cosine similarity, which is
/// enough to exercise ranking without a network.
#[derive(Debug, Clone)]
pub struct MockEmbeddings {
    dimensions: usize,
}

impl MockEmbeddings {
    /// Default vector size
    pub const DEFAULT_DIMENSIONS: usize = 64;

    /// Create with a vector size (at least 1)
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Vector size
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn bucket(&self, token: &str) -> usize {
        // FNV-1a
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in token.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        (hash % self.dimensions as u64) as usize
    }
}

impl Default for MockEmbeddings {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSIONS)
    }
}

#[async_trait]
impl Embeddings for MockEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0_f32; self.dimensions];
        let mut tokens = 0usize;
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            vector[self.bucket(&token.to_lowercase())] += 1.0;
            tokens += 1;
        }

        if tokens == 0 {
            return Err(Error::embedding("text has no tokens to embed"));
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;
    use kbchat_core::rag::cosine_similarity;

    #[tokio::test]
    async fn test_mock_provider_records_requests() {
        let provider = MockProvider::new("Hello, world!");
        let reply = provider
            .complete(ChatRequest::new(vec![Message::user("Hi")]))
            .await
            .expect("should succeed");

        assert_eq!(reply, "Hello, world!");
        assert_eq!(provider.requests().len(), 1);
        assert_eq!(provider.name(), "mock");
    }

    #[tokio::test]
    async fn test_mock_provider_validates() {
        let provider = MockProvider::new("unused");
        let err = provider.complete(ChatRequest::new(vec![])).await.unwrap_err();
        assert!(matches!(err, Error::InvalidMessage(_)));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_mock_embeddings_are_deterministic() {
        let embedder = MockEmbeddings::default();
        let a = embedder.embed("Pricing and payment plans").await.expect("embed");
        let b = embedder.embed("pricing AND payment plans!").await.expect("embed");
        assert_eq!(a.len(), MockEmbeddings::DEFAULT_DIMENSIONS);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_mock_embeddings_similarity() {
        let embedder = MockEmbeddings::new(256);
        let query = embedder.embed("what is the price").await.expect("embed");
        let close = embedder.embed("the price is 497").await.expect("embed");
        let far = embedder.embed("support hours monday").await.expect("embed");
        assert!(cosine_similarity(&query, &close) > cosine_similarity(&query, &far));
    }

    #[tokio::test]
    async fn test_mock_embeddings_reject_empty_text() {
        let embedder = MockEmbeddings::new(0);
        assert_eq!(embedder.dimensions(), 1);
        assert!(embedder.embed(" ... ").await.is_err());
    }
}
