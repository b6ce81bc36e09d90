use async_trait::async_trait;
use kbchat_core::prelude::*;
use kbchat_core::rag::Document;
use parking_lot::Mutex;
use std::sync::Arc;

struct RecordingProvider {
    reply: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl RecordingProvider {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        kbchat_core::message::validate_messages(&request.messages)?;
        self.requests.lock().push(request);
        Ok(self.reply.clone())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Embeds "price" questions and documents onto the same axis
struct KeywordEmbedder;

#[async_trait]
impl Embeddings for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains("down") {
            return Err(Error::ProviderAuth("OPENAI_API_KEY not set".into()));
        }
        let price = if text.to_lowercase().contains("price") { 1.0 } else { 0.0 };
        Ok(vec![price, 1.0 - price])
    }
}

fn retrieval() -> Arc<RetrievalService> {
    let store = DocumentStore::new(vec![
        Document::new(
            "pricing",
            "The price is 497.",
            DocumentMetadata::titled("Pricing").with_agent("sales"),
        ),
        Document::new(
            "hours",
            "Open 9 to 6.",
            DocumentMetadata::titled("Hours").with_agent("brand"),
        ),
    ]);
    Arc::new(
        RetrievalService::builder(Arc::new(KeywordEmbedder))
            .store(Arc::new(store))
            .build()
            .expect("build"),
    )
}

fn sales_agent() -> AgentProfile {
    find_agent("sales").expect("sales agent")
}

#[tokio::test]
async fn test_reply_includes_scoped_context() {
    let provider = Arc::new(RecordingProvider::new("It costs 497."));
    let responder = ChatResponder::new(provider.clone(), retrieval()).with_model("gpt-4o-mini");

    let reply = responder
        .respond(&sales_agent(), "  What is the price?  ")
        .await
        .expect("reply");
    assert_eq!(reply, "It costs 497.");

    let requests = provider.requests.lock();
    let request = &requests[0];
    assert_eq!(request.model.as_deref(), Some("gpt-4o-mini"));
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, Role::System);
    assert!(request.messages[0]
        .content
        .contains("Additional context from the knowledge base:\nTitle: Pricing\nContent: The price is 497."));
    assert_eq!(request.messages[1], Message::user("What is the price?"));
}

#[tokio::test]
async fn test_reply_without_context_uses_bare_prompt() {
    let provider = Arc::new(RecordingProvider::new("Hello!"));
    let responder = ChatResponder::new(provider.clone(), retrieval());
    let agent = sales_agent();

    responder.respond(&agent, "hello there").await.expect("reply");

    let requests = provider.requests.lock();
    assert_eq!(requests[0].messages[0].content, agent.system_prompt.trim());
}

#[tokio::test]
async fn test_retrieval_failure_does_not_block_turn() {
    let provider = Arc::new(RecordingProvider::new("Still here."));
    let responder = ChatResponder::new(provider.clone(), retrieval());

    let reply = responder
        .respond(&sales_agent(), "is the price service down?")
        .await
        .expect("reply");
    assert_eq!(reply, "Still here.");
    assert_eq!(provider.requests.lock().len(), 1);
}

#[tokio::test]
async fn test_blank_user_message_is_rejected() {
    let provider = Arc::new(RecordingProvider::new("unused"));
    let responder = ChatResponder::new(provider.clone(), retrieval());

    let err = responder.respond(&sales_agent(), " \t ").await.unwrap_err();
    assert!(matches!(err, Error::InvalidMessage(_)));
    assert!(provider.requests.lock().is_empty());
}
