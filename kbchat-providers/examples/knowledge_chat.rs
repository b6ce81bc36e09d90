//! Ask each built-in agent a question with knowledge-base context.
//!
//! Uses OpenAI when OPENAI_API_KEY is set, the offline mocks otherwise.
//!
//! Run with: cargo run -p kbchat-providers --example knowledge_chat -- "How much does the program cost?"

use std::sync::Arc;

use kbchat_core::prelude::*;
use kbchat_core::rag::{BroadcastObserver, TracingObserver};
use kbchat_providers::mock::{MockEmbeddings, MockProvider};
use kbchat_providers::openai::OpenAI;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .init();

    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "How much does the program cost?".to_string());

    let (provider, embedder): (Arc<dyn Provider>, Arc<dyn Embeddings>) = match OpenAI::from_env() {
        Ok(openai) => {
            let openai = Arc::new(openai);
            (openai.clone(), openai)
        }
        Err(e) => {
            eprintln!("{e}; falling back to offline mocks.");
            (
                Arc::new(MockProvider::new("(offline reply)")),
                Arc::new(MockEmbeddings::default()),
            )
        }
    };
    println!("Using provider: {}", provider.name());

    let events = Arc::new(BroadcastObserver::default());
    let mut rx = events.subscribe();

    // Mock vectors are coarse, so relax the threshold for the offline path
    let config = if provider.name() == "mock" {
        RetrievalConfig {
            similarity_threshold: 0.2,
            ..RetrievalConfig::default()
        }
    } else {
        RetrievalConfig::default()
    };

    let retrieval = Arc::new(
        RetrievalService::builder(embedder)
            .config(config)
            .observer(Arc::new(TracingObserver))
            .observer(events)
            .build()?,
    );
    let responder = ChatResponder::new(provider, retrieval);

    for agent in default_roster() {
        println!("\n[{}] User: {}", agent.name, question);
        match responder.respond(&agent, &question).await {
            Ok(reply) => println!("[{}] Assistant: {}", agent.name, reply),
            Err(e) => eprintln!("[{}] Error: {}", agent.name, e),
        }
        if let Ok(event) = rx.try_recv() {
            println!("  retrieval: {} ({})", event.kind(), serde_json::to_string(&event)?);
        }
    }

    Ok(())
}
