//! Observability for retrieval
//!
//! Every search outcome is reported as a [`RagEvent`] to the registered
//! observers. Observer failures are logged and never affect retrieval.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::Result;

/// Outcome of one knowledge-base search
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum RagEvent {
    /// At least one document cleared the threshold
    #[serde(rename = "rag.search.success", rename_all = "camelCase")]
    SearchSuccess {
        /// The query text
        query: String,
        /// Number of documents returned
        documents_count: usize,
        /// Titles (or ids) of the returned documents, in rank order
        documents_titles: Vec<String>,
        /// Wall time of the search
        execution_time_ms: u64,
    },
    /// No document cleared the threshold
    #[serde(rename = "rag.search.empty", rename_all = "camelCase")]
    SearchEmpty {
        /// The query text
        query: String,
        /// Wall time of the search
        execution_time_ms: u64,
    },
    /// The query could not be embedded
    #[serde(rename = "rag.search.error", rename_all = "camelCase")]
    SearchError {
        /// The query text
        query: String,
        /// Wall time until the failure
        execution_time_ms: u64,
        /// Provider error message
        error: String,
    },
}

impl RagEvent {
    /// Event kind, e.g. `rag.search.success`
    pub fn kind(&self) -> &'static str {
        match self {
            RagEvent::SearchSuccess { .. } => "rag.search.success",
            RagEvent::SearchEmpty { .. } => "rag.search.empty",
            RagEvent::SearchError { .. } => "rag.search.error",
        }
    }

    /// The query this event reports on
    pub fn query(&self) -> &str {
        match self {
            RagEvent::SearchSuccess { query, .. }
            | RagEvent::SearchEmpty { query, .. }
            | RagEvent::SearchError { query, .. } => query,
        }
    }
}

/// Trait for observing retrieval events
#[async_trait]
pub trait RagObserver: Send + Sync {
    /// Handle a retrieval event
    async fn on_event(&self, event: &RagEvent) -> Result<()>;
}

/// Writes events to `tracing`: success at info, empty at warn, error at error
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

#[async_trait]
impl RagObserver for TracingObserver {
    async fn on_event(&self, event: &RagEvent) -> Result<()> {
        match event {
            RagEvent::SearchSuccess {
                query,
                documents_count,
                documents_titles,
                execution_time_ms,
            } => tracing::info!(
                event = event.kind(),
                query = %query,
                documents_count,
                documents_titles = ?documents_titles,
                execution_time_ms,
                "RAG search completed"
            ),
            RagEvent::SearchEmpty {
                query,
                execution_time_ms,
            } => tracing::warn!(
                event = event.kind(),
                query = %query,
                execution_time_ms,
                "RAG search found no context"
            ),
            RagEvent::SearchError {
                query,
                execution_time_ms,
                error,
            } => tracing::error!(
                event = event.kind(),
                query = %query,
                execution_time_ms,
                error = %error,
                "RAG search failed"
            ),
        }
        Ok(())
    }
}

/// Republishes events on a broadcast channel
pub struct BroadcastObserver {
    sender: broadcast::Sender<RagEvent>,
}

impl BroadcastObserver {
    /// Create with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<RagEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastObserver {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl RagObserver for BroadcastObserver {
    async fn on_event(&self, event: &RagEvent) -> Result<()> {
        if let Err(e) = self.sender.send(event.clone()) {
            tracing::debug!("Failed to broadcast RAG event (no receivers): {}", e);
        }
        Ok(())
    }
}

/// Forwards events to every registered observer
#[derive(Default, Clone)]
pub struct EventDispatcher {
    observers: Vec<Arc<dyn RagObserver>>,
}

impl EventDispatcher {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer
    pub fn add_observer(&mut self, observer: Arc<dyn RagObserver>) {
        self.observers.push(observer);
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observer is registered
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver an event to all observers, in registration order
    pub async fn dispatch(&self, event: &RagEvent) {
        for observer in &self.observers {
            if let Err(e) = observer.on_event(event).await {
                tracing::error!("Observer failed to handle RAG event: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use parking_lot::Mutex;

    struct Failing;

    #[async_trait]
    impl RagObserver for Failing {
        async fn on_event(&self, _event: &RagEvent) -> Result<()> {
            Err(Error::Internal("sink offline".into()))
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    #[async_trait]
    impl RagObserver for Recording {
        async fn on_event(&self, event: &RagEvent) -> Result<()> {
            self.0.lock().push(event.kind().to_string());
            Ok(())
        }
    }

    #[test]
    fn test_event_serialization() {
        let event = RagEvent::SearchSuccess {
            query: "price".into(),
            documents_count: 1,
            documents_titles: vec!["Pricing".into()],
            execution_time_ms: 12,
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["event"], "rag.search.success");
        assert_eq!(json["documentsCount"], 1);
        assert_eq!(json["documentsTitles"][0], "Pricing");
        assert_eq!(json["executionTimeMs"], 12);
    }

    #[tokio::test]
    async fn test_failing_observer_does_not_block_others() {
        let recording = Arc::new(Recording::default());
        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_observer(Arc::new(Failing));
        dispatcher.add_observer(recording.clone());

        dispatcher
            .dispatch(&RagEvent::SearchEmpty {
                query: "q".into(),
                execution_time_ms: 1,
            })
            .await;

        assert_eq!(*recording.0.lock(), vec!["rag.search.empty".to_string()]);
    }

    #[tokio::test]
    async fn test_broadcast_observer() {
        let observer = BroadcastObserver::new(8);
        let mut rx = observer.subscribe();

        let event = RagEvent::SearchError {
            query: "q".into(),
            execution_time_ms: 3,
            error: "Provider authentication error: missing key".into(),
        };
        observer.on_event(&event).await.expect("send");

        assert_eq!(rx.recv().await.expect("recv"), event);
    }
}
