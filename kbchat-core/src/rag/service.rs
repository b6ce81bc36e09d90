//! Retrieval orchestration
//!
//! Resolves embeddings through the cache and the embedding provider, ranks
//! the visible documents and assembles the prompt context. Provider errors
//! never escape this module: a failed query embedding yields no context and
//! a failed document embedding drops that document only.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use parking_lot::RwLock;
use tokio::sync::OnceCell;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::rag::cache::{EmbeddingCache, InMemoryEmbeddingCache};
use crate::rag::config::{RetrievalConfig, RetrievalConfigUpdate};
use crate::rag::context::ContextBuilder;
use crate::rag::corpus::StaticCorpus;
use crate::rag::document::{Document, RankedResult};
use crate::rag::events::{EventDispatcher, RagEvent, RagObserver};
use crate::rag::ranker;
use crate::rag::store::DocumentStore;
use crate::rag::Embeddings;

type InFlight = Arc<OnceCell<Vec<f32>>>;

/// Knowledge-base retrieval over a shared store and embedding cache
pub struct RetrievalService {
    embedder: Arc<dyn Embeddings>,
    store: Arc<DocumentStore>,
    cache: Arc<dyn EmbeddingCache>,
    corpus: Option<Arc<StaticCorpus>>,
    events: EventDispatcher,
    config: RwLock<RetrievalConfig>,
    in_flight: DashMap<String, InFlight>,
}

impl RetrievalService {
    /// Create a service builder around an embedding provider
    pub fn builder(embedder: Arc<dyn Embeddings>) -> RetrievalServiceBuilder {
        RetrievalServiceBuilder::new(embedder)
    }

    /// Current configuration
    pub fn config(&self) -> RetrievalConfig {
        self.config.read().clone()
    }

    /// Merge a partial update into the configuration.
    ///
    /// Invalid updates are rejected and leave the configuration unchanged.
    pub fn update_config(&self, update: RetrievalConfigUpdate) -> Result<RetrievalConfig> {
        let mut config = self.config.write();
        let next = config.merged(&update)?;
        *config = next.clone();
        tracing::debug!(config = ?next, "Retrieval config updated");
        Ok(next)
    }

    /// The shared document store
    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// The shared embedding cache
    pub fn cache(&self) -> &Arc<dyn EmbeddingCache> {
        &self.cache
    }

    /// The static corpus, if one was supplied
    pub fn corpus(&self) -> Option<&Arc<StaticCorpus>> {
        self.corpus.as_ref()
    }

    /// Context for a query over every document, or `None` when retrieval
    /// is disabled, fails, or finds nothing relevant
    pub async fn get_relevant_context(&self, query: &str) -> Option<String> {
        self.relevant_context(query, None).await
    }

    /// Like [`get_relevant_context`](Self::get_relevant_context), restricted
    /// to documents visible to `agent_id`
    pub async fn get_relevant_context_for(&self, query: &str, agent_id: &str) -> Option<String> {
        self.relevant_context(query, Some(agent_id)).await
    }

    /// Assembles context and reports the search.
    ///
    /// The success event names only the documents that made it into the
    /// context. When not even the first ranked block fits the window the
    /// outcome is reported as empty and `None` is returned.
    async fn relevant_context(&self, query: &str, scope: Option<&str>) -> Option<String> {
        let config = self.config();
        if !config.enabled {
            return None;
        }

        let started = Instant::now();
        let outcome = self.ranked(query, scope, &config).await.map(|mut results| {
            let (context, included) =
                ContextBuilder::new(config.context_window_chars).build_counted(&results);
            if included < results.len() {
                tracing::debug!(
                    ranked = results.len(),
                    included,
                    "Context window truncated ranked results"
                );
            }
            results.truncate(included);
            (context, results)
        });

        self.report(query, started, outcome.as_ref().map(|(_, results)| results.as_slice()))
            .await;

        match outcome {
            Ok((context, results)) if !results.is_empty() => Some(context),
            _ => None,
        }
    }

    /// Rank the knowledge base against a query and report the outcome.
    ///
    /// Never fails: provider errors produce an empty result and a
    /// `rag.search.error` event.
    pub async fn search(&self, query: &str, scope: Option<&str>) -> Vec<RankedResult> {
        let started = Instant::now();
        let config = self.config();

        let outcome = self.ranked(query, scope, &config).await;
        self.report(query, started, outcome.as_ref().map(Vec::as_slice))
            .await;

        outcome.unwrap_or_default()
    }

    #[instrument(skip(self, scope, config), fields(scope = scope.unwrap_or("*")))]
    async fn ranked(
        &self,
        query: &str,
        scope: Option<&str>,
        config: &RetrievalConfig,
    ) -> Result<Vec<RankedResult>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let candidates = self
            .resolve_candidates(scope, config.max_concurrent_embeddings)
            .await;

        Ok(ranker::rank(
            &query_embedding,
            candidates,
            config.similarity_threshold,
            config.max_results,
        ))
    }

    async fn report(
        &self,
        query: &str,
        started: Instant,
        outcome: std::result::Result<&[RankedResult], &Error>,
    ) {
        let execution_time_ms = elapsed_ms(started);
        let event = match outcome {
            Err(e) => RagEvent::SearchError {
                query: query.to_string(),
                execution_time_ms,
                error: e.to_string(),
            },
            Ok([]) => RagEvent::SearchEmpty {
                query: query.to_string(),
                execution_time_ms,
            },
            Ok(results) => RagEvent::SearchSuccess {
                query: query.to_string(),
                documents_count: results.len(),
                documents_titles: results
                    .iter()
                    .map(|r| r.document.display_name().to_string())
                    .collect(),
                execution_time_ms,
            },
        };
        self.events.dispatch(&event).await;
    }

    /// Embedding for a store document: its own vector if set, else the
    /// cached one, else a fresh provider computation that is cached and
    /// written back to the store.
    ///
    /// Concurrent calls for the same uncached id share one provider call.
    pub async fn ensure_embedding(&self, doc: &Document) -> Result<Vec<f32>> {
        self.resolve_embedding(doc, Source::Store).await
    }

    async fn resolve_embedding(&self, doc: &Document, source: Source) -> Result<Vec<f32>> {
        if doc.has_embedding() {
            return Ok(doc.embedding.clone());
        }

        let key = source.cache_key(&doc.id);
        if let Some(embedding) = self.cache.get(&key) {
            tracing::debug!(id = %doc.id, "Embedding cache hit");
            return Ok(embedding);
        }

        let in_flight = InFlightGuard::join(&self.in_flight, key);
        let computed = in_flight
            .cell
            .get_or_try_init(|| async {
                // A racing resolver may have finished between our cache check and now
                if let Some(embedding) = self.cache.get(&in_flight.key) {
                    return Ok(embedding);
                }

                let started = Instant::now();
                let embedding = self.embedder.embed(&doc.content).await?;
                tracing::debug!(
                    id = %doc.id,
                    execution_time_ms = elapsed_ms(started),
                    content_length = doc.content.len(),
                    "Embedding computed"
                );
                self.cache.put(&in_flight.key, embedding.clone());
                Ok::<_, Error>(embedding)
            })
            .await
            .cloned();
        drop(in_flight);

        let embedding = computed?;
        if source == Source::Store {
            self.store.set_embedding(&doc.id, embedding.clone());
        }
        Ok(embedding)
    }

    /// Visible documents paired with their embeddings, in candidate order.
    /// Documents whose embedding cannot be computed are skipped.
    async fn resolve_candidates(
        &self,
        scope: Option<&str>,
        concurrency: usize,
    ) -> Vec<(Document, Vec<f32>)> {
        let mut candidates: Vec<(Document, Source)> = self
            .store
            .list(scope)
            .into_iter()
            .map(|doc| (doc, Source::Store))
            .collect();

        if let Some(corpus) = &self.corpus {
            for doc in corpus.visible_to(scope) {
                // Checked against the whole store, not just this scope's listing
                if self.store.contains(&doc.id) {
                    tracing::debug!(id = %doc.id, "Corpus document shadowed by store document");
                    continue;
                }
                candidates.push((doc.clone(), Source::Corpus));
            }
        }
        candidates.retain(|(d, _)| !d.content.trim().is_empty());

        let resolved: Vec<Option<(Document, Vec<f32>)>> = stream::iter(candidates)
            .map(|(doc, source)| async move {
                match self.resolve_embedding(&doc, source).await {
                    Ok(embedding) => Some((doc, embedding)),
                    Err(e) => {
                        tracing::warn!(
                            id = %doc.id,
                            error = %e,
                            "Document skipped - failed to compute embedding"
                        );
                        None
                    }
                }
            })
            .buffered(concurrency.max(1))
            .collect()
            .await;

        resolved.into_iter().flatten().collect()
    }
}

/// Where a candidate document lives. Store and corpus embeddings are cached
/// under separate keys so one source never serves the other's vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Store,
    Corpus,
}

impl Source {
    fn cache_key(self, id: &str) -> String {
        match self {
            Source::Store => id.to_string(),
            Source::Corpus => format!("corpus:{}", id),
        }
    }
}

/// Membership in the single-flight map for one cache key.
///
/// Dropping the last participant removes the entry, including when the
/// owning search is cancelled mid-computation.
struct InFlightGuard<'a> {
    map: &'a DashMap<String, InFlight>,
    key: String,
    cell: InFlight,
}

impl<'a> InFlightGuard<'a> {
    fn join(map: &'a DashMap<String, InFlight>, key: String) -> Self {
        // Clone the cell out so no map guard is held across an await
        let cell = map
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .value()
            .clone();
        Self { map, key, cell }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        // One reference in the map plus ours: nobody else is waiting
        self.map.remove_if(&self.key, |_, current| {
            Arc::ptr_eq(current, &self.cell) && Arc::strong_count(current) <= 2
        });
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Builder for [`RetrievalService`]
pub struct RetrievalServiceBuilder {
    embedder: Arc<dyn Embeddings>,
    store: Option<Arc<DocumentStore>>,
    cache: Option<Arc<dyn EmbeddingCache>>,
    corpus: Option<Arc<StaticCorpus>>,
    events: EventDispatcher,
    config: RetrievalConfig,
}

impl RetrievalServiceBuilder {
    /// Create a builder with defaults: seeded store, unbounded cache,
    /// no corpus, no observers, default config
    pub fn new(embedder: Arc<dyn Embeddings>) -> Self {
        Self {
            embedder,
            store: None,
            cache: None,
            corpus: None,
            events: EventDispatcher::new(),
            config: RetrievalConfig::default(),
        }
    }

    /// Use a shared document store
    pub fn store(mut self, store: Arc<DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a specific embedding cache
    pub fn cache(mut self, cache: Arc<dyn EmbeddingCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Merge a static corpus into every search
    pub fn corpus(mut self, corpus: Arc<StaticCorpus>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    /// Register an event observer
    pub fn observer(mut self, observer: Arc<dyn RagObserver>) -> Self {
        self.events.add_observer(observer);
        self
    }

    /// Set the initial configuration
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the service, validating the configuration
    pub fn build(self) -> Result<RetrievalService> {
        self.config.validate()?;
        Ok(RetrievalService {
            embedder: self.embedder,
            store: self
                .store
                .unwrap_or_else(|| Arc::new(DocumentStore::with_default_seed())),
            cache: self
                .cache
                .unwrap_or_else(|| Arc::new(InMemoryEmbeddingCache::new())),
            corpus: self.corpus,
            events: self.events,
            config: RwLock::new(self.config),
            in_flight: DashMap::new(),
        })
    }
}
