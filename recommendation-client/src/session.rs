use crate::aggregate::{aggregate, AggregateView};
use crate::cache::{CacheConfig, CacheKey, CacheStats, EntryState, EntryWatch, RequestCache};
use crate::client::llm::LlmProvider;
use crate::client::similarity::SimilarityProvider;
use crate::client::RecommendationProvider;
use crate::config::Config;
use crate::model::SourceResponse;
use crate::{Error, Result, SharedResponseCache, Source};
use getset::{CopyGetters, Getters};
use log::{debug, info};
use std::sync::Arc;
use surf::Client;
use tokio::sync::{watch, Mutex};
use utils::surf_logging::SurfLogging;

/// One submission of the search box.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct SearchRequest {
    #[getset(get = "pub")]
    query_text: String,
    #[getset(get_copy = "pub")]
    revision: u64,
}

impl SearchRequest {
    pub fn new(query_text: impl Into<String>, revision: u64) -> Self {
        Self {
            query_text: query_text.into(),
            revision,
        }
    }

    pub fn key(&self, source: Source) -> CacheKey {
        CacheKey::new(source, self.query_text.clone(), self.revision)
    }
}

pub fn next_revision(current: u64) -> u64 {
    current + 1
}

#[derive(Debug, Clone)]
pub enum Event {
    Submit(String),
    FetchSettled {
        key: CacheKey,
        state: EntryState<SourceResponse>,
    },
}

/// What the user currently sees: the latest submission and the state of
/// its two fetches.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    request: Option<SearchRequest>,
    llm: Option<EntryState<SourceResponse>>,
    similarity: Option<EntryState<SourceResponse>>,
}

impl SearchState {
    pub fn request(&self) -> Option<&SearchRequest> {
        self.request.as_ref()
    }

    /// Latest issued revision, 0 before the first submission
    pub fn revision(&self) -> u64 {
        self.request.as_ref().map_or(0, SearchRequest::revision)
    }

    pub fn entry(&self, source: Source) -> Option<&EntryState<SourceResponse>> {
        match source {
            Source::Llm => self.llm.as_ref(),
            Source::Similarity => self.similarity.as_ref(),
        }
    }

    /// Whether a response for `key` may still be shown.
    pub fn is_current(&self, key: &CacheKey) -> bool {
        self.request.as_ref().is_some_and(|request| {
            request.revision == key.revision() && &request.query_text == key.query_text()
        })
    }

    pub fn transition(self, event: Event) -> Self {
        match event {
            Event::Submit(query_text) => {
                if query_text.trim().is_empty() {
                    debug!("Ignoring blank submission");
                    return self;
                }
                let revision = next_revision(self.revision());
                Self {
                    request: Some(SearchRequest::new(query_text, revision)),
                    llm: Some(EntryState::Pending),
                    similarity: Some(EntryState::Pending),
                }
            }
            Event::FetchSettled { key, state } => {
                if !self.is_current(&key) {
                    debug!(
                        "Dropping stale response for {:?}, current revision is {}",
                        key,
                        self.revision()
                    );
                    return self;
                }
                if !state.is_settled() {
                    return self;
                }
                let mut next = self;
                match key.source() {
                    Source::Llm => next.llm = Some(state),
                    Source::Similarity => next.similarity = Some(state),
                }
                next
            }
        }
    }

    pub fn view(&self) -> AggregateView {
        aggregate(
            self.revision(),
            self.request.as_ref().map(|request| request.query_text.as_str()),
            self.llm.as_ref(),
            self.similarity.as_ref(),
        )
    }
}

/// Drives both sources for a sequence of submissions and publishes the
/// aggregate view after every change.
#[derive(Clone)]
pub struct ComparisonSession {
    llm: Arc<dyn RecommendationProvider>,
    similarity: Arc<dyn RecommendationProvider>,
    cache: SharedResponseCache,
    state: Arc<Mutex<SearchState>>,
    views: Arc<watch::Sender<AggregateView>>,
}

impl ComparisonSession {
    /// Session talking to the backends described by `config`
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::new().with(SurfLogging);
        let llm = LlmProvider::new(http.clone(), config)?;
        let similarity = SimilarityProvider::new(http, config)?;

        info!(
            "Comparing recommendations from {} and {}",
            llm.endpoint(),
            similarity.endpoint()
        );

        Ok(Self::with_providers(
            Arc::new(llm),
            Arc::new(similarity),
            config.cache_config(),
        ))
    }

    pub fn with_providers(
        llm: Arc<dyn RecommendationProvider>,
        similarity: Arc<dyn RecommendationProvider>,
        cache_config: CacheConfig,
    ) -> Self {
        let (views, _) = watch::channel(AggregateView::default());
        Self {
            llm,
            similarity,
            cache: Arc::new(RequestCache::new(cache_config)),
            state: Arc::new(Mutex::new(SearchState::default())),
            views: Arc::new(views),
        }
    }

    /// Start a new search. Always fetches both sources again, even when the
    /// text matches the previous submission.
    pub async fn submit(&self, query_text: impl Into<String>) -> Result<SearchRequest> {
        let query_text = query_text.into();
        if query_text.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }

        let request = {
            let mut state = self.state.lock().await;
            *state = std::mem::take(&mut *state).transition(Event::Submit(query_text));
            self.publish(&state);
            state.request().cloned().ok_or(Error::EmptyQuery)?
        };
        info!(
            "Searching {:?} (revision {})",
            request.query_text(),
            request.revision()
        );

        let providers = [(Source::Llm, &self.llm), (Source::Similarity, &self.similarity)];
        for (source, provider) in providers {
            let provider = provider.clone();
            let query = request.query_text().clone();
            // Subscribe before the next ensure can evict this entry
            let entry = self.cache.ensure_watched(request.key(source), move || async move {
                provider.fetch(&query).await
            });

            let session = self.clone();
            tokio::spawn(async move { session.watch_entry(entry).await });
        }

        Ok(request)
    }

    async fn watch_entry(&self, entry: EntryWatch<CacheKey, SourceResponse>) {
        let entry = entry.settled().await;
        self.apply(Event::FetchSettled {
            key: entry.key,
            state: entry.state,
        })
        .await;
    }

    async fn apply(&self, event: Event) {
        let mut state = self.state.lock().await;
        *state = std::mem::take(&mut *state).transition(event);
        self.publish(&state);
    }

    fn publish(&self, state: &SearchState) {
        self.views.send_replace(state.view());
    }

    /// Latest published view
    pub fn view(&self) -> AggregateView {
        self.views.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AggregateView> {
        self.views.subscribe()
    }

    /// Wait until the current submission has finished loading
    pub async fn settled(&self) -> AggregateView {
        let mut views = self.views.subscribe();
        if let Ok(view) = views.wait_for(|view| !view.is_loading).await {
            return view.clone();
        }
        self.view()
    }

    pub async fn state(&self) -> SearchState {
        self.state.lock().await.clone()
    }

    pub fn cache(&self) -> &SharedResponseCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
