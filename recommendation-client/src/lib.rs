pub mod aggregate;
pub mod cache;
pub mod client;
pub mod config;
mod error;
pub mod model;
pub mod overlap;
pub mod session;
mod source;
pub mod title;


use std::sync::Arc;

pub use aggregate::{AggregateView, ERROR_MESSAGE, LOADING_MESSAGE};
pub use cache::{
    CacheConfig, CacheEntry, CacheKey, CacheStats, EntryState, EntryStatus, EntryWatch, Ensured,
    RequestCache, SharedRequestCache,
};
pub use client::llm::LlmProvider;
pub use client::similarity::SimilarityProvider;
pub use client::RecommendationProvider;
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use model::{RecommendationItem, SourceResponse};
pub use overlap::{compute_overlap, OverlapResult};
pub use session::{ComparisonSession, Event, SearchRequest, SearchState};
pub use source::Source;
pub use title::normalize;

/// Cache of decoded backend responses, keyed per source and submission
pub type ResponseCache = RequestCache<CacheKey, SourceResponse>;
pub type SharedResponseCache = Arc<ResponseCache>;
