use super::{post_json, RecommendationProvider};
use crate::config::Config;
use crate::model::{SimilarityRequest, SimilarityResponse, SourceResponse};
use crate::{Result, Source};
use async_trait::async_trait;
use surf::{Client, Url};

/// Embedding similarity search over the movie catalogue.
pub struct SimilarityProvider {
    http: Client,
    endpoint: Url,
    top_n: usize,
}

impl SimilarityProvider {
    pub fn new(http: Client, config: &Config) -> Result<Self> {
        Ok(Self {
            http,
            endpoint: config.endpoint(Source::Similarity.endpoint_path())?,
            top_n: *config.top_n(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RecommendationProvider for SimilarityProvider {
    fn source(&self) -> Source {
        Source::Similarity
    }

    async fn fetch(&self, query: &str) -> Result<SourceResponse> {
        let body = SimilarityRequest {
            prompt: query,
            top_n: self.top_n,
        };
        let response: SimilarityResponse =
            post_json(&self.http, &self.endpoint, Source::Similarity, &body).await?;
        log::debug!(
            "Similarity search returned {} recommendations for {:?}",
            response.recommendations.len(),
            query
        );
        Ok(SourceResponse::Similarity(response))
    }
}
