use super::{post_json, RecommendationProvider};
use crate::config::Config;
use crate::model::{LlmRequest, LlmResponse, SourceResponse};
use crate::{Result, Source};
use async_trait::async_trait;
use surf::{Client, Url};

/// Recommendations generated by the language model backend.
pub struct LlmProvider {
    http: Client,
    endpoint: Url,
    top_n: usize,
}

impl LlmProvider {
    pub fn new(http: Client, config: &Config) -> Result<Self> {
        Ok(Self {
            http,
            endpoint: config.endpoint(Source::Llm.endpoint_path())?,
            top_n: *config.top_n(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RecommendationProvider for LlmProvider {
    fn source(&self) -> Source {
        Source::Llm
    }

    async fn fetch(&self, query: &str) -> Result<SourceResponse> {
        let body = LlmRequest {
            user_input: query,
            top_n: self.top_n,
        };
        let response: LlmResponse = post_json(&self.http, &self.endpoint, Source::Llm, &body).await?;
        log::debug!(
            "LLM returned {} recommendations and {} candidates for {:?}",
            response.parsed_recommendations.len(),
            response.candidates.len(),
            query
        );
        Ok(SourceResponse::Llm(response))
    }
}
