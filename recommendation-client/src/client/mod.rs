pub mod llm;
pub mod similarity;

use crate::model::SourceResponse;
use crate::{Error, Result, Source};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use surf::{Client, Url};

/// One recommendation backend. Implementations do not retry.
#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    fn source(&self) -> Source;

    async fn fetch(&self, query: &str) -> Result<SourceResponse>;
}

/// POST `body` as JSON to `url` and decode the response as `R`.
///
/// Network failures and non-2xx statuses become [`Error::Transport`], bodies
/// that do not match `R` become [`Error::Decode`].
pub(crate) async fn post_json<B, R>(http: &Client, url: &Url, source: Source, body: &B) -> Result<R>
where
    B: Serialize + Sync,
    R: DeserializeOwned,
{
    let request = http
        .post(url)
        .body_json(body)
        .map_err(|err| Error::transport(source, err))?;

    let mut response = request.await.map_err(|err| Error::transport(source, err))?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::transport(source, format!("unexpected status {}", status)));
    }

    let body = response
        .body_string()
        .await
        .map_err(|err| Error::transport(source, err))?;
    decode(source, &body)
}

pub(crate) fn decode<R: DeserializeOwned>(source: Source, body: &str) -> Result<R> {
    serde_json::from_str(body).map_err(|err| Error::decode(source, err))
}
