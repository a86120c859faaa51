use crate::Source;
use serde::{Deserialize, Deserializer, Serialize};

#[cfg(feature = "graphql")]
use async_graphql::SimpleObject;

/// A single recommendation in the shape shared by both sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(SimpleObject))]
pub struct RecommendationItem {
    pub title: String,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    /// Rating for LLM candidates, similarity for the similarity source.
    pub score: Option<f64>,
}

impl RecommendationItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            genres: vec![],
            tags: vec![],
            score: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LlmRequest<'a> {
    pub user_input: &'a str,
    pub top_n: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarityRequest<'a> {
    pub prompt: &'a str,
    pub top_n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRecommendation {
    pub title: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmCandidate {
    pub title: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub user_input: String,
    #[serde(default)]
    pub raw_recommendations: serde_json::Value,
    pub parsed_recommendations: Vec<LlmRecommendation>,
    #[serde(default)]
    pub candidates: Vec<LlmCandidate>,
}

impl LlmResponse {
    pub fn items(&self) -> Vec<RecommendationItem> {
        self.parsed_recommendations
            .iter()
            .map(|rec| RecommendationItem {
                title: rec.title.clone(),
                genres: rec.genres.clone(),
                tags: rec.tags.clone(),
                score: None,
            })
            .collect()
    }

    pub fn candidate_items(&self) -> Vec<RecommendationItem> {
        self.candidates
            .iter()
            .map(|candidate| RecommendationItem {
                title: candidate.title.clone(),
                genres: candidate.genres.clone(),
                tags: candidate.tags.clone(),
                score: candidate.rating,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRecommendation {
    #[serde(rename = "movieId")]
    pub movie_id: u64,
    pub title: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub tags: Vec<String>,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResponse {
    pub query: String,
    pub recommendations: Vec<SimilarityRecommendation>,
}

impl SimilarityResponse {
    pub fn items(&self) -> Vec<RecommendationItem> {
        self.recommendations
            .iter()
            .map(|rec| RecommendationItem {
                title: rec.title.clone(),
                genres: rec.genres.clone(),
                tags: rec.tags.clone(),
                score: Some(rec.similarity_score),
            })
            .collect()
    }
}

/// Decoded body of either backend, as stored in the request cache.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceResponse {
    Llm(LlmResponse),
    Similarity(SimilarityResponse),
}

impl SourceResponse {
    pub fn source(&self) -> Source {
        match self {
            SourceResponse::Llm(_) => Source::Llm,
            SourceResponse::Similarity(_) => Source::Similarity,
        }
    }

    /// The primary recommendation list of the response.
    pub fn items(&self) -> Vec<RecommendationItem> {
        match self {
            SourceResponse::Llm(res) => res.items(),
            SourceResponse::Similarity(res) => res.items(),
        }
    }

    /// The query text as echoed back by the backend.
    pub fn query(&self) -> &str {
        match self {
            SourceResponse::Llm(res) => &res.user_input,
            SourceResponse::Similarity(res) => &res.query,
        }
    }
}

/// Accepts `["Action", "Comedy"]`, the MovieLens style `"Action|Comedy"`, or null.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<Repr>::deserialize(deserializer)? {
        Some(Repr::List(list)) => list,
        Some(Repr::Joined(joined)) => joined
            .split('|')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect(),
        None => vec![],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_llm_response_decoding() {
        let body = json!({
            "user_input": "horror comedy",
            "raw_recommendations": "1. Scream (1996)\n2. Shaun of the Dead (2004)",
            "parsed_recommendations": [
                {"title": "Scream (1996)", "genres": ["Horror"], "tags": ["slasher"]},
                {"title": "Shaun of the Dead (2004)", "genres": ["Comedy", "Horror"]}
            ],
            "candidates": [
                {"title": "Scream (1996)", "genres": ["Horror"], "tags": [], "rating": 3.9},
                {"title": "Unrated (2001)", "genres": [], "tags": [], "rating": null}
            ]
        });

        let res: LlmResponse = serde_json::from_value(body).unwrap();
        let items = res.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].tags, vec!["slasher"]);
        assert!(items[1].tags.is_empty());
        assert!(items.iter().all(|item| item.score.is_none()));

        let candidates = res.candidate_items();
        assert_eq!(candidates[0].score, Some(3.9));
        assert_eq!(candidates[1].score, None);
    }

    #[test]
    fn test_similarity_response_decoding() {
        let body = json!({
            "query": "horror comedy",
            "recommendations": [
                {"movieId": 1717, "title": "scream (1996)", "genres": "Horror|Mystery", "similarity_score": 0.91},
                {"movieId": 71535, "title": "Zombieland (2009)", "genres": ["Action", "Comedy"], "similarity_score": 0.84}
            ]
        });

        let res: SimilarityResponse = serde_json::from_value(body).unwrap();
        assert_eq!(res.recommendations[0].movie_id, 1717);
        assert_eq!(res.recommendations[0].genres, vec!["Horror", "Mystery"]);

        let items = SourceResponse::Similarity(res).items();
        assert_eq!(items[1].score, Some(0.84));
        assert_eq!(items[1].genres, vec!["Action", "Comedy"]);
    }

    #[test]
    fn test_missing_required_field_fails() {
        let body = json!({ "query": "x" });
        assert!(serde_json::from_value::<SimilarityResponse>(body).is_err());
    }

    #[test]
    fn test_request_bodies() {
        let llm = serde_json::to_value(LlmRequest { user_input: "space", top_n: 20 }).unwrap();
        assert_eq!(llm, json!({"user_input": "space", "top_n": 20}));

        let sim = serde_json::to_value(SimilarityRequest { prompt: "space", top_n: 20 }).unwrap();
        assert_eq!(sim, json!({"prompt": "space", "top_n": 20}));
    }
}
