use crate::cache::EntryState;
use crate::model::SourceResponse;
use crate::overlap::{compute_overlap, OverlapResult};
use std::sync::Arc;

pub const LOADING_MESSAGE: &str = "loading recommendations";
pub const ERROR_MESSAGE: &str = "error fetching recommendations";

/// Everything the presentation layer needs for the current submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateView {
    pub revision: u64,
    pub query: Option<String>,
    pub is_loading: bool,
    /// Set when either source failed. Which one failed is not reported.
    pub has_error: bool,
    pub llm_data: Option<Arc<SourceResponse>>,
    pub similarity_data: Option<Arc<SourceResponse>>,
    pub overlap: OverlapResult,
}

impl AggregateView {
    /// User facing status line; loading wins over error.
    pub fn status_message(&self) -> Option<&'static str> {
        if self.is_loading {
            Some(LOADING_MESSAGE)
        } else if self.has_error {
            Some(ERROR_MESSAGE)
        } else {
            None
        }
    }
}

/// Combine the current revision's two entries into a single view.
///
/// A missing entry means nothing was requested yet and counts as neither
/// loading nor failed.
pub fn aggregate(
    revision: u64,
    query: Option<&str>,
    llm: Option<&EntryState<SourceResponse>>,
    similarity: Option<&EntryState<SourceResponse>>,
) -> AggregateView {
    let entries = [llm, similarity];
    let is_loading = entries
        .iter()
        .any(|entry| matches!(entry, Some(EntryState::Pending)));
    let has_error = entries
        .iter()
        .any(|entry| matches!(entry, Some(EntryState::Failed(_))));

    let llm_data = resolved(llm);
    let similarity_data = resolved(similarity);

    let overlap = match (&llm_data, &similarity_data) {
        (Some(llm), Some(similarity)) => {
            let llm_items = llm.items();
            let similarity_items = similarity.items();
            compute_overlap(Some(llm_items.as_slice()), Some(similarity_items.as_slice()))
        }
        _ => OverlapResult::default(),
    };

    AggregateView {
        revision,
        query: query.map(String::from),
        is_loading,
        has_error,
        llm_data,
        similarity_data,
        overlap,
    }
}

fn resolved(entry: Option<&EntryState<SourceResponse>>) -> Option<Arc<SourceResponse>> {
    match entry {
        Some(EntryState::Resolved(data)) => Some(data.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LlmRecommendation, LlmResponse, SimilarityRecommendation, SimilarityResponse};
    use crate::{Error, Source};

    fn llm(titles: &[&str]) -> EntryState<SourceResponse> {
        EntryState::Resolved(Arc::new(SourceResponse::Llm(LlmResponse {
            user_input: "q".to_string(),
            raw_recommendations: serde_json::Value::Null,
            parsed_recommendations: titles
                .iter()
                .map(|title| LlmRecommendation {
                    title: title.to_string(),
                    genres: vec![],
                    tags: vec![],
                })
                .collect(),
            candidates: vec![],
        })))
    }

    fn similarity(titles: &[&str]) -> EntryState<SourceResponse> {
        EntryState::Resolved(Arc::new(SourceResponse::Similarity(SimilarityResponse {
            query: "q".to_string(),
            recommendations: titles
                .iter()
                .enumerate()
                .map(|(i, title)| SimilarityRecommendation {
                    movie_id: i as u64,
                    title: title.to_string(),
                    genres: vec![],
                    tags: vec![],
                    similarity_score: 0.5,
                })
                .collect(),
        })))
    }

    fn failed(source: Source) -> EntryState<SourceResponse> {
        EntryState::Failed(Error::transport(source, "503 Service Unavailable"))
    }

    #[test]
    fn test_nothing_submitted() {
        let view = aggregate(0, None, None, None);
        assert!(!view.is_loading);
        assert!(!view.has_error);
        assert_eq!(view.status_message(), None);
    }

    #[test]
    fn test_both_resolved_computes_overlap() {
        let view = aggregate(
            1,
            Some("horror comedy"),
            Some(&llm(&["Scream (1996)", "Shaun of the Dead (2004)"])),
            Some(&similarity(&["scream (1996)", "Zombieland (2009)"])),
        );
        assert!(!view.is_loading);
        assert!(!view.has_error);
        assert_eq!(view.overlap.count, 1);
        assert_eq!(view.overlap.titles, vec!["scream (1996)"]);
        assert_eq!(view.query.as_deref(), Some("horror comedy"));
    }

    #[test]
    fn test_one_pending_skips_overlap() {
        let view = aggregate(1, Some("q"), Some(&llm(&["A"])), Some(&EntryState::Pending));
        assert!(view.is_loading);
        assert!(view.llm_data.is_some());
        assert!(view.similarity_data.is_none());
        assert!(view.overlap.is_empty());
        assert_eq!(view.status_message(), Some(LOADING_MESSAGE));
    }

    #[test]
    fn test_both_failed() {
        let view = aggregate(
            1,
            Some("q"),
            Some(&failed(Source::Llm)),
            Some(&failed(Source::Similarity)),
        );
        assert!(!view.is_loading);
        assert!(view.has_error);
        assert_eq!(view.overlap, OverlapResult::default());
        assert_eq!(view.status_message(), Some(ERROR_MESSAGE));
    }

    #[test]
    fn test_one_failure_still_surfaces_other_source() {
        let view = aggregate(1, Some("q"), Some(&failed(Source::Llm)), Some(&similarity(&["A"])));
        assert!(view.has_error);
        assert!(view.similarity_data.is_some());
        assert!(view.overlap.is_empty());
    }

    #[test]
    fn test_loading_and_error_tracked_independently() {
        let view = aggregate(1, Some("q"), Some(&failed(Source::Llm)), Some(&EntryState::Pending));
        assert!(view.is_loading);
        assert!(view.has_error);
        assert_eq!(view.status_message(), Some(LOADING_MESSAGE));
    }
}
