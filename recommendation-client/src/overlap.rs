use crate::model::RecommendationItem;
use crate::title::normalize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[cfg(feature = "graphql")]
use async_graphql::SimpleObject;

/// Recommendations both sources agreed on.
///
/// `titles` are the similarity source's titles, in the order that source
/// returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(SimpleObject))]
pub struct OverlapResult {
    pub count: usize,
    pub titles: Vec<String>,
}

impl OverlapResult {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn normalized_titles(&self) -> Vec<String> {
        self.titles.iter().map(|title| normalize(title)).collect()
    }
}

/// Similarity items whose normalized title also appears among the LLM items.
///
/// Duplicates in the similarity list are kept. Returns an empty result
/// unless both sides are present.
pub fn compute_overlap(
    llm_items: Option<&[RecommendationItem]>,
    similarity_items: Option<&[RecommendationItem]>,
) -> OverlapResult {
    let (Some(llm_items), Some(similarity_items)) = (llm_items, similarity_items) else {
        return OverlapResult::default();
    };

    let llm_titles: HashSet<String> = llm_items.iter().map(|item| normalize(&item.title)).collect();

    let titles: Vec<String> = similarity_items
        .iter()
        .filter(|item| llm_titles.contains(&normalize(&item.title)))
        .map(|item| item.title.clone())
        .collect();

    OverlapResult {
        count: titles.len(),
        titles,
    }
}
