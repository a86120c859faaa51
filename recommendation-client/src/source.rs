use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// The two independent recommendation backends being compared.
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    #[strum(serialize = "LLM")]
    Llm,
    #[strum(serialize = "Similarity")]
    Similarity,
}

impl Source {
    /// Path of the backend endpoint serving this source, relative to the base URL.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            Source::Llm => "recommend_llm",
            Source::Similarity => "recommend",
        }
    }
}
