use crate::cache::CacheConfig;
use crate::{Error, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use getset::Getters;
use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use std::path::Path;
use surf::Url;

pub const ENV_PREFIX: &str = "RECOMMENDER_";

#[serde_inline_default]
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
#[get = "pub"]
pub struct Config {
    #[serde_inline_default(String::from("http://localhost:8000"))]
    backend_url: String,
    #[serde_inline_default(20)]
    top_n: usize,
    #[serde(default)]
    cache_max_entries: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: String::from("http://localhost:8000"),
            top_n: 20,
            cache_max_entries: None,
        }
    }
}

impl Config {
    /// Load defaults, then the optional YAML file, then `RECOMMENDER_*`
    /// environment variables, later sources overriding earlier ones.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.base_url()?;
        if config.top_n == 0 {
            return Err(Error::Config(String::from("top_n must be at least 1")));
        }
        Ok(config)
    }

    pub fn with_backend_url(mut self, backend_url: impl Into<String>) -> Self {
        self.backend_url = backend_url.into();
        self
    }

    pub fn base_url(&self) -> Result<Url> {
        utils::endpoint::parse_base(&self.backend_url)
            .map_err(|err| Error::Config(format!("backend_url {:?}: {}", self.backend_url, err)))
    }

    /// Absolute URL of `path` below the backend base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        utils::endpoint::join(&self.base_url()?, path)
            .map_err(|err| Error::Config(format!("endpoint {:?}: {}", path, err)))
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_entries: self.cache_max_entries,
        }
    }
}
