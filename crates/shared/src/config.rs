//! Configuration types for Told

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Repository factory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryConfig {
    /// Base class to use for every repository instead of the backend's choice
    #[serde(default)]
    pub repository_base_class: Option<String>,

    /// Expose the transactional marker interface on created proxies
    #[serde(default)]
    pub transactional_proxy: bool,

    /// Treat derived and declared query methods as implemented
    #[serde(default = "default_query_lookup")]
    pub query_lookup: bool,

    /// Extra subject keywords for derived query names, e.g. "fetch"
    #[serde(default)]
    pub additional_query_prefixes: Vec<String>,
}

fn default_query_lookup() -> bool {
    true
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            repository_base_class: None,
            transactional_proxy: false,
            query_lookup: default_query_lookup(),
            additional_query_prefixes: Vec::new(),
        }
    }
}

impl FactoryConfig {
    /// Load configuration from a JSON or YAML file, chosen by extension
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        Ok(config)
    }
}
