//! Query method detection
//!
//! Methods the base class and custom implementation leave open are handed
//! to query execution when they carry a declared query or follow the
//! derived-query naming scheme (`findByName`, `countDistinctByStatus`, ...).

use once_cell::sync::Lazy;
use regex::Regex;
use told_shared::{ConfigurationError, MethodDescriptor};

const DEFAULT_PREFIXES: &[&str] = &[
    "find", "read", "get", "query", "search", "stream", "count", "exists", "delete", "remove",
];

static DEFAULT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&pattern_for(DEFAULT_PREFIXES.iter().copied()))
        .expect("default query pattern is valid")
});

fn pattern_for<'a>(prefixes: impl Iterator<Item = &'a str>) -> String {
    let alternatives: Vec<String> = prefixes.map(regex::escape).collect();
    format!(r"^({})((\p{{Lu}}.*?))??By", alternatives.join("|"))
}

/// Decides whether a method can be left to query execution
#[derive(Debug, Clone)]
pub struct QueryMethodDetector {
    pattern: Regex,
}

impl QueryMethodDetector {
    pub fn new() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }

    /// Detector that also accepts the given subject keywords, e.g. "fetch"
    pub fn with_additional_prefixes(prefixes: &[String]) -> Result<Self, ConfigurationError> {
        if prefixes.is_empty() {
            return Ok(Self::new());
        }

        let all = DEFAULT_PREFIXES
            .iter()
            .copied()
            .chain(prefixes.iter().map(String::as_str));
        let pattern = Regex::new(&pattern_for(all))
            .map_err(|e| ConfigurationError::Invalid(format!("Invalid query prefix: {}", e)))?;

        Ok(Self { pattern })
    }

    pub fn is_query_method(&self, method: &MethodDescriptor) -> bool {
        method.declared_query().is_some() || self.is_derived_query_name(method.name())
    }

    pub fn is_derived_query_name(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

impl Default for QueryMethodDetector {
    fn default() -> Self {
        Self::new()
    }
}
