//! Error types for Told

use thiserror::Error;

/// Illegal repository configuration, raised while building metadata,
/// information or a proxy. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Given type {0} must be an interface")]
    NotAnInterface(String),

    #[error("Interface {0} must extend the repository marker or carry a repository definition")]
    MissingDefinition(String),

    #[error("Could not resolve domain type of {0}")]
    UnresolvedDomainType(String),

    #[error("Could not resolve id type of {0}")]
    UnresolvedIdType(String),

    #[error("You have custom methods in {interface} but did not provide a custom implementation: {}", methods.join(", "))]
    MissingCustomImplementation {
        interface: String,
        methods: Vec<String>,
    },

    #[error("Custom implementation {implementation} of {interface} does not implement: {}", methods.join(", "))]
    UnimplementedMethods {
        interface: String,
        implementation: String,
        methods: Vec<String>,
    },

    #[error("Ambiguous method match for {method} in {candidate_class}: {}", candidates.join(", "))]
    AmbiguousMethodMatch {
        method: String,
        candidate_class: String,
        candidates: Vec<String>,
    },

    #[error("Unknown repository base class '{0}'")]
    UnknownBaseClass(String),

    #[error("{0}")]
    Invalid(String),
}

/// Failure while dispatching a call through a repository proxy
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("Repository {repository} has no method '{method}' taking {arity} argument(s)")]
    NoSuchMethod {
        repository: String,
        method: String,
        arity: usize,
    },

    #[error("Call to '{method}' on {repository} is ambiguous: {}", candidates.join(", "))]
    AmbiguousCall {
        repository: String,
        method: String,
        candidates: Vec<String>,
    },

    #[error("No target backs {method} on {repository}")]
    Unbound { repository: String, method: String },

    #[error("Target {target} failed in {method}: {message}")]
    Target {
        target: String,
        method: String,
        message: String,
    },

    #[error("Argument {index} of {method} is invalid: {message}")]
    InvalidArgument {
        method: String,
        index: usize,
        message: String,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// General Told error type
#[derive(Debug, Error)]
pub enum ToldError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ToldError>;
