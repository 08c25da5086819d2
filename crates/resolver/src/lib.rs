//! # Told Resolver
//!
//! Works out what a repository interface is about and who implements it.
//!
//! ## Components
//!
//! - `RepositoryMetadata` - domain and id type of a repository interface
//! - `MethodMatcher` - generic-aware matching of interface methods against
//!   implementation classes
//! - `RepositoryInformation` - metadata plus base/custom implementation
//!   classes, with memoized target method lookup

pub mod information;
pub mod metadata;
pub mod method_matcher;

#[cfg(test)]
pub(crate) mod fixtures;

pub use information::RepositoryInformation;
pub use metadata::{unwrap_wrapper_types, RepositoryMetadata, ResolutionStrategy};
pub use method_matcher::MethodMatcher;
