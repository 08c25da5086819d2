//! # Told Shared
//!
//! Common types used across all Told crates: the type-descriptor model
//! repositories are declared with, the well-known framework contracts,
//! errors, configuration and invocation traits.

pub mod config;
pub mod error;
pub mod invocation;
pub mod types;
pub mod well_known;

// Re-exports
pub use config::*;
pub use error::*;
pub use invocation::*;
pub use types::*;
