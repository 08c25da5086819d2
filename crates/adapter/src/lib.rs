//! # Told Adapter
//!
//! In-memory store behind repository proxies.
//!
//! ## Structure
//!
//! - `repository/` - `SimpleCrudRepository` base class and its in-memory
//!   implementation
//! - `backend` - factory backend wiring repositories to in-memory stores

pub mod backend;
pub mod repository;

pub use backend::InMemoryRepositoryBackend;
pub use repository::in_memory::InMemoryCrudRepository;
pub use repository::simple_crud_repository;
