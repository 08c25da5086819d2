//! In-memory factory backend
//!
//! Every repository is backed by `SimpleCrudRepository`. Repositories of the
//! same domain type share one store.

use std::sync::Arc;

use dashmap::DashMap;
use told_proxy::RepositoryBackend;
use told_resolver::{RepositoryInformation, RepositoryMetadata};
use told_shared::{ConfigurationError, RepositoryTarget, TypeDescriptor};
use tracing::debug;

use crate::repository::in_memory::InMemoryCrudRepository;
use crate::repository::simple_crud_repository;

#[derive(Debug)]
pub struct InMemoryRepositoryBackend {
    id_property: String,
    stores: DashMap<String, InMemoryCrudRepository>,
}

impl InMemoryRepositoryBackend {
    pub fn new() -> Self {
        Self::with_id_property("id")
    }

    /// Backend whose entities are keyed by `id_property`
    pub fn with_id_property(id_property: impl Into<String>) -> Self {
        Self {
            id_property: id_property.into(),
            stores: DashMap::new(),
        }
    }

    /// Store for `domain_type`, created on first use
    pub fn store(&self, domain_type: &str) -> InMemoryCrudRepository {
        self.stores
            .entry(domain_type.to_string())
            .or_insert_with(|| {
                debug!("Creating in-memory store for {}", domain_type);
                InMemoryCrudRepository::new(self.id_property.clone())
            })
            .clone()
    }

    pub fn store_count(&self) -> usize {
        self.stores.len()
    }
}

impl Default for InMemoryRepositoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryBackend for InMemoryRepositoryBackend {
    fn repository_base_class(&self, _metadata: &RepositoryMetadata) -> Arc<TypeDescriptor> {
        simple_crud_repository()
    }

    fn target_repository(
        &self,
        information: &RepositoryInformation,
    ) -> Result<Arc<dyn RepositoryTarget>, ConfigurationError> {
        Ok(Arc::new(self.store(information.domain_type().name())))
    }

    fn validate(&self, information: &RepositoryInformation) -> Result<(), ConfigurationError> {
        let domain_type = information.domain_type();
        if domain_type.is_primitive() || domain_type.is_array() {
            return Err(ConfigurationError::Invalid(format!(
                "In-memory repository {} needs an entity domain type, got {}",
                information.repository_interface().name(),
                domain_type.name()
            )));
        }
        Ok(())
    }
}
