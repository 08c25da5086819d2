//! RepositoryFactorySupport - creates repository proxies for interfaces

use std::sync::Arc;

use dashmap::DashMap;
use told_resolver::{RepositoryInformation, RepositoryMetadata};
use told_shared::well_known;
use told_shared::{ConfigurationError, FactoryConfig, RepositoryTarget, TypeDescriptor, TypeRegistry};
use tracing::{debug, info, trace, warn};

use crate::interceptor::{DefaultMethodInvokingInterceptor, ExposeInvocationInterceptor};
use crate::post_processor::RepositoryProxyPostProcessor;
use crate::proxy::{ProxyFactory, RepositoryProxy};
use crate::query::QueryMethodDetector;

/// Store-specific part of repository creation
pub trait RepositoryBackend: Send + Sync {
    /// Class implementing the common repository methods for `metadata`
    fn repository_base_class(&self, metadata: &RepositoryMetadata) -> Arc<TypeDescriptor>;

    /// Object the proxy dispatches base class methods to
    fn target_repository(
        &self,
        information: &RepositoryInformation,
    ) -> Result<Arc<dyn RepositoryTarget>, ConfigurationError>;

    /// Extra checks before a proxy is built
    fn validate(&self, _information: &RepositoryInformation) -> Result<(), ConfigurationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    repository_interface: String,
    custom_implementation_class: Option<String>,
}

/// Creates repository instances: resolves metadata, checks every method has
/// an implementation and assembles the proxy.
///
/// Safe to share between threads. Repository information is cached per
/// interface and custom implementation class.
pub struct RepositoryFactorySupport<B> {
    backend: B,
    repository_base_class: Option<Arc<TypeDescriptor>>,
    transactional_proxy: bool,
    query_lookup: bool,
    query_detector: QueryMethodDetector,
    post_processors: Vec<Arc<dyn RepositoryProxyPostProcessor>>,
    information_cache: DashMap<CacheKey, Arc<RepositoryInformation>>,
}

impl<B: RepositoryBackend> RepositoryFactorySupport<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            repository_base_class: None,
            transactional_proxy: false,
            query_lookup: true,
            query_detector: QueryMethodDetector::new(),
            post_processors: Vec::new(),
            information_cache: DashMap::new(),
        }
    }

    /// Factory configured from `config`, resolving a configured base class
    /// in `registry`
    pub fn with_config(
        backend: B,
        config: &FactoryConfig,
        registry: &TypeRegistry,
    ) -> Result<Self, ConfigurationError> {
        let mut factory = Self::new(backend);

        if let Some(name) = &config.repository_base_class {
            let base_class = registry
                .get(name)
                .ok_or_else(|| ConfigurationError::UnknownBaseClass(name.clone()))?;
            factory.set_repository_base_class(base_class);
        }

        factory.transactional_proxy = config.transactional_proxy;
        factory.query_lookup = config.query_lookup;
        factory.query_detector = QueryMethodDetector::with_additional_prefixes(&config.additional_query_prefixes)?;

        info!(
            "Repository factory configured (base class: {}, transactional: {}, query lookup: {})",
            config.repository_base_class.as_deref().unwrap_or("<backend>"),
            factory.transactional_proxy,
            factory.query_lookup
        );
        Ok(factory)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Use `base_class` for all repositories instead of the backend's choice
    pub fn set_repository_base_class(&mut self, base_class: Arc<TypeDescriptor>) {
        self.repository_base_class = Some(base_class);
        self.clear_cache();
    }

    pub fn set_transactional_proxy(&mut self, transactional_proxy: bool) {
        self.transactional_proxy = transactional_proxy;
    }

    pub fn set_query_lookup(&mut self, query_lookup: bool) {
        self.query_lookup = query_lookup;
    }

    pub fn add_repository_proxy_post_processor(&mut self, processor: Arc<dyn RepositoryProxyPostProcessor>) {
        self.post_processors.push(processor);
    }

    /// Create a repository instance for `repository_interface`, backed by
    /// the backend's target and an optional custom implementation
    pub fn get_repository(
        &self,
        repository_interface: &Arc<TypeDescriptor>,
        custom_implementation: Option<Arc<dyn RepositoryTarget>>,
    ) -> Result<RepositoryProxy, ConfigurationError> {
        debug!("Initializing repository instance for {}", repository_interface.name());

        let metadata = self.get_repository_metadata(repository_interface)?;
        let custom_class = custom_implementation.as_ref().map(|custom| custom.target_class());
        let information = self.get_repository_information(metadata, custom_class.as_ref());

        if let Err(e) = self.validate(&information) {
            warn!("Rejecting repository {}: {}", repository_interface.name(), e);
            return Err(e);
        }

        let target = self.backend.target_repository(&information)?;

        let mut factory = ProxyFactory::new(target);
        factory.set_custom_implementation(custom_implementation);
        factory.add_interface(Arc::clone(repository_interface));
        factory.add_interface(well_known::repository());
        factory.add_interceptor(Arc::new(ExposeInvocationInterceptor));

        if self.transactional_proxy {
            factory.add_interface(well_known::transactional_proxy());
        }

        for processor in &self.post_processors {
            processor.post_process(&mut factory, &information);
        }

        factory.add_interceptor(Arc::new(DefaultMethodInvokingInterceptor));

        let repository = factory.proxy(information)?;
        debug!("Finished creation of repository instance for {}", repository_interface.name());
        Ok(repository)
    }

    pub fn get_repository_metadata(
        &self,
        repository_interface: &Arc<TypeDescriptor>,
    ) -> Result<RepositoryMetadata, ConfigurationError> {
        RepositoryMetadata::resolve(repository_interface)
    }

    /// Repository information for `metadata` and an optional custom
    /// implementation class. Equal inputs share one cached instance.
    pub fn get_repository_information(
        &self,
        metadata: RepositoryMetadata,
        custom_implementation_class: Option<&Arc<TypeDescriptor>>,
    ) -> Arc<RepositoryInformation> {
        let key = CacheKey {
            repository_interface: metadata.repository_interface().name().to_string(),
            custom_implementation_class: custom_implementation_class.map(|class| class.name().to_string()),
        };

        if let Some(cached) = self.information_cache.get(&key) {
            trace!("Repository information cache hit for {}", key.repository_interface);
            return Arc::clone(cached.value());
        }

        let base_class = self
            .repository_base_class
            .clone()
            .unwrap_or_else(|| self.backend.repository_base_class(&metadata));

        debug!(
            "Caching repository information for {} (base class {})",
            key.repository_interface,
            base_class.name()
        );

        let information = Arc::new(RepositoryInformation::new(
            Arc::new(metadata),
            base_class,
            custom_implementation_class.cloned(),
        ));

        // a racing thread may have inserted first; keep its instance
        let entry = self.information_cache.entry(key).or_insert(information);
        Arc::clone(entry.value())
    }

    fn validate(&self, information: &RepositoryInformation) -> Result<(), ConfigurationError> {
        let unimplemented: Vec<String> = information
            .query_method_candidates()?
            .iter()
            .filter(|method| !(self.query_lookup && self.query_detector.is_query_method(method)))
            .map(|method| method.to_string())
            .collect();

        if !unimplemented.is_empty() {
            let interface = information.repository_interface().name().to_string();

            return Err(match information.custom_implementation_class() {
                Some(implementation) => ConfigurationError::UnimplementedMethods {
                    interface,
                    implementation: implementation.name().to_string(),
                    methods: unimplemented,
                },
                None => ConfigurationError::MissingCustomImplementation {
                    interface,
                    methods: unimplemented,
                },
            });
        }

        self.backend.validate(information)
    }

    /// Drop cached information for one repository interface. Returns the
    /// number of removed entries.
    pub fn evict(&self, repository_interface: &str) -> usize {
        let mut removed = 0;
        self.information_cache.retain(|key, _| {
            let keep = key.repository_interface != repository_interface;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn clear_cache(&self) {
        self.information_cache.clear();
    }

    pub fn cached_information_count(&self) -> usize {
        self.information_cache.len()
    }
}
