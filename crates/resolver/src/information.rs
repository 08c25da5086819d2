//! RepositoryInformation - which implementation method backs each
//! repository method

use std::sync::Arc;

use dashmap::DashMap;
use told_shared::{ConfigurationError, MethodDescriptor, MethodKey, TypeDescriptor};
use tracing::trace;

use crate::metadata::RepositoryMetadata;
use crate::method_matcher::MethodMatcher;

/// Metadata plus the base class and optional custom implementation class
/// backing a repository. Target methods are resolved lazily and memoized.
#[derive(Debug)]
pub struct RepositoryInformation {
    metadata: Arc<RepositoryMetadata>,
    repository_base_class: Arc<TypeDescriptor>,
    custom_implementation_class: Option<Arc<TypeDescriptor>>,
    method_cache: DashMap<MethodKey, Arc<MethodDescriptor>>,
}

impl RepositoryInformation {
    pub fn new(
        metadata: Arc<RepositoryMetadata>,
        repository_base_class: Arc<TypeDescriptor>,
        custom_implementation_class: Option<Arc<TypeDescriptor>>,
    ) -> Self {
        Self {
            metadata,
            repository_base_class,
            custom_implementation_class,
            method_cache: DashMap::new(),
        }
    }

    pub fn metadata(&self) -> &Arc<RepositoryMetadata> {
        &self.metadata
    }

    pub fn domain_type(&self) -> &Arc<TypeDescriptor> {
        self.metadata.domain_type()
    }

    pub fn id_type(&self) -> &Arc<TypeDescriptor> {
        self.metadata.id_type()
    }

    pub fn repository_interface(&self) -> &Arc<TypeDescriptor> {
        self.metadata.repository_interface()
    }

    pub fn repository_base_class(&self) -> &Arc<TypeDescriptor> {
        &self.repository_base_class
    }

    pub fn custom_implementation_class(&self) -> Option<&Arc<TypeDescriptor>> {
        self.custom_implementation_class.as_ref()
    }

    /// Implementation method backing `method`: a custom implementation
    /// method first, then a base class method, else `method` itself.
    ///
    /// Results are cached per method; repeated calls return the same `Arc`.
    /// Returned methods are dispatched directly, whatever their visibility.
    pub fn target_class_method(
        &self,
        method: &Arc<MethodDescriptor>,
    ) -> Result<Arc<MethodDescriptor>, ConfigurationError> {
        let key = method.key();

        if let Some(cached) = self.method_cache.get(&key).map(|entry| entry.value().clone()) {
            return Ok(cached);
        }

        let matcher = MethodMatcher::new(&self.metadata);
        let custom = matcher.resolve(method, self.custom_implementation_class.as_ref())?;

        if *custom != **method {
            return Ok(self.cache_and_return(key, custom));
        }

        let base = matcher.resolve(method, Some(&self.repository_base_class))?;
        Ok(self.cache_and_return(key, base))
    }

    fn cache_and_return(&self, key: MethodKey, value: Arc<MethodDescriptor>) -> Arc<MethodDescriptor> {
        trace!(method = %key, target = %value, "caching target method");
        self.method_cache.insert(key, value.clone());
        value
    }

    /// Whether `method` is logically a base class method. This includes
    /// methods redeclared in the repository interface that match a base
    /// class signature.
    pub fn is_base_class_method(&self, method: &Arc<MethodDescriptor>) -> Result<bool, ConfigurationError> {
        self.is_target_class_method(method, Some(&self.repository_base_class))
    }

    /// Whether `method` is implemented by the custom implementation class
    pub fn is_custom_method(&self, method: &Arc<MethodDescriptor>) -> Result<bool, ConfigurationError> {
        self.is_target_class_method(method, self.custom_implementation_class.as_ref())
    }

    fn is_target_class_method(
        &self,
        method: &Arc<MethodDescriptor>,
        target_type: Option<&Arc<TypeDescriptor>>,
    ) -> Result<bool, ConfigurationError> {
        let Some(target_type) = target_type else {
            return Ok(false);
        };

        if target_type.conforms_to(method.declaring_type()) {
            return Ok(true);
        }

        let resolved = MethodMatcher::new(&self.metadata).resolve(method, Some(target_type))?;
        Ok(*resolved != **method)
    }

    /// All methods of the repository interface, declared and inherited
    pub fn repository_methods(&self) -> Vec<Arc<MethodDescriptor>> {
        self.repository_interface().methods()
    }

    pub fn custom_methods(&self) -> Result<Vec<Arc<MethodDescriptor>>, ConfigurationError> {
        let mut methods = Vec::new();
        for method in self.repository_methods() {
            if self.is_custom_method(&method)? {
                methods.push(method);
            }
        }
        Ok(methods)
    }

    pub fn has_custom_methods(&self) -> Result<bool, ConfigurationError> {
        Ok(!self.custom_methods()?.is_empty())
    }

    /// Methods neither implemented by the base class, the custom
    /// implementation nor a default body. These are left to query execution.
    pub fn query_method_candidates(&self) -> Result<Vec<Arc<MethodDescriptor>>, ConfigurationError> {
        let mut methods = Vec::new();
        for method in self.repository_methods() {
            if method.is_default() || self.is_custom_method(&method)? || self.is_base_class_method(&method)? {
                continue;
            }
            methods.push(method);
        }
        Ok(methods)
    }

    pub fn cached_method_count(&self) -> usize {
        self.method_cache.len()
    }

    pub fn clear_method_cache(&self) {
        self.method_cache.clear();
    }
}
