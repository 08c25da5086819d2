//! RepositoryMetadata - domain and id type resolution
//!
//! Interfaces extending the repository marker get their types from the
//! marker's type arguments. Every other interface must carry an explicit
//! [`RepositoryDefinition`](told_shared::RepositoryDefinition).

use std::sync::Arc;

use told_shared::well_known;
use told_shared::{ConfigurationError, GenericType, MethodDescriptor, TypeDescriptor};
use tracing::trace;

/// How the domain and id types of a repository were found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// Type arguments of the repository marker supertype
    GenericSupertype,
    /// Explicit repository definition on the interface
    Definition,
}

/// Resolved domain and id types of one repository interface
#[derive(Debug, Clone)]
pub struct RepositoryMetadata {
    repository_interface: Arc<TypeDescriptor>,
    domain_type: Arc<TypeDescriptor>,
    id_type: Arc<TypeDescriptor>,
    strategy: ResolutionStrategy,
}

impl RepositoryMetadata {
    /// Resolve metadata for a repository interface
    pub fn resolve(repository_interface: &Arc<TypeDescriptor>) -> Result<Self, ConfigurationError> {
        if !repository_interface.is_interface() {
            return Err(ConfigurationError::NotAnInterface(
                repository_interface.name().to_string(),
            ));
        }

        if repository_interface.conforms_to(well_known::REPOSITORY) {
            Self::from_generic_supertype(repository_interface)
        } else {
            Self::from_definition(repository_interface)
        }
    }

    fn from_generic_supertype(repository_interface: &Arc<TypeDescriptor>) -> Result<Self, ConfigurationError> {
        let name = repository_interface.name();
        let arguments = GenericType::from(repository_interface)
            .supertype_arguments(well_known::REPOSITORY)
            .unwrap_or_default();

        let domain_type = resolved_argument(&arguments, 0)
            .ok_or_else(|| ConfigurationError::UnresolvedDomainType(name.to_string()))?;
        let id_type = resolved_argument(&arguments, 1)
            .ok_or_else(|| ConfigurationError::UnresolvedIdType(name.to_string()))?;

        trace!(repository = name, domain = domain_type.name(), id = id_type.name(), "resolved from marker supertype");

        Ok(Self {
            repository_interface: repository_interface.clone(),
            domain_type,
            id_type,
            strategy: ResolutionStrategy::GenericSupertype,
        })
    }

    fn from_definition(repository_interface: &Arc<TypeDescriptor>) -> Result<Self, ConfigurationError> {
        let name = repository_interface.name();
        let definition = repository_interface
            .definition()
            .ok_or_else(|| ConfigurationError::MissingDefinition(name.to_string()))?;

        let domain_type = definition
            .domain_class
            .clone()
            .ok_or_else(|| ConfigurationError::UnresolvedDomainType(name.to_string()))?;
        let id_type = definition
            .id_class
            .clone()
            .ok_or_else(|| ConfigurationError::UnresolvedIdType(name.to_string()))?;

        trace!(repository = name, domain = domain_type.name(), id = id_type.name(), "resolved from definition");

        Ok(Self {
            repository_interface: repository_interface.clone(),
            domain_type,
            id_type,
            strategy: ResolutionStrategy::Definition,
        })
    }

    pub fn repository_interface(&self) -> &Arc<TypeDescriptor> {
        &self.repository_interface
    }

    pub fn domain_type(&self) -> &Arc<TypeDescriptor> {
        &self.domain_type
    }

    pub fn id_type(&self) -> &Arc<TypeDescriptor> {
        &self.id_type
    }

    pub fn strategy(&self) -> ResolutionStrategy {
        self.strategy
    }

    /// Bind the type variables of `ty`, taken from a signature of `method`,
    /// against the repository interface
    pub fn resolve_type(&self, method: &MethodDescriptor, ty: &GenericType) -> GenericType {
        let bindings = GenericType::from(&self.repository_interface)
            .bindings_for(method.declaring_type())
            .unwrap_or_default();
        ty.substitute(&bindings)
    }

    /// Erased type of parameter `index` of `method` as seen from the repository interface
    pub fn resolve_parameter_type(&self, method: &MethodDescriptor, index: usize) -> Arc<TypeDescriptor> {
        match method.parameters().get(index) {
            Some(parameter) => self.resolve_type(method, parameter).erasure(),
            None => well_known::object(),
        }
    }

    /// Element type returned by `method`, with iterables, arrays and other
    /// wrappers stripped
    pub fn returned_domain_class(&self, method: &MethodDescriptor) -> Arc<TypeDescriptor> {
        unwrap_wrapper_types(&self.resolve_type(method, method.return_type()))
    }
}

fn resolved_argument(arguments: &[GenericType], index: usize) -> Option<Arc<TypeDescriptor>> {
    arguments
        .get(index)
        .filter(|argument| !argument.is_variable())
        .map(|argument| argument.erasure())
}

/// Recursively unwrap arrays and wrapper types down to the element type.
/// Unwrapping an already plain type returns it unchanged.
pub fn unwrap_wrapper_types(ty: &GenericType) -> Arc<TypeDescriptor> {
    let raw = ty.erasure();

    match component_type(ty, &raw) {
        Some(component) => unwrap_wrapper_types(&component),
        None => raw,
    }
}

fn component_type(ty: &GenericType, raw: &Arc<TypeDescriptor>) -> Option<GenericType> {
    if let GenericType::Array(component) = ty {
        return Some((**component).clone());
    }
    if let Some(component) = raw.component_type() {
        return Some(GenericType::from(component));
    }

    let wrapper = raw.wrapper_ancestor()?;
    let argument = ty
        .supertype_arguments(wrapper.name())
        .and_then(|arguments| arguments.into_iter().next());

    Some(argument.unwrap_or_else(|| GenericType::from(well_known::object())))
}
