//! MethodMatcher - finds the implementation method backing an interface method
//!
//! A candidate matches when name and arity agree and every parameter passes
//! one of the rules below, checked against the candidate's declared type:
//!
//! - id variable: the repository's id type fits the interface parameter
//! - domain variable (by name, or by its first bound): the domain type fits
//!   the interface parameter, which must not be a bare iterable
//! - anything else: erased types are assignable and identical
//!
//! A matching bridge stands for the override it forwards to.

use std::sync::Arc;

use told_shared::well_known;
use told_shared::{ConfigurationError, GenericType, MethodDescriptor, TypeDescriptor, TypeVariable};
use tracing::trace;

use crate::metadata::RepositoryMetadata;

/// Matches interface methods against implementation classes of one repository
#[derive(Debug, Clone, Copy)]
pub struct MethodMatcher<'a> {
    metadata: &'a RepositoryMetadata,
}

impl<'a> MethodMatcher<'a> {
    pub fn new(metadata: &'a RepositoryMetadata) -> Self {
        Self { metadata }
    }

    /// Public method of `candidate_class` implementing `method`, or `method`
    /// itself when there is none. Several matching candidates are an error.
    pub fn resolve(
        &self,
        method: &Arc<MethodDescriptor>,
        candidate_class: Option<&Arc<TypeDescriptor>>,
    ) -> Result<Arc<MethodDescriptor>, ConfigurationError> {
        let Some(candidate_class) = candidate_class else {
            return Ok(method.clone());
        };

        let mut matches: Vec<Arc<MethodDescriptor>> = Vec::new();
        for candidate in candidate_class.public_methods() {
            if !self.matches(method, &candidate) {
                continue;
            }
            // bridges execute the method they forward to
            let found = candidate.bridge_target().cloned().unwrap_or(candidate);
            if !matches.iter().any(|m| Arc::ptr_eq(m, &found)) {
                matches.push(found);
            }
        }

        if matches.len() > 1 {
            return Err(ConfigurationError::AmbiguousMethodMatch {
                method: method.to_string(),
                candidate_class: candidate_class.name().to_string(),
                candidates: matches.iter().map(|m| m.to_string()).collect(),
            });
        }

        match matches.pop() {
            Some(found) => {
                trace!(method = %method, target = %found, "matched implementation method");
                Ok(found)
            }
            None => Ok(method.clone()),
        }
    }

    /// Whether `candidate` can execute `method`
    pub fn matches(&self, method: &MethodDescriptor, candidate: &MethodDescriptor) -> bool {
        method.name() == candidate.name()
            && method.parameter_count() == candidate.parameter_count()
            && self.parameters_match(method, candidate)
    }

    fn parameters_match(&self, method: &MethodDescriptor, candidate: &MethodDescriptor) -> bool {
        let declared_types = method.erased_parameter_types();

        candidate
            .parameters()
            .iter()
            .enumerate()
            .all(|(index, generic_type)| {
                let parameter_type = self.metadata.resolve_parameter_type(method, index);

                match generic_type {
                    GenericType::Variable(variable) => self.matches_generic_type(variable, &parameter_type),
                    _ => {
                        let ty = generic_type.erasure();
                        ty.is_assignable_from(&parameter_type) && *ty == *declared_types[index]
                    }
                }
            })
    }

    fn matches_generic_type(&self, variable: &TypeVariable, parameter_type: &TypeDescriptor) -> bool {
        if variable.name == well_known::id_type_variable()
            && parameter_type.is_assignable_from(self.metadata.id_type())
        {
            return true;
        }

        let reference_name = match variable.bounds.first() {
            Some(GenericType::Variable(bound)) => bound.name.as_str(),
            _ => variable.name.as_str(),
        };

        let is_domain_type_reference = reference_name == well_known::domain_type_variable();
        let parameter_matches_entity = parameter_type.is_assignable_from(self.metadata.domain_type());

        // keeps save(Iterable) apart from save(entity) for entities that are iterable
        let is_not_iterable = parameter_type.name() != well_known::ITERABLE;

        is_domain_type_reference && parameter_matches_entity && is_not_iterable
    }
}
