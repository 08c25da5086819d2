//! Type descriptors for repository contracts
//!
//! Repository interfaces, entities and implementation classes are described
//! once, at registration time. Signatures stay unerased so type variables
//! can be bound against a concrete repository interface later on.
//!
//! ```text
//! CrudRepository<T, ID>          UserRepository
//!   save(S extends T)    ──────▶   extends CrudRepository<User, Long>
//!   findById(ID)                   findActive()
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::InvocationError;
use crate::invocation::Invoker;
use crate::well_known;

/// Type variable name to bound type
pub type Bindings = HashMap<String, GenericType>;

/// Body of a default interface method
pub type DefaultMethodBody =
    Arc<dyn Fn(&dyn Invoker, &[Value]) -> Result<Value, InvocationError> + Send + Sync>;

/// Kind of a described type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Primitive,
    Array(Arc<TypeDescriptor>),
}

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// Explicit domain/id declaration for interfaces that do not extend the
/// repository marker
#[derive(Debug, Clone, Default)]
pub struct RepositoryDefinition {
    pub domain_class: Option<Arc<TypeDescriptor>>,
    pub id_class: Option<Arc<TypeDescriptor>>,
}

impl RepositoryDefinition {
    pub fn new(domain_class: &Arc<TypeDescriptor>, id_class: &Arc<TypeDescriptor>) -> Self {
        Self {
            domain_class: Some(domain_class.clone()),
            id_class: Some(id_class.clone()),
        }
    }
}

/// A declared type variable with its upper bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeVariable {
    pub name: String,
    pub bounds: Vec<GenericType>,
}

impl TypeVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
        }
    }

    pub fn bounded(name: impl Into<String>, bound: impl Into<GenericType>) -> Self {
        Self {
            name: name.into(),
            bounds: vec![bound.into()],
        }
    }
}

/// An unerased type as it appears in a signature or supertype clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenericType {
    Raw(Arc<TypeDescriptor>),
    Parameterized {
        raw: Arc<TypeDescriptor>,
        arguments: Vec<GenericType>,
    },
    Variable(TypeVariable),
    Array(Box<GenericType>),
}

impl GenericType {
    pub fn parameterized(raw: &Arc<TypeDescriptor>, arguments: Vec<GenericType>) -> Self {
        GenericType::Parameterized {
            raw: raw.clone(),
            arguments,
        }
    }

    pub fn array(component: impl Into<GenericType>) -> Self {
        GenericType::Array(Box::new(component.into()))
    }

    /// Type arguments written on this type, empty unless parameterized
    pub fn arguments(&self) -> &[GenericType] {
        match self {
            GenericType::Parameterized { arguments, .. } => arguments,
            _ => &[],
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, GenericType::Variable(_))
    }

    /// Raw type after erasure. Variables erase to their first bound.
    pub fn erasure(&self) -> Arc<TypeDescriptor> {
        match self {
            GenericType::Raw(raw) | GenericType::Parameterized { raw, .. } => raw.clone(),
            GenericType::Variable(variable) => variable
                .bounds
                .first()
                .map(|bound| bound.erasure())
                .unwrap_or_else(well_known::object),
            GenericType::Array(component) => TypeDescriptor::array_of(&component.erasure()),
        }
    }

    /// Replace bound variables. Unbound variables keep their name but get
    /// their bounds substituted, so `S extends T` becomes `S extends User`.
    pub fn substitute(&self, bindings: &Bindings) -> GenericType {
        match self {
            GenericType::Raw(_) => self.clone(),
            GenericType::Parameterized { raw, arguments } => GenericType::Parameterized {
                raw: raw.clone(),
                arguments: arguments.iter().map(|a| a.substitute(bindings)).collect(),
            },
            GenericType::Variable(variable) => match bindings.get(&variable.name) {
                Some(bound) => bound.clone(),
                None => GenericType::Variable(TypeVariable {
                    name: variable.name.clone(),
                    bounds: variable.bounds.iter().map(|b| b.substitute(bindings)).collect(),
                }),
            },
            GenericType::Array(component) => GenericType::Array(Box::new(component.substitute(bindings))),
        }
    }

    /// Type arguments of the supertype named `target` as seen from this type
    pub fn supertype_arguments(&self, target: &str) -> Option<Vec<GenericType>> {
        self.find_supertype(target).map(|(_, arguments)| arguments)
    }

    /// Variable bindings of the supertype named `target` as seen from this type
    pub fn bindings_for(&self, target: &str) -> Option<Bindings> {
        self.find_supertype(target)
            .map(|(raw, arguments)| raw.bind(&arguments))
    }

    fn find_supertype(&self, target: &str) -> Option<(Arc<TypeDescriptor>, Vec<GenericType>)> {
        let (raw, arguments) = match self {
            GenericType::Raw(raw) => (raw, Vec::new()),
            GenericType::Parameterized { raw, arguments } => (raw, arguments.clone()),
            GenericType::Variable(variable) => return variable.bounds.first()?.find_supertype(target),
            GenericType::Array(_) => return None,
        };

        if raw.name() == target {
            let arguments = if arguments.is_empty() {
                raw.type_parameters()
                    .iter()
                    .cloned()
                    .map(GenericType::Variable)
                    .collect()
            } else {
                arguments
            };
            return Some((raw.clone(), arguments));
        }

        let bindings = raw.bind(&arguments);
        raw.supertypes()
            .iter()
            .find_map(|supertype| supertype.substitute(&bindings).find_supertype(target))
    }
}

impl From<Arc<TypeDescriptor>> for GenericType {
    fn from(raw: Arc<TypeDescriptor>) -> Self {
        GenericType::Raw(raw)
    }
}

impl From<&Arc<TypeDescriptor>> for GenericType {
    fn from(raw: &Arc<TypeDescriptor>) -> Self {
        GenericType::Raw(raw.clone())
    }
}

impl From<TypeVariable> for GenericType {
    fn from(variable: TypeVariable) -> Self {
        GenericType::Variable(variable)
    }
}

impl From<&TypeVariable> for GenericType {
    fn from(variable: &TypeVariable) -> Self {
        GenericType::Variable(variable.clone())
    }
}

impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericType::Raw(raw) => write!(f, "{}", raw.name()),
            GenericType::Parameterized { raw, arguments } => {
                let arguments: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{}<{}>", raw.name(), arguments.join(", "))
            }
            GenericType::Variable(variable) => write!(f, "{}", variable.name),
            GenericType::Array(component) => write!(f, "{}[]", component),
        }
    }
}

/// A class, interface, primitive or array type
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    type_parameters: Vec<TypeVariable>,
    supertypes: Vec<GenericType>,
    methods: Vec<Arc<MethodDescriptor>>,
    wrapper: bool,
    definition: Option<RepositoryDefinition>,
}

impl TypeDescriptor {
    pub fn class(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(name, TypeKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(name, TypeKind::Interface)
    }

    pub fn primitive(name: impl Into<String>) -> Arc<Self> {
        TypeBuilder::new(name, TypeKind::Primitive).build()
    }

    pub fn array_of(component: &Arc<TypeDescriptor>) -> Arc<Self> {
        TypeBuilder::new(
            format!("{}[]", component.name()),
            TypeKind::Array(component.clone()),
        )
        .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_primitive(&self) -> bool {
        self.kind == TypeKind::Primitive
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array(_))
    }

    pub fn component_type(&self) -> Option<&Arc<TypeDescriptor>> {
        match &self.kind {
            TypeKind::Array(component) => Some(component),
            _ => None,
        }
    }

    pub fn type_parameters(&self) -> &[TypeVariable] {
        &self.type_parameters
    }

    pub fn supertypes(&self) -> &[GenericType] {
        &self.supertypes
    }

    /// Methods declared directly on this type
    pub fn declared_methods(&self) -> &[Arc<MethodDescriptor>] {
        &self.methods
    }

    pub fn is_wrapper(&self) -> bool {
        self.wrapper
    }

    pub fn definition(&self) -> Option<&RepositoryDefinition> {
        self.definition.as_ref()
    }

    /// Whether a value of `other` can be used where `self` is expected
    pub fn is_assignable_from(&self, other: &TypeDescriptor) -> bool {
        if self.name == other.name {
            return true;
        }

        match (&self.kind, &other.kind) {
            (TypeKind::Primitive, _) | (_, TypeKind::Primitive) => false,
            (TypeKind::Array(target), TypeKind::Array(source)) => {
                !source.is_primitive() && target.is_assignable_from(source)
            }
            _ if self.name == well_known::OBJECT => true,
            _ => other
                .supertypes
                .iter()
                .any(|supertype| self.is_assignable_from(&supertype.erasure())),
        }
    }

    /// Whether this type is, or inherits from, the type named `name`
    pub fn conforms_to(&self, name: &str) -> bool {
        if self.name == name {
            return true;
        }
        if name == well_known::OBJECT && !self.is_primitive() {
            return true;
        }
        self.supertypes
            .iter()
            .any(|supertype| supertype.erasure().conforms_to(name))
    }

    /// Closest supertype flagged as a wrapper (iterables, optionals, futures, streams)
    pub fn wrapper_ancestor(self: &Arc<Self>) -> Option<Arc<TypeDescriptor>> {
        if self.wrapper {
            return Some(self.clone());
        }
        self.supertypes
            .iter()
            .find_map(|supertype| supertype.erasure().wrapper_ancestor())
    }

    /// Declared and inherited methods. Inherited methods with the same name
    /// and erased parameters as an already collected one are hidden.
    ///
    /// Classes also hide inherited methods that a collected method overrides
    /// once the supertype's arguments are bound, e.g. `save(User)` over
    /// `save(S extends T)` in a `SimpleCrudRepository<User, Long>` subclass.
    /// A bridge under the inherited erased signature takes its place.
    pub fn methods(&self) -> Vec<Arc<MethodDescriptor>> {
        let mut methods = self.methods.clone();

        for supertype in &self.supertypes {
            for inherited in supertype.erasure().methods() {
                if methods.iter().any(|method| method.overrides(&inherited)) {
                    continue;
                }

                let overriding = if self.is_interface() {
                    None
                } else {
                    let bindings = supertype
                        .bindings_for(inherited.declaring_type())
                        .unwrap_or_default();
                    methods
                        .iter()
                        .find(|method| !method.is_bridge() && method.overrides_bound(&inherited, &bindings))
                        .cloned()
                };

                match overriding {
                    Some(target) => methods.push(MethodDescriptor::bridge(&self.name, &inherited, &target)),
                    None => methods.push(inherited),
                }
            }
        }

        methods
    }

    pub fn public_methods(&self) -> Vec<Arc<MethodDescriptor>> {
        self.methods()
            .into_iter()
            .filter(|method| method.is_public())
            .collect()
    }

    /// Bind this type's parameters to the given arguments, positionally
    pub fn bind(&self, arguments: &[GenericType]) -> Bindings {
        self.type_parameters
            .iter()
            .zip(arguments)
            .map(|(parameter, argument)| (parameter.name.clone(), argument.clone()))
            .collect()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeDescriptor {}

impl std::hash::Hash for TypeDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("methods", &self.methods.len())
            .finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Builder for [`TypeDescriptor`]
pub struct TypeBuilder {
    name: String,
    kind: TypeKind,
    type_parameters: Vec<TypeVariable>,
    supertypes: Vec<GenericType>,
    methods: Vec<MethodBuilder>,
    wrapper: bool,
    definition: Option<RepositoryDefinition>,
}

impl TypeBuilder {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            methods: Vec::new(),
            wrapper: false,
            definition: None,
        }
    }

    pub fn type_parameter(mut self, variable: TypeVariable) -> Self {
        self.type_parameters.push(variable);
        self
    }

    /// Add a superclass or implemented/extended interface
    pub fn extends(mut self, supertype: impl Into<GenericType>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    pub fn wrapper(mut self) -> Self {
        self.wrapper = true;
        self
    }

    pub fn definition(mut self, definition: RepositoryDefinition) -> Self {
        self.definition = Some(definition);
        self
    }

    pub fn build(self) -> Arc<TypeDescriptor> {
        let methods = self
            .methods
            .into_iter()
            .map(|method| method.build(&self.name))
            .collect();

        Arc::new(TypeDescriptor {
            name: self.name,
            kind: self.kind,
            type_parameters: self.type_parameters,
            supertypes: self.supertypes,
            methods,
            wrapper: self.wrapper,
            definition: self.definition,
        })
    }
}

/// Identity of a method: declaring type, name and erased parameter types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub declaring_type: String,
    pub name: String,
    pub parameter_types: Vec<String>,
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({})",
            self.declaring_type,
            self.name,
            self.parameter_types.join(", ")
        )
    }
}

/// A method declared on a type
pub struct MethodDescriptor {
    declaring_type: String,
    name: String,
    parameters: Vec<GenericType>,
    return_type: GenericType,
    visibility: Visibility,
    default_body: Option<DefaultMethodBody>,
    query: Option<String>,
    bridged: Option<Arc<MethodDescriptor>>,
}

impl MethodDescriptor {
    pub fn builder(name: impl Into<String>) -> MethodBuilder {
        MethodBuilder {
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
            visibility: Visibility::Public,
            default_body: None,
            query: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Generic parameter types as declared
    pub fn parameters(&self) -> &[GenericType] {
        &self.parameters
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn return_type(&self) -> &GenericType {
        &self.return_type
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Whether the method carries its own body (default interface method)
    pub fn is_default(&self) -> bool {
        self.default_body.is_some()
    }

    pub fn default_body(&self) -> Option<&DefaultMethodBody> {
        self.default_body.as_ref()
    }

    pub fn declared_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn erased_parameter_types(&self) -> Vec<Arc<TypeDescriptor>> {
        self.parameters.iter().map(|p| p.erasure()).collect()
    }

    pub fn key(&self) -> MethodKey {
        MethodKey {
            declaring_type: self.declaring_type.clone(),
            name: self.name.clone(),
            parameter_types: self
                .erased_parameter_types()
                .iter()
                .map(|t| t.name().to_string())
                .collect(),
        }
    }

    /// Same name and erased parameter types, regardless of declaring type
    pub fn overrides(&self, other: &MethodDescriptor) -> bool {
        self.overrides_bound(other, &Bindings::new())
    }

    /// Like [`overrides`](Self::overrides), with `bindings` applied to the
    /// parameters of `other` before erasure
    pub fn overrides_bound(&self, other: &MethodDescriptor, bindings: &Bindings) -> bool {
        self.name == other.name
            && self.parameters.len() == other.parameters.len()
            && self
                .erased_parameter_types()
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| **a == *b.substitute(bindings).erasure())
    }

    /// Method declared on `declaring_type` with the erased signature of
    /// `inherited`, forwarding to `target`
    fn bridge(
        declaring_type: &str,
        inherited: &MethodDescriptor,
        target: &Arc<MethodDescriptor>,
    ) -> Arc<MethodDescriptor> {
        Arc::new(MethodDescriptor {
            declaring_type: declaring_type.to_string(),
            name: inherited.name.clone(),
            parameters: inherited
                .erased_parameter_types()
                .into_iter()
                .map(GenericType::Raw)
                .collect(),
            return_type: GenericType::Raw(inherited.return_type.erasure()),
            visibility: target.visibility,
            default_body: None,
            query: None,
            bridged: Some(target.bridge_target().unwrap_or(target).clone()),
        })
    }

    pub fn is_bridge(&self) -> bool {
        self.bridged.is_some()
    }

    /// Overriding method a bridge forwards to
    pub fn bridge_target(&self) -> Option<&Arc<MethodDescriptor>> {
        self.bridged.as_ref()
    }
}

impl PartialEq for MethodDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for MethodDescriptor {}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("key", &self.key())
            .field("return_type", &self.return_type.to_string())
            .field("visibility", &self.visibility)
            .field("default", &self.is_default())
            .field("query", &self.query)
            .field("bridge", &self.is_bridge())
            .finish()
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parameters: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();
        write!(f, "{}.{}({})", self.declaring_type, self.name, parameters.join(", "))
    }
}

/// Builder for [`MethodDescriptor`]. The declaring type is filled in by
/// [`TypeBuilder::build`].
pub struct MethodBuilder {
    name: String,
    parameters: Vec<GenericType>,
    return_type: Option<GenericType>,
    visibility: Visibility,
    default_body: Option<DefaultMethodBody>,
    query: Option<String>,
}

impl MethodBuilder {
    pub fn parameter(mut self, parameter: impl Into<GenericType>) -> Self {
        self.parameters.push(parameter.into());
        self
    }

    pub fn returns(mut self, return_type: impl Into<GenericType>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn default_body<F>(mut self, body: F) -> Self
    where
        F: Fn(&dyn Invoker, &[Value]) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        self.default_body = Some(Arc::new(body));
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    fn build(self, declaring_type: &str) -> Arc<MethodDescriptor> {
        Arc::new(MethodDescriptor {
            declaring_type: declaring_type.to_string(),
            name: self.name,
            parameters: self.parameters,
            return_type: self
                .return_type
                .unwrap_or_else(|| GenericType::Raw(well_known::void())),
            visibility: self.visibility,
            default_body: self.default_body,
            query: self.query,
            bridged: None,
        })
    }
}

/// Name lookup for registered types
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the well-known contracts
    pub fn with_well_known() -> Self {
        let mut registry = Self::new();
        for ty in well_known::all() {
            registry.register(ty);
        }
        registry
    }

    pub fn register(&mut self, ty: Arc<TypeDescriptor>) {
        self.types.insert(ty.name().to_string(), ty);
    }

    pub fn get(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::well_known::{collection, iterable, list, long, number, object, serializable, string};

    fn entity() -> Arc<TypeDescriptor> {
        TypeDescriptor::class("User").extends(serializable()).build()
    }

    #[test]
    fn test_assignability_follows_supertypes() {
        assert!(number().is_assignable_from(&long()));
        assert!(serializable().is_assignable_from(&long()));
        assert!(object().is_assignable_from(&long()));
        assert!(!long().is_assignable_from(&number()));
        assert!(iterable().is_assignable_from(&list()));
        assert!(!list().is_assignable_from(&iterable()));
    }

    #[test]
    fn test_array_assignability_is_covariant() {
        let numbers = TypeDescriptor::array_of(&number());
        let longs = TypeDescriptor::array_of(&long());

        assert!(numbers.is_assignable_from(&longs));
        assert!(!longs.is_assignable_from(&numbers));
        assert!(object().is_assignable_from(&longs));
        assert_eq!(longs.name(), "Long[]");
    }

    #[test]
    fn test_erasure_uses_first_bound() {
        let user = entity();
        let t = TypeVariable::bounded("T", &user);
        let unbounded = TypeVariable::new("ID");

        assert_eq!(GenericType::from(&t).erasure().name(), "User");
        assert_eq!(GenericType::from(&unbounded).erasure().name(), well_known::OBJECT);
        assert_eq!(
            GenericType::parameterized(&list(), vec![GenericType::from(&user)])
                .erasure()
                .name(),
            "List"
        );
    }

    #[test]
    fn test_substitute_reaches_variable_bounds() {
        let user = entity();
        let t = TypeVariable::new("T");
        let s = TypeVariable::bounded("S", &t);

        let mut bindings = Bindings::new();
        bindings.insert("T".to_string(), GenericType::from(&user));

        let substituted = GenericType::from(&s).substitute(&bindings);
        assert!(substituted.is_variable());
        assert_eq!(substituted.erasure().name(), "User");
    }

    #[test]
    fn test_supertype_arguments_walk_the_hierarchy() {
        let list_of_strings = GenericType::parameterized(&list(), vec![GenericType::from(string())]);

        let arguments = list_of_strings.supertype_arguments(well_known::ITERABLE).unwrap();
        assert_eq!(arguments.len(), 1);
        assert_eq!(arguments[0].erasure().name(), "String");

        let raw_collection = GenericType::from(collection());
        let arguments = raw_collection.supertype_arguments(well_known::ITERABLE).unwrap();
        assert!(arguments[0].is_variable());

        assert!(list_of_strings.supertype_arguments("Optional").is_none());
    }

    #[test]
    fn test_methods_hide_overridden_inherited_methods() {
        let t = TypeVariable::new("T");
        let base = TypeDescriptor::interface("Base")
            .type_parameter(t.clone())
            .method(MethodDescriptor::builder("save").parameter(&t).returns(&t))
            .method(MethodDescriptor::builder("count").returns(long()))
            .build();

        let child = TypeDescriptor::class("Child")
            .extends(&base)
            .method(MethodDescriptor::builder("save").parameter(object()).returns(object()))
            .method(
                MethodDescriptor::builder("helper").visibility(Visibility::Private),
            )
            .build();

        let methods = child.methods();
        assert_eq!(methods.len(), 3);
        assert_eq!(methods[0].declaring_type(), "Child");

        let public: Vec<String> = child.public_methods().iter().map(|m| m.name().to_string()).collect();
        assert_eq!(public, vec!["save", "count"]);
    }

    #[test]
    fn test_concrete_override_of_bound_generic_method_is_bridged() {
        let user = entity();
        let t = TypeVariable::new("T");
        let base = TypeDescriptor::interface("Store")
            .type_parameter(t.clone())
            .method(MethodDescriptor::builder("save").parameter(&t).returns(&t))
            .method(MethodDescriptor::builder("count").returns(long()))
            .build();
        let user_store = GenericType::parameterized(&base, vec![GenericType::from(&user)]);

        let class = TypeDescriptor::class("UserStore")
            .extends(user_store.clone())
            .method(MethodDescriptor::builder("save").parameter(&user).returns(&user))
            .build();

        let methods = class.methods();
        let keys: Vec<String> = methods.iter().map(|m| m.key().to_string()).collect();
        assert_eq!(keys, vec!["UserStore.save(User)", "UserStore.save(Object)", "Store.count()"]);
        assert!(methods[1].is_bridge());
        assert!(Arc::ptr_eq(methods[1].bridge_target().unwrap(), &methods[0]));

        // interfaces keep both signatures
        let interface = TypeDescriptor::interface("UserStoreRepository")
            .extends(user_store)
            .method(MethodDescriptor::builder("save").parameter(&user).returns(&user))
            .build();
        let keys: Vec<String> = interface.methods().iter().map(|m| m.key().to_string()).collect();
        assert_eq!(keys, vec!["UserStoreRepository.save(User)", "Store.save(Object)", "Store.count()"]);
    }

    #[test]
    fn test_method_key_and_display() {
        let user = entity();
        let repo = TypeDescriptor::interface("UserRepository")
            .method(
                MethodDescriptor::builder("findByName")
                    .parameter(string())
                    .returns(GenericType::parameterized(&list(), vec![GenericType::from(&user)])),
            )
            .build();

        let method = &repo.declared_methods()[0];
        assert_eq!(method.key().to_string(), "UserRepository.findByName(String)");
        assert_eq!(method.return_type().to_string(), "List<User>");
        assert!(!method.is_default());
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = TypeRegistry::with_well_known();
        assert!(registry.contains("CrudRepository"));

        registry.register(entity());
        assert_eq!(registry.get("User").unwrap().name(), "User");
        assert!(registry.get("Missing").is_none());
    }
}
