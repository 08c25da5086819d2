//! Repository proxies and the factory assembling them

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use told_resolver::RepositoryInformation;
use told_shared::{
    ConfigurationError, InvocationError, Invoker, MethodDescriptor, MethodKey, RepositoryTarget,
    TypeDescriptor,
};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::interceptor::{MethodInterceptor, MethodInvocation};

/// Where a repository method ends up once the interceptor chain is done
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// Method of the custom implementation
    Custom(Arc<MethodDescriptor>),
    /// Method of the base repository implementation
    Base(Arc<MethodDescriptor>),
    /// Default interface method, run by its own body
    DefaultMethod,
    /// Nothing implements it; an interceptor has to answer (query methods)
    Unbound,
}

/// Collects what goes into a repository proxy: the target, interfaces and
/// interceptors. Post-processors receive it before the proxy is built.
pub struct ProxyFactory {
    target: Arc<dyn RepositoryTarget>,
    custom_implementation: Option<Arc<dyn RepositoryTarget>>,
    interfaces: Vec<Arc<TypeDescriptor>>,
    interceptors: Vec<Arc<dyn MethodInterceptor>>,
}

impl ProxyFactory {
    pub fn new(target: Arc<dyn RepositoryTarget>) -> Self {
        Self {
            target,
            custom_implementation: None,
            interfaces: Vec::new(),
            interceptors: Vec::new(),
        }
    }

    pub fn target(&self) -> &Arc<dyn RepositoryTarget> {
        &self.target
    }

    pub fn custom_implementation(&self) -> Option<&Arc<dyn RepositoryTarget>> {
        self.custom_implementation.as_ref()
    }

    pub fn set_custom_implementation(&mut self, custom_implementation: Option<Arc<dyn RepositoryTarget>>) {
        self.custom_implementation = custom_implementation;
    }

    /// Add an interface the proxy exposes. Duplicates are ignored.
    pub fn add_interface(&mut self, interface: Arc<TypeDescriptor>) {
        if !self.interfaces.iter().any(|existing| existing.name() == interface.name()) {
            self.interfaces.push(interface);
        }
    }

    pub fn interfaces(&self) -> &[Arc<TypeDescriptor>] {
        &self.interfaces
    }

    /// Append an interceptor; it runs after all previously added ones
    pub fn add_interceptor(&mut self, interceptor: Arc<dyn MethodInterceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn interceptors(&self) -> &[Arc<dyn MethodInterceptor>] {
        &self.interceptors
    }

    /// Build the proxy, resolving the dispatch target of every repository
    /// method up front
    pub fn proxy(self, information: Arc<RepositoryInformation>) -> Result<RepositoryProxy, ConfigurationError> {
        let methods = information.repository_methods();
        let dispatch = build_dispatch(&information, &methods)?;

        let proxy = RepositoryProxy {
            id: Uuid::new_v4(),
            information,
            interfaces: self.interfaces,
            target: self.target,
            custom_implementation: self.custom_implementation,
            interceptors: self.interceptors,
            methods,
            dispatch,
        };

        debug!(
            proxy = %proxy.id,
            repository = proxy.information.repository_interface().name(),
            methods = proxy.methods.len(),
            interceptors = proxy.interceptors.len(),
            "built repository proxy"
        );
        Ok(proxy)
    }
}

fn build_dispatch(
    information: &RepositoryInformation,
    methods: &[Arc<MethodDescriptor>],
) -> Result<HashMap<MethodKey, Dispatch>, ConfigurationError> {
    let custom_methods: Vec<Arc<MethodDescriptor>> = information
        .custom_implementation_class()
        .map(|class| class.public_methods())
        .unwrap_or_default();

    let mut dispatch = HashMap::with_capacity(methods.len());

    for method in methods {
        let entry = if method.is_default() {
            Dispatch::DefaultMethod
        } else {
            let target = information.target_class_method(method)?;
            if *target == **method {
                Dispatch::Unbound
            } else if custom_methods.iter().any(|custom| Arc::ptr_eq(custom, &target)) {
                Dispatch::Custom(target)
            } else {
                Dispatch::Base(target)
            }
        };

        trace!(method = %method, dispatch = ?entry, "resolved dispatch");
        dispatch.insert(method.key(), entry);
    }

    Ok(dispatch)
}

/// A repository instance: the repository interface's methods routed to the
/// custom implementation, the base implementation or default bodies,
/// through an interceptor chain
pub struct RepositoryProxy {
    id: Uuid,
    information: Arc<RepositoryInformation>,
    interfaces: Vec<Arc<TypeDescriptor>>,
    target: Arc<dyn RepositoryTarget>,
    custom_implementation: Option<Arc<dyn RepositoryTarget>>,
    interceptors: Vec<Arc<dyn MethodInterceptor>>,
    methods: Vec<Arc<MethodDescriptor>>,
    dispatch: HashMap<MethodKey, Dispatch>,
}

impl RepositoryProxy {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn information(&self) -> &Arc<RepositoryInformation> {
        &self.information
    }

    pub fn interfaces(&self) -> &[Arc<TypeDescriptor>] {
        &self.interfaces
    }

    /// Whether the proxy exposes `interface_name`, directly or through a
    /// super interface
    pub fn implements(&self, interface_name: &str) -> bool {
        self.interfaces.iter().any(|interface| interface.conforms_to(interface_name))
    }

    pub fn target(&self) -> &Arc<dyn RepositoryTarget> {
        &self.target
    }

    pub fn custom_implementation(&self) -> Option<&Arc<dyn RepositoryTarget>> {
        self.custom_implementation.as_ref()
    }

    pub(crate) fn interceptors(&self) -> &[Arc<dyn MethodInterceptor>] {
        &self.interceptors
    }

    pub fn interceptor_names(&self) -> Vec<&str> {
        self.interceptors.iter().map(|interceptor| interceptor.name()).collect()
    }

    /// Repository methods, most specific declarations first
    pub fn methods(&self) -> &[Arc<MethodDescriptor>] {
        &self.methods
    }

    pub fn dispatch_for(&self, method: &MethodDescriptor) -> Option<&Dispatch> {
        self.dispatch.get(&method.key())
    }

    /// The repository method `call` would pick for `name` and `arity`.
    ///
    /// The most specific declaration wins; two declarations of equal arity
    /// in that same interface make the call ambiguous.
    pub fn find_method(&self, name: &str, arity: usize) -> Result<Arc<MethodDescriptor>, InvocationError> {
        let candidates: Vec<&Arc<MethodDescriptor>> = self
            .methods
            .iter()
            .filter(|method| method.name() == name && method.parameter_count() == arity)
            .collect();

        let Some(first) = candidates.first() else {
            return Err(InvocationError::NoSuchMethod {
                repository: self.repository_name().to_string(),
                method: name.to_string(),
                arity,
            });
        };

        let same_level: Vec<String> = candidates
            .iter()
            .filter(|method| method.declaring_type() == first.declaring_type())
            .map(|method| method.to_string())
            .collect();

        if same_level.len() > 1 {
            return Err(InvocationError::AmbiguousCall {
                repository: self.repository_name().to_string(),
                method: name.to_string(),
                candidates: same_level,
            });
        }

        Ok(Arc::clone(first))
    }

    /// Invoke a repository method through the interceptor chain
    pub fn invoke(&self, method: &Arc<MethodDescriptor>, arguments: Vec<Value>) -> Result<Value, InvocationError> {
        if !self.dispatch.contains_key(&method.key()) {
            return Err(InvocationError::NoSuchMethod {
                repository: self.repository_name().to_string(),
                method: method.to_string(),
                arity: arguments.len(),
            });
        }

        MethodInvocation::new(self, Arc::clone(method), arguments).proceed()
    }

    pub(crate) fn invoke_target(&self, method: &MethodDescriptor, arguments: Vec<Value>) -> Result<Value, InvocationError> {
        match (self.dispatch.get(&method.key()), &self.custom_implementation) {
            (Some(Dispatch::Custom(target)), Some(custom)) => custom.invoke(target, arguments),
            (Some(Dispatch::Base(target)), _) => self.target.invoke(target, arguments),
            _ => Err(InvocationError::Unbound {
                repository: self.repository_name().to_string(),
                method: method.to_string(),
            }),
        }
    }

    fn repository_name(&self) -> &str {
        self.information.repository_interface().name()
    }
}

impl Invoker for RepositoryProxy {
    fn call(&self, method: &str, arguments: Vec<Value>) -> Result<Value, InvocationError> {
        let method = self.find_method(method, arguments.len())?;
        self.invoke(&method, arguments)
    }
}

impl fmt::Debug for RepositoryProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryProxy")
            .field("id", &self.id)
            .field("repository", &self.repository_name())
            .field("interfaces", &self.interfaces.iter().map(|i| i.name()).collect::<Vec<_>>())
            .field("interceptors", &self.interceptor_names())
            .finish()
    }
}
