//! Method interceptors around repository proxy invocations
//!
//! A proxy runs its interceptors in registration order. Each one either
//! answers the call itself or hands it on with [`MethodInvocation::proceed`];
//! past the last interceptor the call reaches the dispatch table.

use std::cell::RefCell;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use told_shared::{InvocationError, MethodDescriptor};
use tracing::{debug_span, trace};
use uuid::Uuid;

use crate::proxy::RepositoryProxy;

/// Hook around every method invoked through a repository proxy
pub trait MethodInterceptor: Send + Sync {
    /// Short name, used in logs and diagnostics
    fn name(&self) -> &str;

    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> Result<Value, InvocationError>;
}

/// A call in flight through a proxy's interceptor chain
pub struct MethodInvocation<'a> {
    proxy: &'a RepositoryProxy,
    method: Arc<MethodDescriptor>,
    arguments: Vec<Value>,
    position: usize,
}

impl<'a> MethodInvocation<'a> {
    pub(crate) fn new(proxy: &'a RepositoryProxy, method: Arc<MethodDescriptor>, arguments: Vec<Value>) -> Self {
        Self {
            proxy,
            method,
            arguments,
            position: 0,
        }
    }

    pub fn proxy(&self) -> &'a RepositoryProxy {
        self.proxy
    }

    /// The repository interface method being called
    pub fn method(&self) -> &Arc<MethodDescriptor> {
        &self.method
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn arguments_mut(&mut self) -> &mut Vec<Value> {
        &mut self.arguments
    }

    /// Continue with the next interceptor, or dispatch to the target once
    /// the chain is exhausted
    pub fn proceed(&mut self) -> Result<Value, InvocationError> {
        match self.proxy.interceptors().get(self.position).cloned() {
            Some(interceptor) => {
                self.position += 1;
                trace!(interceptor = interceptor.name(), method = %self.method, "entering interceptor");
                let result = interceptor.invoke(self);
                self.position -= 1;
                result
            }
            None => self.proxy.invoke_target(&self.method, self.arguments.clone()),
        }
    }
}

/// Snapshot of the invocation currently running on this thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub proxy_id: Uuid,
    pub repository: String,
    pub method: String,
    pub started_at: DateTime<Utc>,
}

thread_local! {
    static CURRENT_INVOCATIONS: RefCell<Vec<InvocationContext>> = const { RefCell::new(Vec::new()) };
}

/// The innermost repository invocation running on the current thread, if any
pub fn current_invocation() -> Option<InvocationContext> {
    CURRENT_INVOCATIONS.with(|stack| stack.borrow().last().cloned())
}

struct ExposedInvocation;

impl ExposedInvocation {
    fn push(context: InvocationContext) -> Self {
        CURRENT_INVOCATIONS.with(|stack| stack.borrow_mut().push(context));
        Self
    }
}

impl Drop for ExposedInvocation {
    fn drop(&mut self) {
        CURRENT_INVOCATIONS.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Publishes the running invocation through [`current_invocation`] for the
/// rest of the chain and the target. Always installed first.
#[derive(Debug, Default)]
pub struct ExposeInvocationInterceptor;

impl MethodInterceptor for ExposeInvocationInterceptor {
    fn name(&self) -> &str {
        "expose-invocation"
    }

    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> Result<Value, InvocationError> {
        let proxy = invocation.proxy();
        let repository = proxy.information().repository_interface().name().to_string();
        let method = invocation.method().name().to_string();

        let span = debug_span!("repository_invocation", proxy = %proxy.id(), %repository, %method);
        let _entered = span.enter();

        let _exposed = ExposedInvocation::push(InvocationContext {
            proxy_id: proxy.id(),
            repository,
            method,
            started_at: Utc::now(),
        });

        invocation.proceed()
    }
}

/// Runs default interface method bodies against the proxy itself instead of
/// dispatching them. Always installed last.
#[derive(Debug, Default)]
pub struct DefaultMethodInvokingInterceptor;

impl MethodInterceptor for DefaultMethodInvokingInterceptor {
    fn name(&self) -> &str {
        "default-method"
    }

    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> Result<Value, InvocationError> {
        match invocation.method().default_body().cloned() {
            Some(body) => {
                trace!(method = %invocation.method(), "invoking default method body");
                body(invocation.proxy(), invocation.arguments())
            }
            None => invocation.proceed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, RecordingTarget};
    use crate::proxy::ProxyFactory;
    use serde_json::json;
    use std::sync::Mutex;
    use told_resolver::{RepositoryInformation, RepositoryMetadata};
    use told_shared::{Invoker, RepositoryTarget, TypeDescriptor};

    /// Remembers the invocation exposed while it runs
    struct ObservingTarget {
        class: Arc<TypeDescriptor>,
        seen: Mutex<Option<InvocationContext>>,
    }

    impl RepositoryTarget for ObservingTarget {
        fn target_class(&self) -> Arc<TypeDescriptor> {
            self.class.clone()
        }

        fn invoke(&self, _method: &MethodDescriptor, _arguments: Vec<Value>) -> Result<Value, InvocationError> {
            *self.seen.lock().unwrap() = current_invocation();
            Ok(Value::Null)
        }
    }

    struct Uppercase;

    impl MethodInterceptor for Uppercase {
        fn name(&self) -> &str {
            "uppercase"
        }

        fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> Result<Value, InvocationError> {
            for argument in invocation.arguments_mut() {
                if let Some(text) = argument.as_str() {
                    *argument = json!(text.to_uppercase());
                }
            }
            invocation.proceed()
        }
    }

    fn information() -> Arc<RepositoryInformation> {
        let metadata = RepositoryMetadata::resolve(&fixtures::account_repository()).unwrap();
        Arc::new(RepositoryInformation::new(
            Arc::new(metadata),
            fixtures::simple_crud_repository(),
            None,
        ))
    }

    #[test]
    fn test_invocation_is_exposed_while_running() {
        let target = Arc::new(ObservingTarget {
            class: fixtures::simple_crud_repository(),
            seen: Mutex::new(None),
        });

        let mut factory = ProxyFactory::new(target.clone());
        factory.add_interceptor(Arc::new(ExposeInvocationInterceptor));
        let proxy = factory.proxy(information()).unwrap();

        assert!(current_invocation().is_none());
        proxy.call("count", Vec::new()).unwrap();
        assert!(current_invocation().is_none());

        let seen = target.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.proxy_id, proxy.id());
        assert_eq!(seen.repository, "AccountRepository");
        assert_eq!(seen.method, "count");
    }

    #[test]
    fn test_nothing_exposed_without_interceptor() {
        let target = Arc::new(ObservingTarget {
            class: fixtures::simple_crud_repository(),
            seen: Mutex::new(None),
        });

        let proxy = ProxyFactory::new(target.clone()).proxy(information()).unwrap();
        proxy.call("count", Vec::new()).unwrap();

        assert!(target.seen.lock().unwrap().is_none());
    }

    #[test]
    fn test_interceptors_can_rewrite_arguments() {
        let target = RecordingTarget::new(fixtures::simple_crud_repository());

        let mut factory = ProxyFactory::new(target.clone());
        factory.add_interceptor(Arc::new(ExposeInvocationInterceptor));
        factory.add_interceptor(Arc::new(Uppercase));
        factory.add_interceptor(Arc::new(DefaultMethodInvokingInterceptor));
        let proxy = factory.proxy(information()).unwrap();

        let result = proxy.call("deleteById", vec![json!("abc")]).unwrap();
        assert_eq!(result["arguments"][0], "ABC");
        assert_eq!(target.calls(), vec!["deleteById".to_string()]);
    }

    #[test]
    fn test_errors_unwind_exposed_invocation() {
        let target = RecordingTarget::new(fixtures::simple_crud_repository());

        let mut factory = ProxyFactory::new(target);
        factory.add_interceptor(Arc::new(ExposeInvocationInterceptor));
        let proxy = factory.proxy(information()).unwrap();

        let err = proxy.call("findByOwner", vec![json!("alice")]).unwrap_err();
        assert!(matches!(err, InvocationError::Unbound { .. }));
        assert!(current_invocation().is_none());
    }
}
