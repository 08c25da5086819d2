//! # Told Proxy
//!
//! Turns repository interfaces into callable repository instances.
//!
//! ## Components
//!
//! - `RepositoryFactorySupport` - validates repositories and assembles proxies
//! - `RepositoryBackend` - store-specific base class and target object
//! - `RepositoryProxy` - dispatch table plus interceptor chain
//! - `RepositoryProxyPostProcessor` - customization hook for proxy factories
//! - `QueryMethodDetector` - recognizes methods left to query execution

pub mod factory;
pub mod interceptor;
pub mod post_processor;
pub mod proxy;
pub mod query;

#[cfg(test)]
pub(crate) mod fixtures;

pub use factory::{RepositoryBackend, RepositoryFactorySupport};
pub use interceptor::{
    current_invocation, DefaultMethodInvokingInterceptor, ExposeInvocationInterceptor, InvocationContext,
    MethodInterceptor, MethodInvocation,
};
pub use post_processor::RepositoryProxyPostProcessor;
pub use proxy::{Dispatch, ProxyFactory, RepositoryProxy};
pub use query::QueryMethodDetector;
