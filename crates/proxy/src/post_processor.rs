//! Hook to customize repository proxies before they are built

use told_resolver::RepositoryInformation;

use crate::proxy::ProxyFactory;

/// Customizes the [`ProxyFactory`] of every repository a factory creates,
/// typically by adding interfaces or interceptors.
///
/// Post-processors run in registration order, after the invocation exposing
/// interceptor is in place and before default method handling is appended.
pub trait RepositoryProxyPostProcessor: Send + Sync {
    fn post_process(&self, factory: &mut ProxyFactory, information: &RepositoryInformation);
}

impl<F> RepositoryProxyPostProcessor for F
where
    F: Fn(&mut ProxyFactory, &RepositoryInformation) + Send + Sync,
{
    fn post_process(&self, factory: &mut ProxyFactory, information: &RepositoryInformation) {
        self(factory, information)
    }
}
