//! Invocation contracts between repository proxies and their backing objects

use std::sync::Arc;

use serde_json::Value;

use crate::error::InvocationError;
use crate::types::{MethodDescriptor, TypeDescriptor};

/// Something repository methods can be called on by name.
///
/// Default interface method bodies receive the proxy through this trait so
/// they can call back into the repository.
pub trait Invoker: Send + Sync {
    fn call(&self, method: &str, arguments: Vec<Value>) -> Result<Value, InvocationError>;
}

/// A backing object a proxy dispatches to: the base implementation or a
/// custom implementation.
pub trait RepositoryTarget: Send + Sync {
    /// Runtime type of this object
    fn target_class(&self) -> Arc<TypeDescriptor>;

    /// Execute `method`, one of this object's own methods
    fn invoke(&self, method: &MethodDescriptor, arguments: Vec<Value>) -> Result<Value, InvocationError>;
}
