//! Demo domain: a `User` entity, its repository interface, a custom
//! implementation and a derived query interceptor

use std::sync::Arc;

use serde_json::Value;
use told_adapter::InMemoryCrudRepository;
use told_proxy::{Dispatch, MethodInterceptor, MethodInvocation};
use told_shared::well_known::{self, integer, list, long, serializable, string};
use told_shared::{GenericType, InvocationError, MethodDescriptor, RepositoryTarget, TypeDescriptor};
use tracing::info;

pub fn user() -> Arc<TypeDescriptor> {
    TypeDescriptor::class("User").extends(serializable()).build()
}

fn users(user: &Arc<TypeDescriptor>) -> GenericType {
    GenericType::parameterized(&list(), vec![GenericType::from(user)])
}

/// `UserRepository extends CrudRepository<User, Long>`
pub fn user_repository(user: &Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
    TypeDescriptor::interface("UserRepository")
        .extends(GenericType::parameterized(
            &well_known::crud_repository(),
            vec![GenericType::from(user), GenericType::from(long())],
        ))
        .method(MethodDescriptor::builder("save").parameter(user).returns(user))
        .method(
            MethodDescriptor::builder("findByName")
                .parameter(string())
                .returns(users(user)),
        )
        .method(MethodDescriptor::builder("findActive").returns(users(user)))
        .method(
            MethodDescriptor::builder("countActive")
                .returns(integer())
                .default_body(|repository, _| {
                    let active = repository.call("findActive", Vec::new())?;
                    Ok(Value::from(active.as_array().map_or(0, Vec::len)))
                }),
        )
        .build()
}

/// Repository whose custom method nobody implements
pub fn audit_repository(user: &Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
    TypeDescriptor::interface("AuditRepository")
        .extends(GenericType::parameterized(
            &well_known::repository(),
            vec![GenericType::from(user), GenericType::from(long())],
        ))
        .method(MethodDescriptor::builder("purgeExpired"))
        .build()
}

/// Custom implementation of `UserRepository.findActive()`
pub struct UserRepositoryImpl {
    class: Arc<TypeDescriptor>,
    store: InMemoryCrudRepository,
}

impl UserRepositoryImpl {
    pub fn new(user: &Arc<TypeDescriptor>, store: InMemoryCrudRepository) -> Self {
        let class = TypeDescriptor::class("UserRepositoryImpl")
            .method(MethodDescriptor::builder("findActive").returns(users(user)))
            .build();
        Self { class, store }
    }
}

impl RepositoryTarget for UserRepositoryImpl {
    fn target_class(&self) -> Arc<TypeDescriptor> {
        self.class.clone()
    }

    fn invoke(&self, method: &MethodDescriptor, _arguments: Vec<Value>) -> Result<Value, InvocationError> {
        match method.name() {
            "findActive" => {
                let active = self
                    .store
                    .find_all()?
                    .into_iter()
                    .filter(|user| user.get("active") == Some(&Value::Bool(true)))
                    .collect();
                Ok(Value::Array(active))
            }
            other => Err(InvocationError::Target {
                target: self.class.name().to_string(),
                method: other.to_string(),
                message: "unsupported operation".to_string(),
            }),
        }
    }
}

/// Answers unbound `findBy<Property>(value)` methods by filtering the store
pub struct DerivedQueryInterceptor {
    store: InMemoryCrudRepository,
}

impl DerivedQueryInterceptor {
    pub fn new(store: InMemoryCrudRepository) -> Self {
        Self { store }
    }
}

fn property_name(suffix: &str) -> String {
    let mut chars = suffix.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl MethodInterceptor for DerivedQueryInterceptor {
    fn name(&self) -> &str {
        "derived-query"
    }

    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> Result<Value, InvocationError> {
        let unbound = matches!(invocation.proxy().dispatch_for(invocation.method()), Some(Dispatch::Unbound));
        let property = invocation
            .method()
            .name()
            .strip_prefix("findBy")
            .map(property_name)
            .filter(|property| !property.is_empty());

        let (true, Some(property)) = (unbound, property) else {
            return invocation.proceed();
        };

        let expected = invocation.arguments().first().cloned().unwrap_or(Value::Null);
        info!("Executing derived query on '{}' = {}", property, expected);

        let matches = self
            .store
            .find_all()?
            .into_iter()
            .filter(|entity| entity.get(&property) == Some(&expected))
            .collect();
        Ok(Value::Array(matches))
    }
}
