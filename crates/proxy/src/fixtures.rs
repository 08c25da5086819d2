//! Test fixtures: a `UserRepository` with base, custom, query and default
//! methods, plus recording targets and a backend

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use told_resolver::{RepositoryInformation, RepositoryMetadata};
use told_shared::well_known::{self, boolean, iterable, list, long, optional, serializable, string};
use told_shared::{
    ConfigurationError, GenericType, InvocationError, MethodDescriptor, RepositoryTarget, TypeDescriptor,
    TypeVariable,
};

use crate::factory::RepositoryBackend;

pub fn user() -> Arc<TypeDescriptor> {
    TypeDescriptor::class("User").extends(serializable()).build()
}

fn list_of(ty: &Arc<TypeDescriptor>) -> GenericType {
    GenericType::parameterized(&list(), vec![GenericType::from(ty)])
}

/// `UserRepository extends CrudRepository<User, Long>` with a redeclared
/// base method, a derived query, a declared query, a custom method and a
/// default method
pub fn user_repository() -> Arc<TypeDescriptor> {
    let user = user();

    TypeDescriptor::interface("UserRepository")
        .extends(GenericType::parameterized(
            &well_known::crud_repository(),
            vec![GenericType::from(&user), GenericType::from(long())],
        ))
        .method(MethodDescriptor::builder("save").parameter(&user).returns(&user))
        .method(
            MethodDescriptor::builder("findByName")
                .parameter(string())
                .returns(list_of(&user)),
        )
        .method(
            MethodDescriptor::builder("vipUsers")
                .query("select u from User u where u.vip = true")
                .returns(list_of(&user)),
        )
        .method(MethodDescriptor::builder("findActive").returns(list_of(&user)))
        .method(
            MethodDescriptor::builder("activeSummary")
                .returns(string())
                .default_body(|repository, _| {
                    let active = repository.call("findActive", Vec::new())?;
                    Ok(json!({ "summary": active }))
                }),
        )
        .build()
}

/// Repository without custom methods
pub fn account_repository() -> Arc<TypeDescriptor> {
    let account = TypeDescriptor::class("Account").build();

    TypeDescriptor::interface("AccountRepository")
        .extends(GenericType::parameterized(
            &well_known::crud_repository(),
            vec![GenericType::from(&account), GenericType::from(long())],
        ))
        .method(MethodDescriptor::builder("findByOwner").parameter(string()))
        .build()
}

/// `SimpleCrudRepository<T, ID> implements CrudRepository<T, ID>`
pub fn simple_crud_repository() -> Arc<TypeDescriptor> {
    let t = TypeVariable::new("T");
    let id = TypeVariable::new("ID");
    let s = TypeVariable::bounded("S", &t);
    let iterable_of = |v: &TypeVariable| GenericType::parameterized(&iterable(), vec![v.into()]);

    TypeDescriptor::class("SimpleCrudRepository")
        .type_parameter(t.clone())
        .type_parameter(id.clone())
        .extends(GenericType::parameterized(
            &well_known::crud_repository(),
            vec![(&t).into(), (&id).into()],
        ))
        .method(MethodDescriptor::builder("save").parameter(&s).returns(&s))
        .method(
            MethodDescriptor::builder("saveAll")
                .parameter(iterable_of(&s))
                .returns(iterable_of(&s)),
        )
        .method(
            MethodDescriptor::builder("findById")
                .parameter(&id)
                .returns(GenericType::parameterized(&optional(), vec![(&t).into()])),
        )
        .method(MethodDescriptor::builder("existsById").parameter(&id).returns(boolean()))
        .method(MethodDescriptor::builder("findAll").returns(iterable_of(&t)))
        .method(MethodDescriptor::builder("count").returns(long()))
        .method(MethodDescriptor::builder("deleteById").parameter(&id))
        .method(MethodDescriptor::builder("delete").parameter(&t))
        .method(MethodDescriptor::builder("deleteAll"))
        .build()
}

/// Custom implementation class providing `findActive()`
pub fn user_repository_impl() -> Arc<TypeDescriptor> {
    TypeDescriptor::class("UserRepositoryImpl")
        .method(MethodDescriptor::builder("findActive").returns(list_of(&user())))
        .build()
}

/// Target answering every call with its class and method name
pub struct RecordingTarget {
    class: Arc<TypeDescriptor>,
    calls: Mutex<Vec<String>>,
}

impl RecordingTarget {
    pub fn new(class: Arc<TypeDescriptor>) -> Arc<Self> {
        Arc::new(Self {
            class,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl RepositoryTarget for RecordingTarget {
    fn target_class(&self) -> Arc<TypeDescriptor> {
        self.class.clone()
    }

    fn invoke(&self, method: &MethodDescriptor, arguments: Vec<Value>) -> Result<Value, InvocationError> {
        self.calls.lock().unwrap().push(method.name().to_string());
        Ok(json!({
            "target": self.class.name(),
            "method": method.name(),
            "arguments": arguments,
        }))
    }
}

/// Backend handing out `SimpleCrudRepository` recording targets
#[derive(Default)]
pub struct TestBackend {
    pub reject: Option<String>,
}

impl RepositoryBackend for TestBackend {
    fn repository_base_class(&self, _metadata: &RepositoryMetadata) -> Arc<TypeDescriptor> {
        simple_crud_repository()
    }

    fn target_repository(
        &self,
        information: &RepositoryInformation,
    ) -> Result<Arc<dyn RepositoryTarget>, ConfigurationError> {
        Ok(RecordingTarget::new(information.repository_base_class().clone()))
    }

    fn validate(&self, _information: &RepositoryInformation) -> Result<(), ConfigurationError> {
        match &self.reject {
            Some(reason) => Err(ConfigurationError::Invalid(reason.clone())),
            None => Ok(()),
        }
    }
}
