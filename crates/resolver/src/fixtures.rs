//! Shared test fixtures: a `User` entity, a `UserRepository`, a generic base
//! class and a custom implementation class

use std::sync::Arc;

use told_shared::well_known::{self, boolean, iterable, list, long, optional, serializable, string};
use told_shared::{GenericType, MethodDescriptor, TypeDescriptor, TypeVariable, Visibility};

pub fn user() -> Arc<TypeDescriptor> {
    TypeDescriptor::class("User").extends(serializable()).build()
}

fn list_of(ty: &Arc<TypeDescriptor>) -> GenericType {
    GenericType::parameterized(&list(), vec![GenericType::from(ty)])
}

/// `UserRepository extends CrudRepository<User, Long>`
pub fn user_repository() -> Arc<TypeDescriptor> {
    let user = user();

    TypeDescriptor::interface("UserRepository")
        .extends(GenericType::parameterized(
            &well_known::crud_repository(),
            vec![GenericType::from(&user), GenericType::from(long())],
        ))
        .method(MethodDescriptor::builder("save").parameter(&user).returns(&user))
        .method(
            MethodDescriptor::builder("findById")
                .parameter(long())
                .returns(GenericType::parameterized(&optional(), vec![GenericType::from(&user)])),
        )
        .method(
            MethodDescriptor::builder("findByName")
                .parameter(string())
                .returns(list_of(&user)),
        )
        .method(MethodDescriptor::builder("findActive").returns(list_of(&user)))
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
        .method(
            MethodDescriptor::builder("findActive")
                .visibility(Visibility::Private)
                .returns(list_of(&user())),
        )
        .build()
}

/// `class <name> extends SimpleCrudRepository<User, Long>` overriding
/// `save` and `findById` with concrete types
pub fn concrete_user_base(name: &str) -> Arc<TypeDescriptor> {
    let user = user();

    TypeDescriptor::class(name)
        .extends(GenericType::parameterized(
            &simple_crud_repository(),
            vec![GenericType::from(&user), GenericType::from(long())],
        ))
        .method(MethodDescriptor::builder("save").parameter(&user).returns(&user))
        .method(
            MethodDescriptor::builder("findById")
                .parameter(long())
                .returns(GenericType::parameterized(&optional(), vec![GenericType::from(&user)])),
        )
        .method(MethodDescriptor::builder("findActive").returns(list_of(&user)))
        .build()
}

/// Custom implementation class providing `findActive()`
pub fn user_repository_impl() -> Arc<TypeDescriptor> {
    TypeDescriptor::class("UserRepositoryImpl")
        .method(MethodDescriptor::builder("findActive").returns(list_of(&user())))
        .build()
}

/// Method `name` of `ty`, declared or inherited
pub fn method(ty: &Arc<TypeDescriptor>, name: &str) -> Arc<MethodDescriptor> {
    ty.methods()
        .into_iter()
        .find(|m| m.name() == name)
        .unwrap_or_else(|| panic!("{} has no method {}", ty.name(), name))
}

/// Method `name` declared directly on `ty`
pub fn declared(ty: &Arc<TypeDescriptor>, name: &str) -> Arc<MethodDescriptor> {
    ty.declared_methods()
        .iter()
        .find(|m| m.name() == name)
        .cloned()
        .unwrap_or_else(|| panic!("{} declares no method {}", ty.name(), name))
}
