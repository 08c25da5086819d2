//! Base repository implementation
//!
//! `SimpleCrudRepository<T, ID>` implements the `CrudRepository<T, ID>`
//! contract for any domain type. Its methods are what repository proxies
//! dispatch base class methods to.

use std::sync::Arc;

use once_cell::sync::Lazy;
use told_shared::well_known::{self, boolean, iterable, long, optional};
use told_shared::{GenericType, MethodDescriptor, TypeDescriptor, TypeVariable};

pub mod in_memory;

static SIMPLE_CRUD_REPOSITORY: Lazy<Arc<TypeDescriptor>> = Lazy::new(|| {
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
});

/// `SimpleCrudRepository<T, ID> implements CrudRepository<T, ID>`
pub fn simple_crud_repository() -> Arc<TypeDescriptor> {
    SIMPLE_CRUD_REPOSITORY.clone()
}
