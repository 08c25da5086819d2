//! Well-known framework types
//!
//! The root object type, the value types repositories commonly use as ids,
//! the wrapper shapes query methods return, and the repository contracts.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::types::{GenericType, MethodDescriptor, TypeDescriptor, TypeVariable};

pub const OBJECT: &str = "Object";
pub const VOID: &str = "void";
pub const ITERABLE: &str = "Iterable";
pub const REPOSITORY: &str = "Repository";
pub const CRUD_REPOSITORY: &str = "CrudRepository";
pub const TRANSACTIONAL_PROXY: &str = "TransactionalProxy";

static OBJECT_TYPE: Lazy<Arc<TypeDescriptor>> = Lazy::new(|| TypeDescriptor::class(OBJECT).build());

static VOID_TYPE: Lazy<Arc<TypeDescriptor>> = Lazy::new(|| TypeDescriptor::primitive(VOID));

static SERIALIZABLE_TYPE: Lazy<Arc<TypeDescriptor>> =
    Lazy::new(|| TypeDescriptor::interface("Serializable").build());

static NUMBER_TYPE: Lazy<Arc<TypeDescriptor>> =
    Lazy::new(|| TypeDescriptor::class("Number").extends(serializable()).build());

static LONG_TYPE: Lazy<Arc<TypeDescriptor>> =
    Lazy::new(|| TypeDescriptor::class("Long").extends(number()).build());

static INTEGER_TYPE: Lazy<Arc<TypeDescriptor>> =
    Lazy::new(|| TypeDescriptor::class("Integer").extends(number()).build());

static BOOLEAN_TYPE: Lazy<Arc<TypeDescriptor>> =
    Lazy::new(|| TypeDescriptor::class("Boolean").extends(serializable()).build());

static STRING_TYPE: Lazy<Arc<TypeDescriptor>> =
    Lazy::new(|| TypeDescriptor::class("String").extends(serializable()).build());

static ITERABLE_TYPE: Lazy<Arc<TypeDescriptor>> = Lazy::new(|| {
    TypeDescriptor::interface(ITERABLE)
        .type_parameter(TypeVariable::new("T"))
        .wrapper()
        .build()
});

static COLLECTION_TYPE: Lazy<Arc<TypeDescriptor>> = Lazy::new(|| {
    let e = TypeVariable::new("E");
    TypeDescriptor::interface("Collection")
        .type_parameter(e.clone())
        .extends(GenericType::parameterized(&iterable(), vec![e.into()]))
        .build()
});

static LIST_TYPE: Lazy<Arc<TypeDescriptor>> = Lazy::new(|| {
    let e = TypeVariable::new("E");
    TypeDescriptor::interface("List")
        .type_parameter(e.clone())
        .extends(GenericType::parameterized(&collection(), vec![e.into()]))
        .build()
});

static SET_TYPE: Lazy<Arc<TypeDescriptor>> = Lazy::new(|| {
    let e = TypeVariable::new("E");
    TypeDescriptor::interface("Set")
        .type_parameter(e.clone())
        .extends(GenericType::parameterized(&collection(), vec![e.into()]))
        .build()
});

static OPTIONAL_TYPE: Lazy<Arc<TypeDescriptor>> = Lazy::new(|| {
    TypeDescriptor::class("Optional")
        .type_parameter(TypeVariable::new("T"))
        .wrapper()
        .build()
});

static FUTURE_TYPE: Lazy<Arc<TypeDescriptor>> = Lazy::new(|| {
    TypeDescriptor::interface("Future")
        .type_parameter(TypeVariable::new("V"))
        .wrapper()
        .build()
});

static COMPLETABLE_FUTURE_TYPE: Lazy<Arc<TypeDescriptor>> = Lazy::new(|| {
    let t = TypeVariable::new("T");
    TypeDescriptor::class("CompletableFuture")
        .type_parameter(t.clone())
        .extends(GenericType::parameterized(&future(), vec![t.into()]))
        .build()
});

static STREAM_TYPE: Lazy<Arc<TypeDescriptor>> = Lazy::new(|| {
    TypeDescriptor::interface("Stream")
        .type_parameter(TypeVariable::new("T"))
        .wrapper()
        .build()
});

static REPOSITORY_TYPE: Lazy<Arc<TypeDescriptor>> = Lazy::new(|| {
    TypeDescriptor::interface(REPOSITORY)
        .type_parameter(TypeVariable::new("T"))
        .type_parameter(TypeVariable::new("ID"))
        .build()
});

static CRUD_REPOSITORY_TYPE: Lazy<Arc<TypeDescriptor>> = Lazy::new(|| {
    let t = TypeVariable::new("T");
    let id = TypeVariable::new("ID");
    let s = TypeVariable::bounded("S", &t);
    let iterable_of = |v: &TypeVariable| GenericType::parameterized(&iterable(), vec![v.into()]);

    TypeDescriptor::interface(CRUD_REPOSITORY)
        .type_parameter(t.clone())
        .type_parameter(id.clone())
        .extends(GenericType::parameterized(
            &repository(),
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
        .method(
            MethodDescriptor::builder("existsById")
                .parameter(&id)
                .returns(boolean()),
        )
        .method(MethodDescriptor::builder("findAll").returns(iterable_of(&t)))
        .method(MethodDescriptor::builder("count").returns(long()))
        .method(MethodDescriptor::builder("deleteById").parameter(&id))
        .method(MethodDescriptor::builder("delete").parameter(&t))
        .method(MethodDescriptor::builder("deleteAll"))
        .build()
});

static TRANSACTIONAL_PROXY_TYPE: Lazy<Arc<TypeDescriptor>> =
    Lazy::new(|| TypeDescriptor::interface(TRANSACTIONAL_PROXY).build());

pub fn object() -> Arc<TypeDescriptor> {
    OBJECT_TYPE.clone()
}

pub fn void() -> Arc<TypeDescriptor> {
    VOID_TYPE.clone()
}

pub fn serializable() -> Arc<TypeDescriptor> {
    SERIALIZABLE_TYPE.clone()
}

pub fn number() -> Arc<TypeDescriptor> {
    NUMBER_TYPE.clone()
}

pub fn long() -> Arc<TypeDescriptor> {
    LONG_TYPE.clone()
}

pub fn integer() -> Arc<TypeDescriptor> {
    INTEGER_TYPE.clone()
}

pub fn boolean() -> Arc<TypeDescriptor> {
    BOOLEAN_TYPE.clone()
}

pub fn string() -> Arc<TypeDescriptor> {
    STRING_TYPE.clone()
}

pub fn iterable() -> Arc<TypeDescriptor> {
    ITERABLE_TYPE.clone()
}

pub fn collection() -> Arc<TypeDescriptor> {
    COLLECTION_TYPE.clone()
}

pub fn list() -> Arc<TypeDescriptor> {
    LIST_TYPE.clone()
}

pub fn set() -> Arc<TypeDescriptor> {
    SET_TYPE.clone()
}

pub fn optional() -> Arc<TypeDescriptor> {
    OPTIONAL_TYPE.clone()
}

pub fn future() -> Arc<TypeDescriptor> {
    FUTURE_TYPE.clone()
}

pub fn completable_future() -> Arc<TypeDescriptor> {
    COMPLETABLE_FUTURE_TYPE.clone()
}

pub fn stream() -> Arc<TypeDescriptor> {
    STREAM_TYPE.clone()
}

/// The base repository marker, `Repository<T, ID>`
pub fn repository() -> Arc<TypeDescriptor> {
    REPOSITORY_TYPE.clone()
}

/// `CrudRepository<T, ID> extends Repository<T, ID>`
pub fn crud_repository() -> Arc<TypeDescriptor> {
    CRUD_REPOSITORY_TYPE.clone()
}

pub fn transactional_proxy() -> Arc<TypeDescriptor> {
    TRANSACTIONAL_PROXY_TYPE.clone()
}

/// Name of the marker's domain type variable
pub fn domain_type_variable() -> &'static str {
    REPOSITORY_TYPE.type_parameters()[0].name.as_str()
}

/// Name of the marker's id type variable
pub fn id_type_variable() -> &'static str {
    REPOSITORY_TYPE.type_parameters()[1].name.as_str()
}

pub fn all() -> Vec<Arc<TypeDescriptor>> {
    vec![
        object(),
        void(),
        serializable(),
        number(),
        long(),
        integer(),
        boolean(),
        string(),
        iterable(),
        collection(),
        list(),
        set(),
        optional(),
        future(),
        completable_future(),
        stream(),
        repository(),
        crud_repository(),
        transactional_proxy(),
    ]
}
