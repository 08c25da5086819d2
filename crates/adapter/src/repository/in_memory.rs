//! In-Memory Repository Implementation
//!
//! Stores entities as JSON objects keyed by their id property.
//! Useful for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use told_shared::{InvocationError, MethodDescriptor, RepositoryTarget, TypeDescriptor};
use tracing::trace;

use super::simple_crud_repository;

/// In-memory `SimpleCrudRepository`
///
/// Thread-safe implementation using RwLock. Clones share the same store.
#[derive(Debug, Clone)]
pub struct InMemoryCrudRepository {
    id_property: String,
    entities: Arc<RwLock<HashMap<String, Value>>>,
}

impl InMemoryCrudRepository {
    pub fn new(id_property: impl Into<String>) -> Self {
        Self {
            id_property: id_property.into(),
            entities: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn id_property(&self) -> &str {
        &self.id_property
    }

    fn read(&self, method: &str) -> Result<RwLockReadGuard<'_, HashMap<String, Value>>, InvocationError> {
        self.entities.read().map_err(|_| InvocationError::Target {
            target: self.name(),
            method: method.to_string(),
            message: "Failed to acquire read lock".to_string(),
        })
    }

    fn write(&self, method: &str) -> Result<RwLockWriteGuard<'_, HashMap<String, Value>>, InvocationError> {
        self.entities.write().map_err(|_| InvocationError::Target {
            target: self.name(),
            method: method.to_string(),
            message: "Failed to acquire write lock".to_string(),
        })
    }

    fn name(&self) -> String {
        simple_crud_repository().name().to_string()
    }

    fn entity_id(&self, method: &str, entity: &Value) -> Result<String, InvocationError> {
        entity
            .get(&self.id_property)
            .and_then(id_key)
            .ok_or_else(|| InvocationError::InvalidArgument {
                method: method.to_string(),
                index: 0,
                message: format!("entity has no usable '{}' property", self.id_property),
            })
    }

    pub fn save(&self, entity: Value) -> Result<Value, InvocationError> {
        let id = self.entity_id("save", &entity)?;
        self.write("save")?.insert(id, entity.clone());
        Ok(entity)
    }

    pub fn save_all(&self, entities: Vec<Value>) -> Result<Vec<Value>, InvocationError> {
        let keyed = entities
            .iter()
            .map(|entity| self.entity_id("saveAll", entity))
            .collect::<Result<Vec<_>, _>>()?;

        let mut store = self.write("saveAll")?;
        for (id, entity) in keyed.into_iter().zip(&entities) {
            store.insert(id, entity.clone());
        }
        Ok(entities)
    }

    pub fn find_by_id(&self, id: &Value) -> Result<Option<Value>, InvocationError> {
        let Some(key) = id_key(id) else {
            return Ok(None);
        };
        Ok(self.read("findById")?.get(&key).cloned())
    }

    pub fn exists_by_id(&self, id: &Value) -> Result<bool, InvocationError> {
        Ok(self.find_by_id(id)?.is_some())
    }

    pub fn find_all(&self) -> Result<Vec<Value>, InvocationError> {
        Ok(self.read("findAll")?.values().cloned().collect())
    }

    pub fn count(&self) -> Result<usize, InvocationError> {
        Ok(self.read("count")?.len())
    }

    pub fn delete_by_id(&self, id: &Value) -> Result<(), InvocationError> {
        if let Some(key) = id_key(id) {
            self.write("deleteById")?.remove(&key);
        }
        Ok(())
    }

    pub fn delete(&self, entity: &Value) -> Result<(), InvocationError> {
        let id = self.entity_id("delete", entity)?;
        self.write("delete")?.remove(&id);
        Ok(())
    }

    pub fn delete_all(&self) -> Result<(), InvocationError> {
        self.write("deleteAll")?.clear();
        Ok(())
    }
}

impl Default for InMemoryCrudRepository {
    fn default() -> Self {
        Self::new("id")
    }
}

/// Store key of an id value. Strings and numbers qualify and never share
/// a key, so `1` and `"1"` are different ids.
fn id_key(id: &Value) -> Option<String> {
    match id {
        Value::String(s) => Some(format!("s:{}", s)),
        Value::Number(n) => Some(format!("n:{}", n)),
        _ => None,
    }
}

fn argument<'a>(method: &MethodDescriptor, arguments: &'a [Value], index: usize) -> Result<&'a Value, InvocationError> {
    arguments.get(index).ok_or_else(|| InvocationError::InvalidArgument {
        method: method.to_string(),
        index,
        message: "missing argument".to_string(),
    })
}

impl RepositoryTarget for InMemoryCrudRepository {
    fn target_class(&self) -> Arc<TypeDescriptor> {
        simple_crud_repository()
    }

    fn invoke(&self, method: &MethodDescriptor, arguments: Vec<Value>) -> Result<Value, InvocationError> {
        trace!(method = %method, "in-memory repository call");

        match method.name() {
            "save" => self.save(argument(method, &arguments, 0)?.clone()),
            "saveAll" => {
                let entities = match argument(method, &arguments, 0)? {
                    Value::Array(entities) => entities.clone(),
                    _ => {
                        return Err(InvocationError::InvalidArgument {
                            method: method.to_string(),
                            index: 0,
                            message: "expected an array of entities".to_string(),
                        })
                    }
                };
                Ok(Value::Array(self.save_all(entities)?))
            }
            "findById" => Ok(self.find_by_id(argument(method, &arguments, 0)?)?.unwrap_or(Value::Null)),
            "existsById" => Ok(Value::Bool(self.exists_by_id(argument(method, &arguments, 0)?)?)),
            "findAll" => Ok(Value::Array(self.find_all()?)),
            "count" => Ok(Value::from(self.count()?)),
            "deleteById" => self.delete_by_id(argument(method, &arguments, 0)?).map(|_| Value::Null),
            "delete" => self.delete(argument(method, &arguments, 0)?).map(|_| Value::Null),
            "deleteAll" => self.delete_all().map(|_| Value::Null),
            other => Err(InvocationError::Target {
                target: self.name(),
                method: other.to_string(),
                message: "unsupported operation".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn method(name: &str) -> Arc<MethodDescriptor> {
        simple_crud_repository()
            .declared_methods()
            .iter()
            .find(|m| m.name() == name)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_crud_operations() {
        let repo = InMemoryCrudRepository::default();

        repo.save(json!({ "id": 1, "name": "alice" })).unwrap();
        repo.save(json!({ "id": "u-2", "name": "bob" })).unwrap();

        assert_eq!(repo.count().unwrap(), 2);
        assert_eq!(repo.find_by_id(&json!(1)).unwrap().unwrap()["name"], "alice");
        assert!(repo.exists_by_id(&json!("u-2")).unwrap());
        assert!(repo.find_by_id(&json!(3)).unwrap().is_none());

        repo.delete_by_id(&json!(1)).unwrap();
        assert_eq!(repo.count().unwrap(), 1);

        repo.delete(&json!({ "id": "u-2" })).unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_save_replaces_existing_entity() {
        let repo = InMemoryCrudRepository::default();

        repo.save(json!({ "id": 1, "name": "alice" })).unwrap();
        repo.save(json!({ "id": 1, "name": "alicia" })).unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.find_by_id(&json!(1)).unwrap().unwrap()["name"], "alicia");
    }

    #[test]
    fn test_entities_need_an_id() {
        let repo = InMemoryCrudRepository::new("email");

        let err = repo.save(json!({ "id": 1 })).unwrap_err();
        assert!(matches!(err, InvocationError::InvalidArgument { index: 0, .. }));

        repo.save(json!({ "email": "a@example.com" })).unwrap();
        assert!(repo.exists_by_id(&json!("a@example.com")).unwrap());
    }

    #[test]
    fn test_numeric_and_string_ids_do_not_collide() {
        let repo = InMemoryCrudRepository::default();
        repo.save(json!({ "id": 1, "name": "number" })).unwrap();
        repo.save(json!({ "id": "1", "name": "string" })).unwrap();

        assert_eq!(repo.count().unwrap(), 2);
        assert_eq!(repo.find_by_id(&json!(1)).unwrap().unwrap()["name"], "number");
        assert_eq!(repo.find_by_id(&json!("1")).unwrap().unwrap()["name"], "string");

        repo.delete_by_id(&json!("1")).unwrap();
        assert!(repo.exists_by_id(&json!(1)).unwrap());
        assert!(!repo.exists_by_id(&json!("1")).unwrap());
    }

    #[test]
    fn test_clones_share_the_store() {
        let repo = InMemoryCrudRepository::default();
        let other = repo.clone();

        repo.save(json!({ "id": 7 })).unwrap();
        assert_eq!(other.count().unwrap(), 1);
    }

    #[test]
    fn test_invoke_by_method() {
        let repo = InMemoryCrudRepository::default();

        let saved = repo
            .invoke(&method("saveAll"), vec![json!([{ "id": 1 }, { "id": 2 }])])
            .unwrap();
        assert_eq!(saved.as_array().unwrap().len(), 2);

        assert_eq!(repo.invoke(&method("count"), Vec::new()).unwrap(), json!(2));
        assert_eq!(repo.invoke(&method("existsById"), vec![json!(2)]).unwrap(), json!(true));
        assert_eq!(repo.invoke(&method("findById"), vec![json!(9)]).unwrap(), Value::Null);
        assert_eq!(repo.invoke(&method("findAll"), Vec::new()).unwrap().as_array().unwrap().len(), 2);

        repo.invoke(&method("deleteAll"), Vec::new()).unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_invoke_rejects_bad_calls() {
        let repo = InMemoryCrudRepository::default();

        let err = repo.invoke(&method("save"), Vec::new()).unwrap_err();
        assert!(matches!(err, InvocationError::InvalidArgument { .. }));

        let err = repo.invoke(&method("saveAll"), vec![json!({ "id": 1 })]).unwrap_err();
        assert!(matches!(err, InvocationError::InvalidArgument { .. }));

        let purge = MethodDescriptor::builder("purge");
        let ty = TypeDescriptor::class("Purging").method(purge).build();
        let err = repo.invoke(&ty.declared_methods()[0], Vec::new()).unwrap_err();
        assert!(matches!(err, InvocationError::Target { ref method, .. } if method == "purge"));
    }
}
