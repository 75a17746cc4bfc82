//! In-memory document store. Used by the default binary and by tests; any
//! other backend plugs in behind the same trait.

use crate::error::StoreError;
use crate::store::{Document, DocumentStore, ID_FIELD};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Index key for a field value. Null values are never indexed, so a unique
/// field may hold any number of nulls.
fn value_key(v: &Value) -> Option<String> {
    if v.is_null() {
        None
    } else {
        Some(v.to_string())
    }
}

#[derive(Default)]
struct Collection {
    docs: HashMap<String, Document>,
    /// Insertion order of identifiers; list returns documents in this order.
    order: Vec<String>,
    /// field -> value key -> owning id. Enforced unique indexes.
    unique: HashMap<String, HashMap<String, String>>,
    /// field -> value key -> ids. Lookup acceleration only, nothing enforced.
    secondary: HashMap<String, HashMap<String, Vec<String>>>,
}

impl Collection {
    /// First declared unique field that `fields` would collide on, ignoring a
    /// collision with `exclude` (the document being replaced).
    fn unique_conflict(&self, fields: &Document, exclude: Option<&str>) -> Option<String> {
        for (field, index) in &self.unique {
            let Some(key) = fields.get(field).and_then(value_key) else {
                continue;
            };
            if let Some(owner) = index.get(&key) {
                if Some(owner.as_str()) != exclude {
                    return Some(field.clone());
                }
            }
        }
        None
    }

    fn index(&mut self, id: &str, doc: &Document) {
        for (field, index) in self.unique.iter_mut() {
            if let Some(key) = doc.get(field.as_str()).and_then(value_key) {
                index.insert(key, id.to_string());
            }
        }
        for (field, index) in self.secondary.iter_mut() {
            if let Some(key) = doc.get(field.as_str()).and_then(value_key) {
                index.entry(key).or_default().push(id.to_string());
            }
        }
    }

    fn unindex(&mut self, id: &str, doc: &Document) {
        for (field, index) in self.unique.iter_mut() {
            if let Some(key) = doc.get(field.as_str()).and_then(value_key) {
                if index.get(&key).map(String::as_str) == Some(id) {
                    index.remove(&key);
                }
            }
        }
        for (field, index) in self.secondary.iter_mut() {
            if let Some(key) = doc.get(field.as_str()).and_then(value_key) {
                if let Some(ids) = index.get_mut(&key) {
                    ids.retain(|x| x != id);
                    if ids.is_empty() {
                        index.remove(&key);
                    }
                }
            }
        }
    }
}

/// Thread-safe in-memory store. All writes to one collection happen under the
/// write lock, so check-then-insert for unique indexes is atomic.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Collection>>, StoreError> {
        self.collections
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Collection>>, StoreError> {
        self.collections
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }

    async fn ensure_indexes(
        &self,
        kind: &str,
        unique: &[String],
        secondary: &[String],
    ) -> Result<(), StoreError> {
        let mut cols = self.write()?;
        let col = cols.entry(kind.to_string()).or_default();
        for field in unique {
            if col.unique.contains_key(field) {
                continue;
            }
            let mut index = HashMap::new();
            for id in &col.order {
                if let Some(key) = col.docs.get(id).and_then(|d| d.get(field.as_str())).and_then(value_key) {
                    index.insert(key, id.clone());
                }
            }
            col.unique.insert(field.clone(), index);
        }
        for field in secondary {
            if col.secondary.contains_key(field) {
                continue;
            }
            let mut index: HashMap<String, Vec<String>> = HashMap::new();
            for id in &col.order {
                if let Some(key) = col.docs.get(id).and_then(|d| d.get(field.as_str())).and_then(value_key) {
                    index.entry(key).or_default().push(id.clone());
                }
            }
            col.secondary.insert(field.clone(), index);
        }
        Ok(())
    }

    async fn list(&self, kind: &str) -> Result<Vec<Document>, StoreError> {
        let cols = self.read()?;
        let Some(col) = cols.get(kind) else {
            return Ok(Vec::new());
        };
        Ok(col
            .order
            .iter()
            .filter_map(|id| col.docs.get(id).cloned())
            .collect())
    }

    async fn get(&self, kind: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let cols = self.read()?;
        Ok(cols.get(kind).and_then(|c| c.docs.get(id)).cloned())
    }

    async fn get_many(
        &self,
        kind: &str,
        ids: &[String],
    ) -> Result<HashMap<String, Document>, StoreError> {
        let cols = self.read()?;
        let mut out = HashMap::new();
        if let Some(col) = cols.get(kind) {
            for id in ids {
                if let Some(doc) = col.docs.get(id) {
                    out.insert(id.clone(), doc.clone());
                }
            }
        }
        Ok(out)
    }

    async fn find_by_field(
        &self,
        kind: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let cols = self.read()?;
        let Some(col) = cols.get(kind) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        if let Some(key) = value_key(value) {
            if let Some(index) = col.unique.get(field) {
                if let Some(doc) = index.get(&key).and_then(|id| col.docs.get(id)) {
                    out.push(doc.clone());
                }
                return Ok(out);
            }
            if let Some(index) = col.secondary.get(field) {
                if let Some(ids) = index.get(&key) {
                    for id in ids {
                        if let Some(doc) = col.docs.get(id) {
                            out.push(doc.clone());
                        }
                    }
                }
                return Ok(out);
            }
        }
        for id in &col.order {
            if let Some(doc) = col.docs.get(id) {
                if doc.get(field) == Some(value) {
                    out.push(doc.clone());
                }
            }
        }
        Ok(out)
    }

    async fn insert(&self, kind: &str, fields: Document) -> Result<Document, StoreError> {
        let mut cols = self.write()?;
        let col = cols.entry(kind.to_string()).or_default();
        if let Some(field) = col.unique_conflict(&fields, None) {
            return Err(StoreError::UniqueViolation { field });
        }
        let id = Uuid::new_v4().to_string();
        let mut doc = fields;
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        col.index(&id, &doc);
        col.docs.insert(id.clone(), doc.clone());
        col.order.push(id);
        Ok(doc)
    }

    async fn replace(&self, kind: &str, id: &str, fields: Document) -> Result<bool, StoreError> {
        let mut cols = self.write()?;
        let Some(col) = cols.get_mut(kind) else {
            return Ok(false);
        };
        let Some(old) = col.docs.get(id).cloned() else {
            return Ok(false);
        };
        if let Some(field) = col.unique_conflict(&fields, Some(id)) {
            return Err(StoreError::UniqueViolation { field });
        }
        col.unindex(id, &old);
        let mut doc = fields;
        doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        col.index(id, &doc);
        col.docs.insert(id.to_string(), doc);
        Ok(true)
    }

    async fn delete(&self, kind: &str, id: &str) -> Result<bool, StoreError> {
        let mut cols = self.write()?;
        let Some(col) = cols.get_mut(kind) else {
            return Ok(false);
        };
        match col.docs.remove(id) {
            Some(old) => {
                col.unindex(id, &old);
                col.order.retain(|x| x != id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
