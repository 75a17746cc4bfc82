//! Binding kinds to path segments. One bind per kind at startup registers the
//! four CRUD operations for that kind; handlers resolve the kind from the
//! request path at request time.

use crate::error::{SchemaError, StoreError};
use crate::schema::KindHandle;
use crate::store::DocumentStore;
use std::collections::HashMap;

/// Path segment -> bound kind. Built once at startup and shared read-only by
/// every handler through [`AppState`](crate::state::AppState).
#[derive(Default)]
pub struct RouteBindings {
    by_path: HashMap<String, KindHandle>,
}

impl RouteBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose a kind under `/{path_segment}`. Registers the list, create,
    /// update, and delete operations for it, uniformly for every kind.
    pub fn bind(&mut self, handle: KindHandle, path_segment: &str) -> Result<(), SchemaError> {
        if path_segment.is_empty() {
            return Err(SchemaError::EmptyPathSegment);
        }
        if self.by_path.contains_key(path_segment) {
            return Err(SchemaError::DuplicatePathSegment(path_segment.to_string()));
        }
        self.by_path.insert(path_segment.to_string(), handle);
        Ok(())
    }

    pub fn kind_by_path(&self, path_segment: &str) -> Option<&KindHandle> {
        self.by_path.get(path_segment)
    }

    /// Declare store indexes for every bound kind: a unique index per unique
    /// field, a lookup index per reference field.
    pub async fn ensure_indexes(&self, store: &dyn DocumentStore) -> Result<(), StoreError> {
        for handle in self.by_path.values() {
            let kind = handle.kind();
            let unique: Vec<String> = kind.unique_fields().map(|f| f.name.clone()).collect();
            let secondary: Vec<String> = kind.reference_fields().map(|f| f.name.clone()).collect();
            store.ensure_indexes(&kind.name, &unique, &secondary).await?;
        }
        Ok(())
    }
}
