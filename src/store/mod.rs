//! Document store seam: one collection per record kind, each stored document
//! a field map plus a system-assigned `id`. Implementations own all record
//! state; callers never hold records between requests.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// A stored record: field names to values, including [`ID_FIELD`] once persisted.
pub type Document = serde_json::Map<String, Value>;

/// Key under which the system-assigned identifier is stored.
pub const ID_FIELD: &str = "id";

/// Persistence contract shared read-write by all handlers of all kinds.
/// Single-document writes are atomic; unique indexes declared via
/// [`ensure_indexes`](DocumentStore::ensure_indexes) are enforced at write time,
/// backstopping the service's advisory uniqueness pre-check.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    /// Declare indexes for a kind: one enforced unique index per field in
    /// `unique`, one lookup index per field in `secondary`.
    async fn ensure_indexes(
        &self,
        kind: &str,
        unique: &[String],
        secondary: &[String],
    ) -> Result<(), StoreError>;

    /// All documents of a kind, in store order.
    async fn list(&self, kind: &str) -> Result<Vec<Document>, StoreError>;

    async fn get(&self, kind: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Batch fetch by identifier, keyed by identifier. Missing identifiers are
    /// simply absent from the result; they are not an error.
    async fn get_many(
        &self,
        kind: &str,
        ids: &[String],
    ) -> Result<HashMap<String, Document>, StoreError>;

    /// Documents whose `field` equals `value` exactly.
    async fn find_by_field(
        &self,
        kind: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;

    /// Persist a new document, assigning a fresh identifier. Identifiers are
    /// never recycled within a running store.
    async fn insert(&self, kind: &str, fields: Document) -> Result<Document, StoreError>;

    /// Replace the field map of an existing document, keeping its identifier
    /// and position. Returns false if the identifier is unknown.
    async fn replace(&self, kind: &str, id: &str, fields: Document) -> Result<bool, StoreError>;

    /// Remove a document. Returns false if it was already absent.
    async fn delete(&self, kind: &str, id: &str) -> Result<bool, StoreError>;
}
