//! Generic CRUD execution against the document store. One algorithm for every
//! kind: the service inspects only the declared field list, never the kind's
//! domain meaning.

use crate::error::AppError;
use crate::schema::KindHandle;
use crate::service::RequestValidator;
use crate::store::{Document, DocumentStore, ID_FIELD};
use serde_json::Value;
use std::collections::HashSet;

pub struct CrudService;

impl CrudService {
    /// All records of the kind in store order, with each reference field
    /// expanded one level: the raw identifier is replaced by the target
    /// record, or by null when the target is gone. A dangling reference never
    /// fails the list.
    pub async fn list(store: &dyn DocumentStore, kind: &KindHandle) -> Result<Vec<Value>, AppError> {
        tracing::debug!(kind = kind.name(), "list");
        let mut rows = store.list(kind.name()).await?;

        for def in kind.kind().reference_fields() {
            let target = match def.reference_target() {
                Some(t) => t,
                None => continue,
            };
            let ids: Vec<String> = rows
                .iter()
                .filter_map(|r| r.get(&def.name).and_then(Value::as_str))
                .collect::<HashSet<_>>()
                .into_iter()
                .map(String::from)
                .collect();
            let targets = store.get_many(target, &ids).await?;
            for row in &mut rows {
                // A field that was never set stays absent; a set field becomes
                // the embedded record or null.
                if let Some(raw) = row.get(&def.name) {
                    let expanded = raw
                        .as_str()
                        .and_then(|id| targets.get(id))
                        .cloned()
                        .map(Value::Object)
                        .unwrap_or(Value::Null);
                    row.insert(def.name.clone(), expanded);
                }
            }
        }

        Ok(rows.into_iter().map(Value::Object).collect())
    }

    /// Validate and persist a new record. Returns it including the assigned
    /// identifier.
    pub async fn create(
        store: &dyn DocumentStore,
        kind: &KindHandle,
        body: &Document,
    ) -> Result<Value, AppError> {
        tracing::debug!(kind = kind.name(), "create");
        let fields = declared_fields(kind, body);
        RequestValidator::validate(kind.kind(), &fields)?;
        Self::check_unique(store, kind, &fields, None).await?;
        let doc = store.insert(kind.name(), fields).await?;
        Ok(Value::Object(doc))
    }

    /// Merge `body` over the existing record, re-validate the merged result,
    /// and persist it. Unmentioned fields are retained; the identifier never
    /// changes.
    pub async fn update(
        store: &dyn DocumentStore,
        kind: &KindHandle,
        id: &str,
        body: &Document,
    ) -> Result<Value, AppError> {
        tracing::debug!(kind = kind.name(), id, "update");
        let existing = store
            .get(kind.name(), id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        let mut merged = existing;
        merged.remove(ID_FIELD);
        for (name, value) in declared_fields(kind, body) {
            merged.insert(name, value);
        }
        RequestValidator::validate(kind.kind(), &merged)?;
        Self::check_unique(store, kind, &merged, Some(id)).await?;

        if !store.replace(kind.name(), id, merged.clone()).await? {
            // Deleted between the read and the write.
            return Err(AppError::NotFound(id.to_string()));
        }
        merged.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        Ok(Value::Object(merged))
    }

    /// Remove a record. Absence is not an error: delete is idempotent.
    pub async fn delete(
        store: &dyn DocumentStore,
        kind: &KindHandle,
        id: &str,
    ) -> Result<(), AppError> {
        tracing::debug!(kind = kind.name(), id, "delete");
        store.delete(kind.name(), id).await?;
        Ok(())
    }

    /// Advisory uniqueness pre-check. Two concurrent creates can both pass it;
    /// the store's unique-index enforcement at write time is the backstop.
    async fn check_unique(
        store: &dyn DocumentStore,
        kind: &KindHandle,
        fields: &Document,
        exclude: Option<&str>,
    ) -> Result<(), AppError> {
        for def in kind.kind().unique_fields() {
            let Some(value) = fields.get(&def.name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let hits = store.find_by_field(kind.name(), &def.name, value).await?;
            let conflict = hits
                .iter()
                .any(|d| d.get(ID_FIELD).and_then(Value::as_str) != exclude);
            if conflict {
                return Err(AppError::Validation(format!(
                    "{} must be unique",
                    def.name
                )));
            }
        }
        Ok(())
    }
}

/// Restrict a request body to the kind's declared fields. Unknown fields and a
/// client-supplied identifier are dropped; identifiers are store-assigned only.
fn declared_fields(kind: &KindHandle, body: &Document) -> Document {
    body.iter()
        .filter(|(name, _)| name.as_str() != ID_FIELD && kind.kind().field(name).is_some())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
