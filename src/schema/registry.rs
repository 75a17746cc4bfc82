//! Kind registration: names are unique, forward references are allowed.

use crate::error::SchemaError;
use crate::schema::types::{FieldDef, KindHandle, RecordKind};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of declared record kinds. Populated at startup, before any
/// request is served; definition never touches the store.
#[derive(Default)]
pub struct SchemaRegistry {
    kinds: HashMap<String, Arc<RecordKind>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a kind. A reference field may name a kind that is not defined
    /// yet; it is resolved by name when first expanded.
    pub fn define(&mut self, name: &str, fields: Vec<FieldDef>) -> Result<KindHandle, SchemaError> {
        if name.is_empty() {
            return Err(SchemaError::EmptyKindName);
        }
        if self.kinds.contains_key(name) {
            return Err(SchemaError::DuplicateKind(name.to_string()));
        }
        let kind = Arc::new(RecordKind {
            name: name.to_string(),
            fields,
        });
        self.kinds.insert(name.to_string(), Arc::clone(&kind));
        Ok(KindHandle(kind))
    }

    pub fn get(&self, name: &str) -> Option<KindHandle> {
        self.kinds.get(name).map(|k| KindHandle(Arc::clone(k)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_returns_handle_with_fields() {
        let mut reg = SchemaRegistry::new();
        let h = reg
            .define(
                "user",
                vec![
                    FieldDef::text("name").required(),
                    FieldDef::text("email").required().unique(),
                    FieldDef::integer("age").minimum(0),
                ],
            )
            .unwrap();
        assert_eq!(h.name(), "user");
        assert_eq!(h.kind().fields.len(), 3);
        assert!(h.kind().field("email").unwrap().unique);
        assert_eq!(h.kind().field("age").unwrap().minimum, Some(0));
    }

    #[test]
    fn duplicate_kind_is_rejected() {
        let mut reg = SchemaRegistry::new();
        reg.define("user", vec![]).unwrap();
        match reg.define("user", vec![]) {
            Err(SchemaError::DuplicateKind(name)) => assert_eq!(name, "user"),
            other => panic!("expected DuplicateKind, got {:?}", other.map(|h| h.name().to_string())),
        }
    }

    #[test]
    fn empty_kind_name_is_rejected() {
        let mut reg = SchemaRegistry::new();
        assert!(matches!(reg.define("", vec![]), Err(SchemaError::EmptyKindName)));
    }

    #[test]
    fn forward_reference_is_allowed() {
        let mut reg = SchemaRegistry::new();
        let post = reg
            .define("post", vec![FieldDef::reference("author", "user")])
            .unwrap();
        assert_eq!(
            post.kind().field("author").unwrap().reference_target(),
            Some("user")
        );
        // Target defined afterwards; nothing to re-resolve.
        reg.define("user", vec![FieldDef::text("name")]).unwrap();
        assert!(reg.get("user").is_some());
    }
}
