//! Kind descriptors consumed by the generic CRUD service.
//!
//! Kinds are data, not types: one `RecordKind` value per entity, inspected at
//! request time by a single generic algorithm. Reference fields name their
//! target kind by string, so the relationship graph is an ordinary adjacency
//! map and a dangling edge is just a failed lookup.

use std::sync::Arc;

/// Semantic type of a field value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    /// Holds the identifier of a record of the named target kind. The target
    /// may be defined after this kind; it is resolved by name at expansion time.
    Reference { target: String },
}

/// One field of a record kind: semantic type plus constraint set.
#[derive(Clone, Debug)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub unique: bool,
    /// Lower bound for integer fields.
    pub minimum: Option<i64>,
}

impl FieldDef {
    fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            required: false,
            unique: false,
            minimum: None,
        }
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn reference(name: &str, target: &str) -> Self {
        Self::new(
            name,
            FieldType::Reference {
                target: target.to_string(),
            },
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn minimum(mut self, min: i64) -> Self {
        self.minimum = Some(min);
        self
    }

    pub fn reference_target(&self) -> Option<&str> {
        match &self.field_type {
            FieldType::Reference { target } => Some(target),
            _ => None,
        }
    }
}

/// A named schema describing one category of stored record.
#[derive(Clone, Debug)]
pub struct RecordKind {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl RecordKind {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn reference_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.reference_target().is_some())
    }

    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.unique)
    }
}

/// Opaque handle to a registered kind, produced by [`SchemaRegistry::define`]
/// and accepted by the CRUD service and route bindings. Cheap to clone.
///
/// [`SchemaRegistry::define`]: crate::schema::SchemaRegistry::define
#[derive(Clone, Debug)]
pub struct KindHandle(pub(crate) Arc<RecordKind>);

impl KindHandle {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> &RecordKind {
        &self.0
    }
}
