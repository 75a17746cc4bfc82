//! Record kind declarations: field descriptors and the registry.

pub mod registry;
pub mod types;

pub use registry::SchemaRegistry;
pub use types::{FieldDef, FieldType, KindHandle, RecordKind};
