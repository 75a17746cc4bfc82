//! docrest: schema-driven CRUD REST service over a document store.
//!
//! Declare record kinds as data, bind each to a path segment, and one generic
//! service derives the four CRUD operations per kind, with one-level
//! reference expansion on list.

pub mod binding;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod schema;
pub mod seed;
pub mod service;
pub mod state;
pub mod store;

pub use binding::RouteBindings;
pub use error::{AppError, SchemaError, StoreError};
pub use routes::{common_routes, record_routes};
pub use schema::{FieldDef, FieldType, KindHandle, RecordKind, SchemaRegistry};
pub use seed::seed_sample_data;
pub use service::CrudService;
pub use state::AppState;
pub use store::{Document, DocumentStore, MemoryStore};
