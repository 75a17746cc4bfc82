//! Shared application state for all routes. The store handle is an explicit
//! dependency so handlers can run against any backend, including a test store.

use crate::binding::RouteBindings;
use crate::store::DocumentStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub bindings: Arc<RouteBindings>,
}
