//! Record CRUD routes. Paths are parameterized so one route set serves every
//! bound kind; handlers resolve the kind from the path segment.

use crate::handlers::record::{create, delete as delete_handler, list, update};
use crate::state::AppState;
use axum::{routing::get, routing::patch, Router};

pub fn record_routes(state: AppState) -> Router {
    Router::new()
        .route("/:path_segment", get(list).post(create))
        .route(
            "/:path_segment/:id",
            patch(update).delete(delete_handler),
        )
        .with_state(state)
}
