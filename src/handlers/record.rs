//! Record CRUD handlers: list, create, update, delete. Each resolves the
//! bound kind from the path segment and delegates to the generic service.

use crate::error::AppError;
use crate::schema::KindHandle;
use crate::service::CrudService;
use crate::state::AppState;
use crate::store::Document;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

fn resolve_kind<'a>(state: &'a AppState, path_segment: &str) -> Result<&'a KindHandle, AppError> {
    state
        .bindings
        .kind_by_path(path_segment)
        .ok_or_else(|| AppError::NotFound(path_segment.to_string()))
}

/// A malformed identifier cannot resolve to any record, so it reports as
/// not-found rather than a server fault.
fn parse_id(id_str: &str) -> Result<String, AppError> {
    let id = Uuid::parse_str(id_str).map_err(|_| AppError::NotFound(id_str.to_string()))?;
    Ok(id.to_string())
}

fn body_to_fields(value: Value) -> Result<Document, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::Validation("body must be a JSON object".into())),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
) -> Result<(StatusCode, Json<Vec<Value>>), AppError> {
    let kind = resolve_kind(&state, &path_segment)?;
    let rows = CrudService::list(state.store.as_ref(), kind).await?;
    Ok((StatusCode::OK, Json(rows)))
}

pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let kind = resolve_kind(&state, &path_segment)?;
    let fields = body_to_fields(body)?;
    let record = CrudService::create(state.store.as_ref(), kind, &fields).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let kind = resolve_kind(&state, &path_segment)?;
    let id = parse_id(&id_str)?;
    let fields = body_to_fields(body)?;
    let record = CrudService::update(state.store.as_ref(), kind, &id, &fields).await?;
    Ok((StatusCode::OK, Json(record)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let kind = resolve_kind(&state, &path_segment)?;
    let id = parse_id(&id_str)?;
    CrudService::delete(state.store.as_ref(), kind, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
