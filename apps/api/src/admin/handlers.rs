//! Admin route handlers. Each collection gets the same four endpoints; the
//! generic bodies below are instantiated per collection in `routes`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::admin::{bulk_create, create, delete, update, BulkReport, Draft};
use crate::errors::AppError;
use crate::models::Record;
use crate::state::AppState;

#[derive(Serialize)]
pub struct MutationResponse<R> {
    pub message: String,
    pub job: R,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub deleted: usize,
}

#[derive(Serialize)]
pub struct BulkResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: BulkReport,
}

/// POST /api/v1/admin/{jobs,government-jobs}
pub async fn handle_create<D: Draft>(
    State(state): State<AppState>,
    Json(draft): Json<D>,
) -> Result<(StatusCode, Json<MutationResponse<D::Output>>), AppError> {
    let job = create(state.store.as_ref(), &state.cache, draft).await?;
    let message = format!("Created {}", D::Output::COLLECTION.label());
    Ok((StatusCode::CREATED, Json(MutationResponse { message, job })))
}

/// POST /api/v1/admin/{jobs,government-jobs}/bulk
///
/// Takes already-parsed rows; spreadsheet parsing happens client side.
pub async fn handle_bulk_create<D: Draft>(
    State(state): State<AppState>,
    Json(rows): Json<Vec<Value>>,
) -> Result<Json<BulkResponse>, AppError> {
    let report = bulk_create::<D>(state.store.as_ref(), &state.cache, rows).await?;
    Ok(Json(BulkResponse {
        message: "Bulk upload completed".to_string(),
        report,
    }))
}

/// PUT /api/v1/admin/{jobs,government-jobs}/:id
pub async fn handle_update<R: Record>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(delta): Json<Value>,
) -> Result<Json<MutationResponse<R>>, AppError> {
    let job = update::<R>(state.store.as_ref(), &state.cache, &id, delta).await?;
    let message = format!("Updated {}", R::COLLECTION.label());
    Ok(Json(MutationResponse { message, job }))
}

/// DELETE /api/v1/admin/{jobs,government-jobs}/:id
pub async fn handle_delete<R: Record>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted = delete::<R>(state.store.as_ref(), &state.cache, &id).await?;
    let message = if deleted == 0 {
        format!("No {} {id} found, nothing to delete", R::COLLECTION.label())
    } else {
        format!("Deleted {}", R::COLLECTION.label())
    };
    Ok(Json(DeleteResponse { message, deleted }))
}
