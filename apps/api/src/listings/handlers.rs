use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::errors::AppError;
use crate::listings::{
    get_government_job, get_job, list_government_jobs, list_jobs, list_results_out,
};
use crate::models::{GovernmentJob, Job};
use crate::query::{ListingPage, QueryParams};
use crate::state::AppState;

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<ListingPage<Job>>, AppError> {
    let page = list_jobs(state.store.as_ref(), &state.cache, &params).await?;
    Ok(Json(page))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, AppError> {
    let job = get_job(state.store.as_ref(), &state.cache, &id).await?;
    Ok(Json(job))
}

/// GET /api/v1/government-jobs
pub async fn handle_list_government_jobs(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<ListingPage<GovernmentJob>>, AppError> {
    let page = list_government_jobs(state.store.as_ref(), &state.cache, &params).await?;
    Ok(Json(page))
}

/// GET /api/v1/government-jobs/:id
pub async fn handle_get_government_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GovernmentJob>, AppError> {
    let job = get_government_job(state.store.as_ref(), &state.cache, &id).await?;
    Ok(Json(job))
}

/// GET /api/v1/government-results
///
/// Unpaginated, newest first.
pub async fn handle_list_results(
    State(state): State<AppState>,
) -> Result<Json<Vec<GovernmentJob>>, AppError> {
    let results = list_results_out(state.store.as_ref(), &state.cache).await?;
    Ok(Json(results))
}
