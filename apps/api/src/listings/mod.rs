//! Cached public reads: listing pages, single records, and the government
//! results view.

pub mod handlers;

use crate::cache::keys::{listing_key, record_key, results_key};
use crate::cache::{CacheOrchestrator, LISTING_TTL_SECS, RECORD_TTL_SECS, RESULTS_TTL_SECS};
use crate::errors::AppError;
use crate::models::{GovernmentJob, GovernmentJobStatus, Job, JobStatus, Record};
use crate::query::{find_by_id, search, search_all, ListingPage, PageRequest, QueryParams};
use crate::store::RecordStore;

async fn list_cached<R: Record>(
    store: &dyn RecordStore,
    cache: &CacheOrchestrator,
    status: &str,
    params: &QueryParams,
) -> Result<ListingPage<R>, AppError> {
    let page = PageRequest::from_params(params)?;
    let key = listing_key(R::COLLECTION, params);
    cache
        .read_through(&key, LISTING_TTL_SECS, || {
            search::<R>(store, status, params, page)
        })
        .await
}

/// Cached point lookup by identifier.
pub async fn get_cached<R: Record>(
    store: &dyn RecordStore,
    cache: &CacheOrchestrator,
    id: &str,
) -> Result<R, AppError> {
    let key = record_key(R::COLLECTION, id);
    cache
        .read_through(&key, RECORD_TTL_SECS, || find_by_id::<R>(store, id))
        .await
}

pub async fn list_jobs(
    store: &dyn RecordStore,
    cache: &CacheOrchestrator,
    params: &QueryParams,
) -> Result<ListingPage<Job>, AppError> {
    list_cached(store, cache, JobStatus::Active.as_str(), params).await
}

pub async fn get_job(
    store: &dyn RecordStore,
    cache: &CacheOrchestrator,
    id: &str,
) -> Result<Job, AppError> {
    get_cached(store, cache, id).await
}

pub async fn list_government_jobs(
    store: &dyn RecordStore,
    cache: &CacheOrchestrator,
    params: &QueryParams,
) -> Result<ListingPage<GovernmentJob>, AppError> {
    list_cached(store, cache, GovernmentJobStatus::Active.as_str(), params).await
}

pub async fn get_government_job(
    store: &dyn RecordStore,
    cache: &CacheOrchestrator,
    id: &str,
) -> Result<GovernmentJob, AppError> {
    get_cached(store, cache, id).await
}

/// Government jobs whose results are out, newest first.
pub async fn list_results_out(
    store: &dyn RecordStore,
    cache: &CacheOrchestrator,
) -> Result<Vec<GovernmentJob>, AppError> {
    cache
        .read_through(&results_key(), RESULTS_TTL_SECS, || {
            search_all::<GovernmentJob>(store, GovernmentJobStatus::ResultOut.as_str())
        })
        .await
}
