//! Admin mutations. Authentication happens upstream; this layer validates,
//! writes through the record store, and runs the cache invalidation hooks.

pub mod handlers;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::cache::CacheOrchestrator;
use crate::errors::AppError;
use crate::models::{
    GovernmentJob, GovernmentJobDraft, Job, JobDraft, Record, ID_ATTR,
};
use crate::query::find_by_id;
use crate::store::{key_of, put_record, Predicate, RecordStore};

/// Admin input that can be validated into a new record.
pub trait Draft: DeserializeOwned + Send + 'static {
    type Output: Record;

    fn build(self) -> Result<Self::Output, AppError>;
}

impl Draft for JobDraft {
    type Output = Job;

    fn build(self) -> Result<Job, AppError> {
        self.into_job()
    }
}

impl Draft for GovernmentJobDraft {
    type Output = GovernmentJob;

    fn build(self) -> Result<GovernmentJob, AppError> {
        self.into_job()
    }
}

pub async fn create<D: Draft>(
    store: &dyn RecordStore,
    cache: &CacheOrchestrator,
    draft: D,
) -> Result<D::Output, AppError> {
    let record = draft.build()?;
    put_record(store, &record).await?;
    cache
        .invalidate_after_mutation(D::Output::COLLECTION, record.id())
        .await;
    info!("Created {} {}", D::Output::COLLECTION.label(), record.id());
    Ok(record)
}

/// Applies an attribute delta to the record with identifier `id`.
///
/// The identifier and partition attribute are immutable and silently
/// dropped from the delta. The merged document must still decode as `R`.
pub async fn update<R: Record>(
    store: &dyn RecordStore,
    cache: &CacheOrchestrator,
    id: &str,
    delta: Value,
) -> Result<R, AppError> {
    let Value::Object(mut delta) = delta else {
        return Err(AppError::Validation(
            "update body must be a JSON object".to_string(),
        ));
    };
    delta.remove(ID_ATTR);
    delta.remove(R::COLLECTION.partition_attr());
    if delta.is_empty() {
        return Err(AppError::Validation("no updatable fields supplied".to_string()));
    }

    let existing = find_by_id::<R>(store, id).await?;

    let mut merged = serde_json::to_value(&existing).map_err(anyhow::Error::from)?;
    if let Value::Object(fields) = &mut merged {
        fields.extend(delta.clone());
    }
    serde_json::from_value::<R>(merged)
        .map_err(|e| AppError::Validation(format!("invalid update: {e}")))?;

    let updated = store
        .update(R::COLLECTION, &existing.key(), delta)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("{} {id} not found", R::COLLECTION.label()))
        })?;
    let record: R = serde_json::from_value(updated).map_err(anyhow::Error::from)?;

    cache.invalidate_after_mutation(R::COLLECTION, id).await;
    info!("Updated {} {id}", R::COLLECTION.label());
    Ok(record)
}

/// Deletes every stored record with identifier `id` and returns how many were
/// removed. A missing identifier is treated as already deleted.
pub async fn delete<R: Record>(
    store: &dyn RecordStore,
    cache: &CacheOrchestrator,
    id: &str,
) -> Result<usize, AppError> {
    let collection = R::COLLECTION;
    let docs = store
        .scan(collection, &Predicate::new().eq(ID_ATTR, id))
        .await?;

    if docs.len() > 1 {
        error!(
            "Data integrity violation: {collection} id {id} present {} times, deleting all",
            docs.len()
        );
    }

    let mut removed = 0;
    let mut outcome = Ok(());
    for doc in &docs {
        let deleted = match key_of(collection, doc) {
            Ok(key) => store.delete(collection, &key).await,
            Err(e) => Err(e),
        };
        if let Err(e) = deleted {
            outcome = Err(e);
            break;
        }
        removed += 1;
    }

    // Runs even when nothing matched, and before a partial failure is
    // returned, so no cached copy outlives a removed record.
    cache.invalidate_after_mutation(collection, id).await;
    outcome?;

    info!("Deleted {} {id} ({removed} records)", collection.label());
    Ok(removed)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport {
    pub successful: usize,
    pub errors: usize,
    pub error_details: Vec<RowError>,
}

/// Creates one record per parsed row. Invalid rows are reported by 1-based
/// position and skipped; valid rows are written. Listings are invalidated
/// once at the end.
pub async fn bulk_create<D: Draft>(
    store: &dyn RecordStore,
    cache: &CacheOrchestrator,
    rows: Vec<Value>,
) -> Result<BulkReport, AppError> {
    let collection = D::Output::COLLECTION;
    let mut records = Vec::with_capacity(rows.len());
    let mut error_details = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        let built = serde_json::from_value::<D>(row)
            .map_err(|e| AppError::Validation(e.to_string()))
            .and_then(D::build);
        match built {
            Ok(record) => records.push(record),
            Err(AppError::Validation(msg)) => error_details.push(RowError {
                row: index + 1,
                error: msg,
            }),
            Err(other) => return Err(other),
        }
    }

    let mut written = 0;
    let mut outcome = Ok(());
    for record in &records {
        if let Err(e) = put_record(store, record).await {
            outcome = Err(e);
            break;
        }
        written += 1;
    }

    if written > 0 {
        cache.invalidate_collection_listings(collection).await;
    }
    outcome?;

    info!(
        "Bulk created {written} {} records, {} rows rejected",
        collection.label(),
        error_details.len()
    );
    Ok(BulkReport {
        successful: written,
        errors: error_details.len(),
        error_details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::keys::listing_key;
    use crate::cache::memory::MemoryCache;
    use crate::cache::CacheStore;
    use crate::listings::{get_job, list_jobs};
    use crate::models::{Collection, JobStatus};
    use crate::query::QueryParams;
    use crate::store::memory::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn draft(category: &str) -> JobDraft {
        serde_json::from_value(json!({
            "role": "Product Designer",
            "companyName": "Studio",
            "location": "Remote",
            "salary": "20 LPA",
            "jobDescription": "Design things",
            "originalLink": "https://studio.example/apply",
            "category": category,
            "expiresOn": "2026-12-31",
            "tags": ["Figma"]
        }))
        .unwrap()
    }

    fn setup() -> (MemoryStore, Arc<MemoryCache>, CacheOrchestrator) {
        let cache = Arc::new(MemoryCache::new());
        let orch = CacheOrchestrator::new(cache.clone());
        (MemoryStore::new(), cache, orch)
    }

    fn design_filter() -> QueryParams {
        [("category".to_string(), "Design".to_string())]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn test_deleting_only_design_job_empties_cached_design_listing() {
        let (store, _cache, orch) = setup();
        let job = create(&store, &orch, draft("Design")).await.unwrap();

        let before = list_jobs(&store, &orch, &design_filter()).await.unwrap();
        assert_eq!(before.jobs.len(), 1);

        let removed = delete::<Job>(&store, &orch, &job.job_id).await.unwrap();
        assert_eq!(removed, 1);

        let after = list_jobs(&store, &orch, &design_filter()).await.unwrap();
        assert!(after.jobs.is_empty());
        assert_eq!(after.pagination.total_jobs, 0);
    }

    #[tokio::test]
    async fn test_update_is_visible_through_cached_reads() {
        let (store, _cache, orch) = setup();
        let job = create(&store, &orch, draft("Design")).await.unwrap();

        // Warm both cache entries.
        get_job(&store, &orch, &job.job_id).await.unwrap();
        list_jobs(&store, &orch, &QueryParams::new()).await.unwrap();

        let updated: Job = update(
            &store,
            &orch,
            &job.job_id,
            json!({"role": "Senior Product Designer", "category": "Hacked", "jobId": "other"}),
        )
        .await
        .unwrap();
        assert_eq!(updated.role, "Senior Product Designer");
        assert_eq!(updated.category, "Design");
        assert_eq!(updated.job_id, job.job_id);

        let fetched = get_job(&store, &orch, &job.job_id).await.unwrap();
        assert_eq!(fetched.role, "Senior Product Designer");
        let listed = list_jobs(&store, &orch, &QueryParams::new()).await.unwrap();
        assert_eq!(listed.jobs[0].role, "Senior Product Designer");
    }

    #[tokio::test]
    async fn test_expiring_a_job_removes_it_from_listings() {
        let (store, _cache, orch) = setup();
        let job = create(&store, &orch, draft("Design")).await.unwrap();
        list_jobs(&store, &orch, &QueryParams::new()).await.unwrap();

        let updated: Job = update(&store, &orch, &job.job_id, json!({"status": "expired"}))
            .await
            .unwrap();
        assert_eq!(updated.status, JobStatus::Expired);

        let listed = list_jobs(&store, &orch, &QueryParams::new()).await.unwrap();
        assert!(listed.jobs.is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_status_and_empty_delta() {
        let (store, _cache, orch) = setup();
        let job = create(&store, &orch, draft("Design")).await.unwrap();

        let bad = update::<Job>(&store, &orch, &job.job_id, json!({"status": "archived"})).await;
        assert!(matches!(bad, Err(AppError::Validation(_))));

        let empty = update::<Job>(&store, &orch, &job.job_id, json!({"jobId": "x"})).await;
        assert!(matches!(empty, Err(AppError::Validation(_))));

        let not_object = update::<Job>(&store, &orch, &job.job_id, json!(["role"])).await;
        assert!(matches!(not_object, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_missing_job_is_not_found() {
        let (store, _cache, orch) = setup();
        let result = update::<Job>(&store, &orch, "ghost", json!({"role": "x"})).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_job_is_idempotent() {
        let (store, _cache, orch) = setup();
        assert_eq!(delete::<Job>(&store, &orch, "ghost").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_duplicates_across_partitions() {
        let (store, _cache, orch) = setup();
        for category in ["A", "B"] {
            store
                .put(
                    Collection::Jobs,
                    json!({"jobId": "dup", "category": category, "status": "active"}),
                )
                .await
                .unwrap();
        }
        assert_eq!(delete::<Job>(&store, &orch, "dup").await.unwrap(), 2);
        assert_eq!(store.len(Collection::Jobs), 0);
    }

    #[tokio::test]
    async fn test_partial_delete_failure_still_invalidates() {
        let (store, _cache, orch) = setup();
        for category in ["A", "B"] {
            store
                .put(
                    Collection::Jobs,
                    json!({"jobId": "dup", "category": category, "status": "active"}),
                )
                .await
                .unwrap();
        }
        let warm = list_jobs(&store, &orch, &QueryParams::new()).await.unwrap();
        assert_eq!(warm.jobs.len(), 2);

        store.fail_deletes_after(1);
        let result = delete::<Job>(&store, &orch, "dup").await;
        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
        assert_eq!(store.len(Collection::Jobs), 1);

        let after = list_jobs(&store, &orch, &QueryParams::new()).await.unwrap();
        assert_eq!(after.jobs.len(), 1);
    }

    #[tokio::test]
    async fn test_create_sweeps_listing_keys_but_not_other_collection() {
        let (store, cache, orch) = setup();
        let jobs_key = listing_key(Collection::Jobs, &QueryParams::new());
        let gov_key = listing_key(Collection::GovernmentJobs, &QueryParams::new());
        cache.set_with_ttl(&jobs_key, "{}", 300).await.unwrap();
        cache.set_with_ttl(&gov_key, "{}", 300).await.unwrap();

        create(&store, &orch, draft("Design")).await.unwrap();

        assert_eq!(cache.keys(), vec![gov_key]);
    }

    #[tokio::test]
    async fn test_mutation_succeeds_when_cache_is_down() {
        let (store, cache, orch) = setup();
        cache.set_failing(true);
        let job = create(&store, &orch, draft("Design")).await.unwrap();
        assert_eq!(delete::<Job>(&store, &orch, &job.job_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_validation_failure_writes_nothing() {
        let (store, _cache, orch) = setup();
        let mut incomplete = draft("Design");
        incomplete.role = None;
        let result = create(&store, &orch, incomplete).await;
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "role is required"));
        assert_eq!(store.len(Collection::Jobs), 0);
    }

    #[tokio::test]
    async fn test_bulk_create_reports_bad_rows() {
        let (store, _cache, orch) = setup();
        let rows = vec![
            json!({
                "postName": "Clerk",
                "organization": "SSC",
                "officialWebsite": "https://ssc.example",
                "notificationLink": "https://ssc.example/n.pdf"
            }),
            json!({"postName": "Typist"}),
            json!("not an object"),
        ];

        let report = bulk_create::<GovernmentJobDraft>(&store, &orch, rows)
            .await
            .unwrap();

        assert_eq!(report.successful, 1);
        assert_eq!(report.errors, 2);
        assert_eq!(report.error_details[0].row, 2);
        assert_eq!(report.error_details[0].error, "organization is required");
        assert_eq!(report.error_details[1].row, 3);
        assert_eq!(store.len(Collection::GovernmentJobs), 1);
    }

    #[tokio::test]
    async fn test_store_outage_fails_mutation() {
        let (store, _cache, orch) = setup();
        store.set_failing(true);
        let result = create(&store, &orch, draft("Design")).await;
        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }
}
