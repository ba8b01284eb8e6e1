//! Query engine: filter parameters → predicate → full scan → newest-first
//! sort → page slice.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::AppError;
use crate::models::{Collection, Record, ID_ATTR, STATUS_ATTR};
use crate::store::{scan_records, Condition, Predicate, RecordStore};

/// Raw inbound query parameters, kept sorted for key derivation.
pub type QueryParams = BTreeMap<String, String>;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Reads `page` and `limit`. Absent means default; anything that is not a
    /// positive integer is rejected.
    pub fn from_params(params: &QueryParams) -> Result<Self, AppError> {
        Ok(Self {
            page: positive(params, "page", DEFAULT_PAGE)?,
            page_size: positive(params, "limit", DEFAULT_PAGE_SIZE)?,
        })
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

fn positive(params: &QueryParams, name: &str, default: usize) -> Result<usize, AppError> {
    match params.get(name).map(|v| v.trim()) {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| AppError::Validation(format!("{name} must be a positive integer"))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_jobs: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingPage<T> {
    pub jobs: Vec<T>,
    pub pagination: PaginationInfo,
}

/// Builds the conjunctive predicate for a listing request. Unrecognized keys
/// and empty values impose no constraint.
pub fn listing_predicate(collection: Collection, status: &str, filters: &QueryParams) -> Predicate {
    let filter = |name: &str| {
        filters
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    };

    let mut predicate = Predicate::new().eq(STATUS_ATTR, status);

    match collection {
        Collection::Jobs => {
            if let Some(category) = filter("category") {
                predicate = predicate.eq("category", category);
            }
            if let Some(location) = filter("location") {
                predicate = predicate.contains("location", location);
            }
            if let Some(batch) = filter("batch") {
                predicate = predicate.contains("batch", batch);
            }
            if let Some(tag) = filter("tags") {
                predicate = predicate.contains("tags", tag);
            }
            if let Some(term) = filter("q") {
                predicate = predicate.any_of(vec![
                    Condition::Contains {
                        attr: "role".to_string(),
                        value: term.to_string(),
                    },
                    Condition::Contains {
                        attr: "companyName".to_string(),
                        value: term.to_string(),
                    },
                ]);
            }
        }
        Collection::GovernmentJobs => {
            if let Some(organization) = filter("organization") {
                predicate = predicate.eq("organization", organization);
            }
        }
    }

    predicate
}

/// Milliseconds since the epoch; anything absent or unparseable is epoch zero.
fn sort_millis(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim) else {
        return 0;
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.timestamp_millis();
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// Newest first; equal timestamps fall back to identifier order so the
/// result is the same for every scan of an unchanged collection.
pub fn sort_newest_first<R: Record>(items: &mut [R]) {
    items.sort_by_cached_key(|r| (Reverse(sort_millis(r.timestamp())), r.id().to_string()));
}

pub fn paginate<T>(items: Vec<T>, page: PageRequest) -> ListingPage<T> {
    let total = items.len();
    let offset = page.offset();
    let jobs: Vec<T> = items
        .into_iter()
        .skip(offset)
        .take(page.page_size)
        .collect();

    ListingPage {
        jobs,
        pagination: PaginationInfo {
            current_page: page.page,
            total_pages: total.div_ceil(page.page_size),
            total_jobs: total,
            has_next: offset.saturating_add(page.page_size) < total,
            has_prev: page.page > 1,
        },
    }
}

/// Filtered, sorted, paginated listing of records holding `status`.
pub async fn search<R: Record>(
    store: &dyn RecordStore,
    status: &str,
    filters: &QueryParams,
    page: PageRequest,
) -> Result<ListingPage<R>, AppError> {
    let predicate = listing_predicate(R::COLLECTION, status, filters);
    let mut items = scan_records::<R>(store, &predicate).await?;
    sort_newest_first(&mut items);
    Ok(paginate(items, page))
}

/// Every record holding `status`, newest first, unpaginated.
pub async fn search_all<R: Record>(store: &dyn RecordStore, status: &str) -> Result<Vec<R>, AppError> {
    let predicate = Predicate::new().eq(STATUS_ATTR, status);
    let mut items = scan_records::<R>(store, &predicate).await?;
    sort_newest_first(&mut items);
    Ok(items)
}

/// Every stored record with identifier `id`, across all partitions.
pub async fn scan_by_id<R: Record>(store: &dyn RecordStore, id: &str) -> Result<Vec<R>, AppError> {
    let predicate = Predicate::new().eq(ID_ATTR, id);
    Ok(scan_records::<R>(store, &predicate).await?)
}

/// Point lookup by identifier when the partition is unknown.
///
/// More than one hit means the same identifier exists in several partitions.
/// That is logged as an integrity violation and the first by partition order
/// is returned.
pub async fn find_by_id<R: Record>(store: &dyn RecordStore, id: &str) -> Result<R, AppError> {
    let mut matches = scan_by_id::<R>(store, id).await?;
    if matches.len() > 1 {
        let partitions: Vec<&str> = matches.iter().map(|r| r.partition()).collect();
        error!(
            "Data integrity violation: {} id {id} present in partitions {partitions:?}",
            R::COLLECTION
        );
    }
    if matches.is_empty() {
        return Err(AppError::NotFound(format!(
            "{} {id} not found",
            R::COLLECTION.label()
        )));
    }
    Ok(matches.swap_remove(0))
}
