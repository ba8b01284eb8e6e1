//! Record types served by the listings API and the collection metadata
//! (table, partition attribute, cache prefixes) each one carries.

pub mod government_job;
pub mod job;

use serde::{de::DeserializeOwned, Serialize};

pub use government_job::{GovernmentJob, GovernmentJobDraft, GovernmentJobStatus};
pub use job::{Job, JobDraft, JobStatus};

/// Attribute holding the logical identifier in every collection.
pub const ID_ATTR: &str = "jobId";
/// Attribute holding the lifecycle status in every collection.
pub const STATUS_ATTR: &str = "status";

/// The physical collections backing the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Jobs,
    GovernmentJobs,
}

impl Collection {
    pub fn table(self) -> &'static str {
        match self {
            Collection::Jobs => "jobs",
            Collection::GovernmentJobs => "government_jobs",
        }
    }

    /// Attribute used as the partition half of the physical key.
    pub fn partition_attr(self) -> &'static str {
        match self {
            Collection::Jobs => "category",
            Collection::GovernmentJobs => "organization",
        }
    }

    /// Prefix shared by every cached listing query for this collection.
    pub fn listing_prefix(self) -> &'static str {
        match self {
            Collection::Jobs => "jobs:",
            Collection::GovernmentJobs => "government-jobs:",
        }
    }

    /// Prefix for single-record cache entries.
    pub fn record_prefix(self) -> &'static str {
        match self {
            Collection::Jobs => "job:",
            Collection::GovernmentJobs => "government-job:",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Collection::Jobs => "job",
            Collection::GovernmentJobs => "government job",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Physical key of a stored record: partition value plus identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub partition: String,
    pub id: String,
}

impl RecordKey {
    pub fn new(partition: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            id: id.into(),
        }
    }
}

/// A typed record living in one collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
    fn partition(&self) -> &str;
    /// Raw timestamp string used for ordering; may be absent.
    fn timestamp(&self) -> Option<&str>;

    fn key(&self) -> RecordKey {
        RecordKey::new(self.partition(), self.id())
    }
}

/// Name of the first required field that is missing or blank, if any.
pub(crate) fn first_missing<'a>(fields: &[(&'a str, Option<&str>)]) -> Option<&'a str> {
    fields
        .iter()
        .find(|(_, value)| value.map(|v| v.trim().is_empty()).unwrap_or(true))
        .map(|(name, _)| *name)
}
