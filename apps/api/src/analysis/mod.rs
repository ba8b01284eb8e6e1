//! CV analysis: compatibility scoring against one job, plus alternative job
//! suggestions ranked by skill overlap.

pub mod handlers;
pub mod prompts;
pub mod ranking;
pub mod scorer;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::CacheOrchestrator;
use crate::documents::DocumentSource;
use crate::errors::AppError;
use crate::listings::get_job;
use crate::models::{Job, JobStatus, ID_ATTR, STATUS_ATTR};
use crate::store::{scan_records, Predicate, RecordStore};

pub use ranking::{rank_alternatives, SuggestedJob};
pub use scorer::{AnalysisResult, CompatibilityModel, CompatibilityScorer};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCvRequest {
    pub job_id: Option<String>,
    pub cv_s3_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCvResponse {
    pub analysis: AnalysisResult,
    pub suggested_jobs: Vec<SuggestedJob>,
}

/// Collaborators needed for one analysis.
pub struct AnalysisDeps<'a> {
    pub store: &'a dyn RecordStore,
    pub cache: &'a CacheOrchestrator,
    pub documents: &'a dyn DocumentSource,
    pub scorer: &'a CompatibilityScorer,
}

/// Scores the CV stored under `document_ref` against job `job_id` and
/// suggests up to five other active jobs.
///
/// Job lookup and document fetch failures are returned; model failures and
/// suggestion-pool failures are absorbed.
pub async fn analyze_cv(
    deps: AnalysisDeps<'_>,
    job_id: &str,
    document_ref: &str,
) -> Result<AnalyzeCvResponse, AppError> {
    let job = get_job(deps.store, deps.cache, job_id).await?;
    let document_text = deps.documents.fetch_text(document_ref).await?;

    let analysis = deps.scorer.analyze(&job, &document_text).await;
    let suggested_jobs =
        suggest_alternatives(deps.store, &analysis.matching_skills, &job.job_id).await;

    Ok(AnalyzeCvResponse {
        analysis,
        suggested_jobs,
    })
}

async fn suggest_alternatives(
    store: &dyn RecordStore,
    matched_skills: &[String],
    exclude_id: &str,
) -> Vec<SuggestedJob> {
    let predicate = Predicate::new()
        .eq(STATUS_ATTR, JobStatus::Active.as_str())
        .ne(ID_ATTR, exclude_id);

    match scan_records::<Job>(store, &predicate).await {
        Ok(pool) => rank_alternatives(matched_skills, exclude_id, &pool),
        Err(e) => {
            warn!("Could not load suggestion pool, returning none: {e}");
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryCache;
    use crate::store::memory::MemoryStore;
    use crate::store::put_record;
    use async_trait::async_trait;
    use super::scorer::AnalysisSource;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct StaticDocuments(HashMap<String, String>);

    #[async_trait]
    impl DocumentSource for StaticDocuments {
        async fn fetch_text(&self, key: &str) -> Result<String, AppError> {
            self.0
                .get(key)
                .cloned()
                .ok_or_else(|| AppError::DocumentUnavailable(format!("no object {key}")))
        }
    }

    fn job(id: &str, tags: &[&str]) -> Job {
        serde_json::from_value(json!({
            "jobId": id,
            "category": "Engineering",
            "role": "Developer",
            "companyName": "Acme",
            "location": "Remote",
            "tags": tags,
            "status": "active"
        }))
        .unwrap()
    }

    fn documents() -> StaticDocuments {
        StaticDocuments(HashMap::from([(
            "cvs/alice.txt".to_string(),
            "React and Node developer".to_string(),
        )]))
    }

    #[tokio::test]
    async fn test_offline_analysis_with_ranked_suggestions() {
        let store = MemoryStore::new();
        let cache = CacheOrchestrator::new(Arc::new(MemoryCache::new()));
        for j in [
            job("target", &["React", "Node"]),
            job("one", &["React", "Python"]),
            job("two", &["react", "nodejs", "aws"]),
        ] {
            put_record(&store, &j).await.unwrap();
        }
        let docs = documents();
        let scorer = CompatibilityScorer::offline();

        let deps = AnalysisDeps {
            store: &store,
            cache: &cache,
            documents: &docs,
            scorer: &scorer,
        };
        let response = analyze_cv(deps, "target", "cvs/alice.txt").await.unwrap();

        assert_eq!(response.analysis.source, AnalysisSource::Fallback);
        assert_eq!(response.analysis.matching_skills, vec!["React", "Node"]);
        let ids: Vec<&str> = response
            .suggested_jobs
            .iter()
            .map(|s| s.job_id.as_str())
            .collect();
        assert_eq!(ids, vec!["two", "one"]);
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let store = MemoryStore::new();
        let cache = CacheOrchestrator::new(Arc::new(MemoryCache::new()));
        let docs = documents();
        let scorer = CompatibilityScorer::offline();
        let deps = AnalysisDeps {
            store: &store,
            cache: &cache,
            documents: &docs,
            scorer: &scorer,
        };
        let result = analyze_cv(deps, "ghost", "cvs/alice.txt").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_document_surfaces() {
        let store = MemoryStore::new();
        let cache = CacheOrchestrator::new(Arc::new(MemoryCache::new()));
        put_record(&store, &job("target", &["React"])).await.unwrap();
        let docs = documents();
        let scorer = CompatibilityScorer::offline();
        let deps = AnalysisDeps {
            store: &store,
            cache: &cache,
            documents: &docs,
            scorer: &scorer,
        };
        let result = analyze_cv(deps, "target", "cvs/missing.pdf").await;
        assert!(matches!(result, Err(AppError::DocumentUnavailable(_))));
    }

    #[tokio::test]
    async fn test_pool_failure_yields_no_suggestions() {
        let store = MemoryStore::new();
        store.set_failing(true);
        let suggestions = suggest_alternatives(&store, &["react".to_string()], "x").await;
        assert!(suggestions.is_empty());
    }
}
