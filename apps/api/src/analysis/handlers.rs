//! Axum route handlers for CV analysis.

use axum::{extract::State, Json};

use crate::analysis::{analyze_cv, AnalysisDeps, AnalyzeCvRequest, AnalyzeCvResponse};
use crate::errors::AppError;
use crate::state::AppState;

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// POST /api/v1/ai/analyze-cv
///
/// Scores an uploaded CV against a job and suggests similar open jobs.
pub async fn handle_analyze_cv(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeCvRequest>,
) -> Result<Json<AnalyzeCvResponse>, AppError> {
    let (Some(job_id), Some(cv_key)) = (required(request.job_id), required(request.cv_s3_key))
    else {
        return Err(AppError::Validation(
            "jobId and cvS3Key are required".to_string(),
        ));
    };

    let deps = AnalysisDeps {
        store: state.store.as_ref(),
        cache: &state.cache,
        documents: state.documents.as_ref(),
        scorer: &state.scorer,
    };
    let response = analyze_cv(deps, &job_id, &cv_key).await?;

    Ok(Json(response))
}
