pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::admin::handlers as admin;
use crate::analysis::handlers as analysis;
use crate::listings::handlers as listings;
use crate::models::{GovernmentJob, GovernmentJobDraft, Job, JobDraft};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_handler))
        // Public listings
        .route("/jobs", get(listings::handle_list_jobs))
        .route("/jobs/:id", get(listings::handle_get_job))
        .route(
            "/government-jobs",
            get(listings::handle_list_government_jobs),
        )
        .route(
            "/government-jobs/:id",
            get(listings::handle_get_government_job),
        )
        .route("/government-results", get(listings::handle_list_results))
        // CV analysis
        .route("/ai/analyze-cv", post(analysis::handle_analyze_cv))
        // Admin (authenticated upstream)
        .route("/admin/jobs", post(admin::handle_create::<JobDraft>))
        .route(
            "/admin/jobs/bulk",
            post(admin::handle_bulk_create::<JobDraft>),
        )
        .route(
            "/admin/jobs/:id",
            put(admin::handle_update::<Job>).delete(admin::handle_delete::<Job>),
        )
        .route(
            "/admin/government-jobs",
            post(admin::handle_create::<GovernmentJobDraft>),
        )
        .route(
            "/admin/government-jobs/bulk",
            post(admin::handle_bulk_create::<GovernmentJobDraft>),
        )
        .route(
            "/admin/government-jobs/:id",
            put(admin::handle_update::<GovernmentJob>)
                .delete(admin::handle_delete::<GovernmentJob>),
        );

    Router::new().nest("/api/v1", api).with_state(state)
}
