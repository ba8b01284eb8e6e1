use std::sync::Arc;

use crate::analysis::CompatibilityScorer;
use crate::cache::CacheOrchestrator;
use crate::documents::DocumentSource;
use crate::store::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub cache: CacheOrchestrator,
    /// Uploaded CVs, read by object key.
    pub documents: Arc<dyn DocumentSource>,
    /// Falls back to keyword scoring when no model is configured.
    pub scorer: CompatibilityScorer,
}
