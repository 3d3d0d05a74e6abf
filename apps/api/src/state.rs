use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::Cache;
use crate::documents::store::DocumentStore;
use crate::lightcast::LightcastClient;
use crate::llm_client::CompletionProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: Cache,
    /// Generated PDFs. S3 in production.
    pub documents: Arc<dyn DocumentStore>,
    /// OpenRouter in production; tests plug in scripted providers.
    pub llm: Arc<dyn CompletionProvider>,
    pub lightcast: Arc<LightcastClient>,
}
