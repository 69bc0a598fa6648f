use std::sync::Arc;

use crate::auth::IdentityClient;
use crate::export::document::DocumentWriter;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub identity: IdentityClient,
    /// Pluggable document renderer. Production: `HttpDocumentWriter`; tests
    /// substitute a stub.
    pub doc_writer: Arc<dyn DocumentWriter>,
}
