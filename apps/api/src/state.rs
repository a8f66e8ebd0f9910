use crate::applicants::ApplicantStore;
use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Dual-store controller over the relational and vector backends.
    pub applicants: ApplicantStore,
    pub config: Config,
}
