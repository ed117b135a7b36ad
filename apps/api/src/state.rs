use std::sync::Arc;
use std::time::Instant;

use crate::companies::directory::CompanyDirectory;
use crate::config::Config;
use crate::ml_client::MlService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// External parse/recommend service. `MlClient` in production, fakes in tests.
    pub ml: Arc<dyn MlService>,
    /// Immutable company fixture.
    pub companies: Arc<CompanyDirectory>,
    pub started_at: Instant,
}
