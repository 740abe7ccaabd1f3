//! Fetch engine: runs store-issued requests against a rate provider.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::provider::RateProvider;
use crate::store::{FetchCompletion, FetchRequest};

/// Executes [`FetchRequest`]s against a provider.
///
/// The engine holds no state of its own, so one instance can serve many
/// concurrent fetches; results go back to the store as completions.
#[derive(Clone)]
pub struct RateEngine {
    provider: Arc<dyn RateProvider>,
}

impl RateEngine {
    /// Create a new engine over `provider`.
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        Self { provider }
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run one fetch to completion.
    #[instrument(skip(self, request), fields(
        provider = %self.provider.name(),
        base = %request.base,
        fetch_id = %request.id
    ))]
    pub async fn execute(&self, request: FetchRequest) -> FetchCompletion {
        let outcome = self.provider.fetch_rates(&request.base).await;
        debug!(ok = outcome.is_ok(), "Fetch finished");

        FetchCompletion { request, outcome }
    }
}
