/// Upstream capability abstractions
///
/// The pipeline talks to two external services: a taste graph (entity search and
/// recommendation insights) and a generative text model. Each is a trait so the
/// pipeline can be driven by the HTTP clients in production and by doubles in tests.
use crate::{
    error::AppResult,
    models::{EntityType, InsightEntity, InsightsQuery, SamplingConfig, SearchHit},
};

pub mod gemini;
pub mod qloo;

/// Trait for taste graph providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TasteGraph: Send + Sync {
    /// Search for entities of `entity_type` by free-text name
    ///
    /// Returns at most `limit` matches, best first.
    async fn search(
        &self,
        query: &str,
        entity_type: EntityType,
        limit: u32,
    ) -> AppResult<Vec<SearchHit>>;

    /// Fetch recommended entities for a combined seed signal
    async fn insights(&self, query: &InsightsQuery) -> AppResult<Vec<InsightEntity>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for generative text providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate raw text for `prompt`
    async fn generate(&self, prompt: &str, sampling: &SamplingConfig) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
