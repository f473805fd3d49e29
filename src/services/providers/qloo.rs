/// Qloo taste graph provider
///
/// API Flow:
/// 1. Entity search: /search → best matching entity ID for a name and entity type
/// 2. Insights: /v2/insights → entities recommended for a comma-joined seed signal
use crate::{
    error::{AppError, AppResult},
    models::{
        upstream::{InsightsResponse, SearchResponse},
        EntityType, InsightEntity, InsightsQuery, SearchHit,
    },
    services::providers::TasteGraph,
};
use reqwest::Client as HttpClient;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct QlooClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl QlooClient {
    /// Creates a client whose every request is bounded by `timeout`
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Query parameters for an insights request
    fn insights_params(query: &InsightsQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("filter.type", query.entity_type.urn().to_string()),
            ("signal.interests.entities", query.signal_param()),
            ("take", query.take.to_string()),
        ];
        if let Some(min_popularity) = query.min_popularity {
            params.push(("filter.popularity.min", min_popularity.to_string()));
        }
        params
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);
        let response = self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable(format!(
                "Qloo API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        tracing::debug!(path = %path, response = %response_text, "Raw Qloo API response");

        serde_json::from_str(&response_text).map_err(|e| {
            AppError::UpstreamUnavailable(format!("Failed to parse Qloo response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl TasteGraph for QlooClient {
    async fn search(
        &self,
        query: &str,
        entity_type: EntityType,
        limit: u32,
    ) -> AppResult<Vec<SearchHit>> {
        let params = [
            ("query", query.to_string()),
            ("filter.type", entity_type.urn().to_string()),
            ("limit", limit.to_string()),
        ];
        let response: SearchResponse = self.get("/search", &params).await?;

        tracing::debug!(
            query = %query,
            entity_type = %entity_type,
            results = response.results.len(),
            provider = "qloo",
            "Entity search completed"
        );

        Ok(response.results)
    }

    async fn insights(&self, query: &InsightsQuery) -> AppResult<Vec<InsightEntity>> {
        let params = Self::insights_params(query);
        let response: InsightsResponse = self.get("/v2/insights", &params).await?;

        tracing::debug!(
            entity_type = %query.entity_type,
            seeds = query.signal.len(),
            results = response.results.entities.len(),
            provider = "qloo",
            "Insights fetched"
        );

        Ok(response.results.entities)
    }

    fn name(&self) -> &'static str {
        "qloo"
    }
}
