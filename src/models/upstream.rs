use serde::{Deserialize, Serialize};

use super::{EntityId, EntityType};

// ============================================================================
// Taste Graph API Types
// ============================================================================

/// API response from GET /search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl SearchHit {
    /// The hit's identifier, if it carries a usable one
    pub fn canonical_id(&self) -> Option<EntityId> {
        self.entity_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(EntityId::new)
    }
}

/// API response from GET /v2/insights
#[derive(Debug, Clone, Deserialize)]
pub struct InsightsResponse {
    #[serde(default)]
    pub results: InsightsResults,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightsResults {
    #[serde(default)]
    pub entities: Vec<InsightEntity>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InsightEntity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub properties: EntityProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntityProperties {
    #[serde(default)]
    pub image: Option<EntityImage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityImage {
    #[serde(default)]
    pub url: Option<String>,
}

/// One recommendation request against the taste graph
#[derive(Debug, Clone, PartialEq)]
pub struct InsightsQuery {
    pub entity_type: EntityType,
    pub signal: Vec<EntityId>,
    pub take: u32,
    pub min_popularity: Option<f64>,
}

impl InsightsQuery {
    /// Seed identifiers joined into the `signal.interests.entities` parameter
    pub fn signal_param(&self) -> String {
        self.signal
            .iter()
            .map(EntityId::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

// ============================================================================
// Generative Text API Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        Some(text)
    }
}
