use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{
    error::{AppError, AppResult},
    models::{
        normalize_category, CategoryRecommendations, EntityType, GroupedRecommendations,
        JourneyCards, RecommendationItem, TitleDescription, TitleRequest,
    },
    services::aggregator::{COMMUNITY_TAKE, SINGLE_TAKE},
};

use super::AppState;

const DEFAULT_CATEGORY: &str = "movies";
const DEFAULT_ARCHETYPE: &str = "Taste Explorer";
const SUCCESS: &str = "success";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_archetype() -> String {
    DEFAULT_ARCHETYPE.to_string()
}

fn required<'a>(value: &'a str, field: &str) -> AppResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    Ok(value)
}

// Request/Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePreferencesRequest {
    pub preferences: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_category")]
    pub active_category: String,
}

#[derive(Debug, Serialize)]
pub struct GroupedResponse {
    pub status: &'static str,
    pub recommendations: GroupedRecommendations,
}

#[derive(Debug, Deserialize)]
pub struct ItemDetailsRequest {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ItemDetailsResponse {
    pub status: &'static str,
    pub details: Value,
}

#[derive(Debug, Deserialize)]
pub struct DailyRecommendationsRequest {
    #[serde(default)]
    pub mood: String,
    /// Genres the user likes, per activity
    #[serde(default)]
    pub preferences: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub status: &'static str,
    pub recommendations: CategoryRecommendations,
}

#[derive(Debug, Deserialize)]
pub struct CommunityRequest {
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_archetype")]
    pub archetype: String,
}

#[derive(Debug, Serialize)]
pub struct CommunityResponse {
    pub status: &'static str,
    pub category: String,
    pub archetype: String,
    pub recommendations: Vec<RecommendationItem>,
}

#[derive(Debug, Deserialize)]
pub struct ArchetypeRequest {
    #[serde(default = "default_archetype")]
    pub archetype: String,
}

#[derive(Debug, Serialize)]
pub struct JourneyCardsResponse {
    pub status: &'static str,
    pub archetype: String,
    pub journey_cards: JourneyCards,
}

#[derive(Debug, Deserialize)]
pub struct JourneyItemRequest {
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub status: &'static str,
    pub recommendations: Vec<RecommendationItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendRequest {
    #[serde(default)]
    pub user_preferences: Value,
    #[serde(default)]
    pub friend_preferences: Value,
    #[serde(default)]
    pub selected_activities: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BlendResponse {
    pub status: &'static str,
    pub recommendations: Vec<RecommendationItem>,
    pub activity: String,
    pub all_entity_ids: String,
}

#[derive(Debug, Serialize)]
pub struct ContrastResponse {
    pub status: &'static str,
    pub archetype: String,
    pub recommendations: CategoryRecommendations,
}

#[derive(Debug, Deserialize)]
pub struct DescribeTitlesRequest {
    pub titles: Vec<TitleRequest>,
}

#[derive(Debug, Serialize)]
pub struct DescribeTitlesResponse {
    pub status: &'static str,
    pub descriptions: Vec<TitleDescription>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "healthy" })))
}

/// Grouped recommendations in the active category from the user's saved preferences
pub async fn save_preferences(
    State(state): State<AppState>,
    Json(request): Json<SavePreferencesRequest>,
) -> AppResult<Json<GroupedResponse>> {
    let active_category = required(&request.active_category, "activeCategory")?;
    if EntityType::from_category(active_category).is_none() {
        return Err(AppError::UnknownCategory(active_category.to_string()));
    }

    let examples = state.examples.preference_examples(&request.preferences).await;
    let recommendations = state
        .aggregator
        .resolve_preferences_to_recommendations(&examples, active_category)
        .await?;

    Ok(Json(GroupedResponse {
        status: SUCCESS,
        recommendations,
    }))
}

/// Generated metadata for one title
pub async fn get_item_details(
    State(state): State<AppState>,
    Json(request): Json<ItemDetailsRequest>,
) -> AppResult<Json<ItemDetailsResponse>> {
    let category = required(&request.category, "category")?;
    let name = required(&request.name, "name")?;

    let details = state.enricher().item_details(category, name).await;

    Ok(Json(ItemDetailsResponse {
        status: SUCCESS,
        details,
    }))
}

/// One recommendation per activity suited to the user's mood and genres
pub async fn daily_recommendations(
    State(state): State<AppState>,
    Json(request): Json<DailyRecommendationsRequest>,
) -> AppResult<Json<CategoryResponse>> {
    let mood = required(&request.mood, "mood")?;

    let mood_examples = state.examples.mood_activities(mood).await?;
    let activities: Vec<String> = mood_examples.keys().cloned().collect();

    let genres: BTreeMap<String, Vec<String>> = request
        .preferences
        .into_iter()
        .map(|(activity, genres)| (normalize_category(&activity), genres))
        .filter(|(activity, genres)| !genres.is_empty() && activities.contains(activity))
        .collect();
    let genre_examples = state.examples.genre_examples(&genres).await;

    let recommendations = state
        .aggregator
        .merge_and_aggregate_by_activity(&mood_examples, &genre_examples, &activities)
        .await?;

    Ok(Json(CategoryResponse {
        status: SUCCESS,
        recommendations,
    }))
}

/// Recommendations seeded by a title a community enjoys
///
/// Generation or resolution trouble yields an empty list, not an error.
pub async fn community_recommendations(
    State(state): State<AppState>,
    Json(request): Json<CommunityRequest>,
) -> AppResult<Json<CommunityResponse>> {
    let category = normalize_category(&request.category);
    if EntityType::from_category(&category).is_none() {
        return Err(AppError::UnknownCategory(request.category));
    }

    let recommendations = match state
        .examples
        .community_example(&request.archetype, &category)
        .await
    {
        Some(example) => {
            state
                .aggregator
                .seed_recommendations(&example, &category, COMMUNITY_TAKE)
                .await?
        }
        None => Vec::new(),
    };

    Ok(Json(CommunityResponse {
        status: SUCCESS,
        category,
        archetype: request.archetype,
        recommendations,
    }))
}

/// Morning, afternoon and night cards from another community
pub async fn walk_in_their_shoes(
    State(state): State<AppState>,
    Json(request): Json<ArchetypeRequest>,
) -> AppResult<Json<JourneyCardsResponse>> {
    let journey_cards = state.examples.journey_cards(&request.archetype).await?;

    Ok(Json(JourneyCardsResponse {
        status: SUCCESS,
        archetype: request.archetype,
        journey_cards,
    }))
}

/// A single recommendation seeded by a journey card's item
pub async fn journey_card_recommendations(
    State(state): State<AppState>,
    Json(request): Json<JourneyItemRequest>,
) -> AppResult<Json<ItemsResponse>> {
    let item = required(&request.item, "item")?;
    let category = required(&request.category, "category")?;

    let recommendations = state
        .aggregator
        .seed_recommendations(item, category, SINGLE_TAKE)
        .await?;

    Ok(Json(ItemsResponse {
        status: SUCCESS,
        recommendations,
    }))
}

/// Enriched recommendations blending the user's and their friends' tastes
pub async fn blend_recommendations(
    State(state): State<AppState>,
    Json(request): Json<BlendRequest>,
) -> AppResult<Json<BlendResponse>> {
    let activity = request
        .selected_activities
        .first()
        .map(|activity| activity.trim())
        .filter(|activity| !activity.is_empty())
        .ok_or_else(|| AppError::InvalidInput("selectedActivities is required".to_string()))?;
    if EntityType::from_category(activity).is_none() {
        return Err(AppError::UnknownCategory(activity.to_string()));
    }

    let examples = state
        .examples
        .blend_examples(&request.user_preferences, &request.friend_preferences, activity)
        .await;

    let outcome = state
        .aggregator
        .blend_across_people(
            &examples.user_preference_example,
            &examples.friend_preference_example,
            activity,
        )
        .await?;

    Ok(Json(BlendResponse {
        status: SUCCESS,
        recommendations: outcome.recommendations,
        activity: activity.to_string(),
        all_entity_ids: outcome.signal,
    }))
}

/// One recommendation per category, seeded by titles contrasting with an archetype
pub async fn contrast_recommendations(
    State(state): State<AppState>,
    Json(request): Json<ArchetypeRequest>,
) -> AppResult<Json<ContrastResponse>> {
    let examples = state.examples.contrasting_examples(&request.archetype).await;
    let recommendations = state.aggregator.contrast_recommendations(&examples).await;

    Ok(Json(ContrastResponse {
        status: SUCCESS,
        archetype: request.archetype,
        recommendations,
    }))
}

/// Short descriptions for a batch of titles
pub async fn describe_titles(
    State(state): State<AppState>,
    Json(request): Json<DescribeTitlesRequest>,
) -> AppResult<Json<DescribeTitlesResponse>> {
    if request.titles.is_empty() {
        return Err(AppError::InvalidInput("titles must not be empty".to_string()));
    }

    let descriptions = state.enricher().describe_titles(&request.titles).await;

    Ok(Json(DescribeTitlesResponse {
        status: SUCCESS,
        descriptions,
    }))
}
