use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use taste_blend_api::{
    api::{create_router, AppState},
    config::PipelineSettings,
    error::{AppError, AppResult},
    models::{EntityType, InsightEntity, InsightsQuery, SamplingConfig, SearchHit},
    services::providers::{TasteGraph, TextGenerator},
};

/// Resolves a fixed set of names and recommends "<signal> #n" for any signal
struct FakeTasteGraph;

#[async_trait::async_trait]
impl TasteGraph for FakeTasteGraph {
    async fn search(
        &self,
        query: &str,
        _entity_type: EntityType,
        _limit: u32,
    ) -> AppResult<Vec<SearchHit>> {
        let id = match query {
            "Heat" => "E-HEAT",
            "Alien" => "E-ALIEN",
            "Serial" => "E-SERIAL",
            "Dune" => "E-DUNE",
            "Flaky" => return Err(AppError::UpstreamUnavailable("503".to_string())),
            _ => return Ok(vec![]),
        };
        Ok(vec![SearchHit {
            entity_id: Some(id.to_string()),
            name: Some(query.to_string()),
        }])
    }

    async fn insights(&self, query: &InsightsQuery) -> AppResult<Vec<InsightEntity>> {
        let signal = query.signal_param();
        Ok((1..=query.take)
            .map(|n| InsightEntity {
                name: Some(format!("{} #{}", signal, n)),
                popularity: Some(0.9),
                ..Default::default()
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "fake-graph"
    }
}

/// Answers each kind of prompt with a canned payload
struct FakeGenerator;

#[async_trait::async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str, _sampling: &SamplingConfig) -> AppResult<String> {
        let answer = if prompt.contains("exactly 2") {
            if prompt.contains("\"Obscure\"") {
                r#"{"recommendations": ["Nowhere", "Nothing"]}"#
            } else {
                "```json\n{\"recommendations\": [\"Heat\", \"Alien\"]}\n```"
            }
        } else if prompt.contains("currently feeling") {
            if prompt.contains("\"numb\"") {
                "I'd rather not say."
            } else {
                r#"{"Movies": "Heat", "podcast": "Serial", "travel": {"city": "Paris"}}"#
            }
        } else if prompt.contains("genre preferences") {
            r#"{"movies": ["Alien"]}"#
        } else if prompt.contains("cultural trends expert") {
            "\"Heat\"\n"
        } else if prompt.contains("cultural journey guide") {
            r#"{
                "morning": {"content": "Listen to this track from the Zen Zest", "item": "Weightless", "archetype": "Zen Zest"},
                "afternoon": {"content": "Try this show from the Zen Zest", "item": "Serial", "archetype": "Zen Zest"},
                "night": {"content": "Watch this film from the Zen Zest", "item": "Heat", "archetype": "Zen Zest"}
            }"#
        } else if prompt.contains("cultural recommendation assistant") {
            r#"{"user_preference_example": "Heat", "friend_preference_example": ["Alien", "Nowhere"]}"#
        } else if prompt.contains("taste contrast engine") {
            r#"Sure! {"movies": "Heat", "books": "Dune", "podcast": "Nowhere"}"#
        } else if prompt.contains("structured knowledge assistant") {
            r#"{"name": "Heat", "genre": "Crime"}"#
        } else if prompt.contains("received a") {
            r#"{"summary": "Good.", "rating": 4.5, "cost": "$"}"#
        } else if prompt.contains("two-line description") {
            r#"[{"title": "The Matrix", "category": "movies", "description": "Simulated reality."}]"#
        } else {
            return Err(AppError::UpstreamUnavailable("unexpected prompt".to_string()));
        };
        Ok(answer.to_string())
    }

    fn name(&self) -> &'static str {
        "fake-generator"
    }
}

fn create_test_server() -> TestServer {
    let state = AppState::new(
        Arc::new(FakeTasteGraph),
        Arc::new(FakeGenerator),
        PipelineSettings::default(),
    );
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let server = create_test_server();

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-123"),
        )
        .await;
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "trace-123"
    );

    let response = server.get("/health").await;
    assert!(response.headers().get("x-request-id").is_some());
}

#[tokio::test]
async fn test_save_preferences_groups_per_seed() {
    let server = create_test_server();

    let response = server
        .post("/save-preferences")
        .json(&json!({
            "preferences": {"movies": ["Inception"]},
            "activeCategory": "movies"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");

    let groups = body["recommendations"]["movies"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].as_array().unwrap().len(), 3);
    assert_eq!(groups[0][0]["name"], "E-HEAT #1");
    assert_eq!(groups[1][0]["name"], "E-ALIEN #1");
}

#[tokio::test]
async fn test_save_preferences_unknown_category() {
    let server = create_test_server();

    let response = server
        .post("/save-preferences")
        .json(&json!({
            "preferences": {"movies": ["Inception"]},
            "activeCategory": "food"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_save_preferences_nothing_resolvable() {
    let server = create_test_server();

    let response = server
        .post("/save-preferences")
        .json(&json!({"preferences": {"movies": ["Obscure"]}}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_daily_recommendations_merges_mood_and_genres() {
    let server = create_test_server();

    let response = server
        .post("/daily-recommendations")
        .json(&json!({
            "mood": "happy",
            "preferences": {"movies": ["Sci-fi"], "books": ["Fantasy"]}
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let recommendations = body["recommendations"].as_object().unwrap();

    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations["movies"][0]["name"], "E-HEAT,E-ALIEN #1");
    assert_eq!(recommendations["movies"].as_array().unwrap().len(), 1);
    assert_eq!(recommendations["podcast"][0]["name"], "E-SERIAL #1");
}

#[tokio::test]
async fn test_daily_recommendations_validation() {
    let server = create_test_server();

    let response = server
        .post("/daily-recommendations")
        .json(&json!({"preferences": {}}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/daily-recommendations")
        .json(&json!({"mood": "numb"}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_community_recommendations() {
    let server = create_test_server();

    let response = server
        .post("/community-recommendations")
        .json(&json!({"archetype": "Retro Soul", "category": "Movies"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["category"], "movies");
    assert_eq!(body["archetype"], "Retro Soul");
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 5);

    let response = server
        .post("/community-recommendations")
        .json(&json!({"category": "food"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_walk_in_their_shoes() {
    let server = create_test_server();

    let response = server
        .post("/mismatch-walkin-their-shoes-gemini")
        .json(&json!({}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["archetype"], "Taste Explorer");
    assert_eq!(body["journey_cards"]["night"]["item"], "Heat");
}

#[tokio::test]
async fn test_journey_card_recommendations() {
    let server = create_test_server();

    let response = server
        .post("/discover-journey-card-recommendations")
        .json(&json!({"item": "Dune", "category": "books"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["recommendations"][0]["name"], "E-DUNE #1");

    let response = server
        .post("/discover-journey-card-recommendations")
        .json(&json!({"item": "Flaky", "category": "books"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["recommendations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_blend_recommendations_are_enriched() {
    let server = create_test_server();

    let response = server
        .post("/blend-recommendations")
        .json(&json!({
            "userPreferences": {"movies": ["Heist"]},
            "friendPreferences": [{"name": "Sam", "movies": ["Horror"]}],
            "selectedActivities": ["movies", "books"]
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["activity"], "movies");
    assert_eq!(body["all_entity_ids"], "E-HEAT,E-ALIEN");

    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 3);
    assert_eq!(recommendations[0]["name"], "E-HEAT,E-ALIEN #1");
    assert_eq!(recommendations[0]["summary"], "Good.");
    assert_eq!(recommendations[0]["rating"], "4.5");
    assert_eq!(recommendations[0]["cost"], "$");
}

#[tokio::test]
async fn test_blend_requires_an_activity() {
    let server = create_test_server();

    let response = server
        .post("/blend-recommendations")
        .json(&json!({"userPreferences": {}, "selectedActivities": []}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_contrast_recommendations() {
    let server = create_test_server();

    let response = server
        .post("/contrast-recommendations")
        .json(&json!({"archetype": "Cottage Noir"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let recommendations = body["recommendations"].as_object().unwrap();
    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations["books"][0]["name"], "E-DUNE #1");
    assert_eq!(recommendations["movies"][0]["name"], "E-HEAT #1");
}

#[tokio::test]
async fn test_get_item_details() {
    let server = create_test_server();

    let response = server
        .post("/get-item-details")
        .json(&json!({"category": "movies", "name": "Heat"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["details"]["genre"], "Crime");

    let response = server
        .post("/get-item-details")
        .json(&json!({"category": "movies"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_describe_titles() {
    let server = create_test_server();

    let response = server
        .post("/describe-titles")
        .json(&json!({"titles": [{"title": "The Matrix", "category": "movies"}]}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["descriptions"][0]["description"], "Simulated reality.");
}
