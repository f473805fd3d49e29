use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Preference-driven recommendations
        .route("/save-preferences", post(handlers::save_preferences))
        .route("/daily-recommendations", post(handlers::daily_recommendations))
        .route("/blend-recommendations", post(handlers::blend_recommendations))
        // Community journeys
        .route(
            "/community-recommendations",
            post(handlers::community_recommendations),
        )
        .route(
            "/mismatch-walkin-their-shoes-gemini",
            post(handlers::walk_in_their_shoes),
        )
        .route(
            "/discover-journey-card-recommendations",
            post(handlers::journey_card_recommendations),
        )
        .route(
            "/contrast-recommendations",
            post(handlers::contrast_recommendations),
        )
        // Generated metadata
        .route("/get-item-details", post(handlers::get_item_details))
        .route("/describe-titles", post(handlers::describe_titles))
        // Outermost first: the request id exists before the trace span is made
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}
