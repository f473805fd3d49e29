use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use taste_blend_api::{
    api::{create_router, AppState},
    config::Config,
    services::providers::{gemini::GeminiClient, qloo::QlooClient},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taste_blend_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let graph = QlooClient::new(
        config.taste_graph_api_key.clone(),
        config.taste_graph_api_url.clone(),
        config.upstream_timeout(),
    )?;
    let generator = GeminiClient::new(
        config.generator_api_key.clone(),
        config.generator_api_url.clone(),
        config.generator_model.clone(),
        config.upstream_timeout(),
    )?;

    let state = AppState::new(
        Arc::new(graph),
        Arc::new(generator),
        config.pipeline_settings(),
    );
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        address = %addr,
        model = %config.generator_model,
        max_concurrency = config.max_concurrency,
        "Server running"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
