use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use gap_finder::api;
use gap_finder::config::Config;
use gap_finder::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("OSDR API: {}", config.osdr.base_url);
    tracing::info!("LLM provider: {} ({})", config.llm.provider, config.llm.base_url);

    let state = AppState::new(config.clone())?;
    tracing::info!("Chat backend: {}", state.chat.backend_name());

    let app = api::router(state)
        .layer(cors_layer(&config.frontend_urls))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Any origin when none are configured, otherwise exactly the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {o}");
                None
            }
        })
        .collect();
    tracing::info!("CORS origins: {}", origins.join(", "));
    layer.allow_origin(AllowOrigin::list(allowed))
}
