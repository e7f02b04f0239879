//! Axum router setup and server loop.

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::handler::chunklist::chunklist_handler;
use crate::handler::playlist::{self, playlist_handler, CorsPolicy};
use crate::state::AppState;

/// Create the router with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    info!(
        auth = playlist::auth(),
        query = ?playlist::validate().query,
        "registering playlist routes"
    );

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/playlist.m3u8", get(playlist_handler))
        .route("/chunklist.m3u8", get(chunklist_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&playlist::cors()))
        .with_state(state)
}

fn cors_layer(policy: &CorsPolicy) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET]);
    if policy.origin.contains(&"*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = policy
            .origin
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

/// Run the HTTP server until it is shut down.
pub async fn run_http_server(config: &Config, router: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.listen).await?;

    info!("Listening on {}", config.listen);

    axum::serve(listener, router).await
}
