//! HTTP surface: download streaming plus the metadata-only action.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::core::registry::ResolverRegistry;
use crate::error::{ApiError, GatewayError};
use crate::platforms::twitter::TwitterResolver;
use crate::platforms::youtube::YouTubeResolver;

pub mod routes;
pub mod state;

pub use state::AppState;

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let api: ApiError = self.into();
        (status, Json(api)).into_response()
    }
}

pub fn create_router(registry: Arc<ResolverRegistry>) -> Router {
    let state = AppState::new(registry);

    Router::new()
        .route("/download", get(routes::download_youtube))
        .route("/download/twitter", get(routes::download_twitter))
        .route("/metadata", get(routes::video_metadata))
        .route("/health", get(routes::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Builds the resolver set once (the resolvers, including the YouTube
/// session, live for the whole process) and serves until shutdown.
pub async fn start(config: Config) -> anyhow::Result<()> {
    let mut registry = ResolverRegistry::new();
    registry.register(Arc::new(YouTubeResolver::new(config.request_timeout())));
    registry.register(Arc::new(TwitterResolver::new(config.ytdlp_path.clone())));

    let app = create_router(Arc::new(registry));

    let listener = TcpListener::bind(config.bind_address).await?;
    tracing::info!(address = %config.bind_address, "vidgate listening");

    axum::serve(listener, app).await?;

    Ok(())
}
