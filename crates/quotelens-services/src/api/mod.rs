//! Router, shared state and server loop.

pub mod error;
pub mod handlers;
pub mod render;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use quotelens_core::InferenceService;
use quotelens_types::config::ServerConfig;

/// Shared state accessible by all handlers.
#[derive(Clone)]
pub struct ApiState {
    /// Loaded bundle and classifier.
    pub service: Arc<InferenceService>,
    /// When the router was built, for the health endpoint.
    pub started: Instant,
}

impl ApiState {
    pub fn new(service: Arc<InferenceService>) -> Self {
        Self {
            service,
            started: Instant::now(),
        }
    }
}

/// Build the router with all routes.
pub fn build_router(state: ApiState, server: &ServerConfig) -> Router {
    let cors = if server.cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = server
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(handlers::page_routes())
        .nest("/api", handlers::api_routes())
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(server.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `router` on `listener` until Ctrl+C.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "listening -- press Ctrl+C to stop");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received shutdown signal");
        })
        .await
}
