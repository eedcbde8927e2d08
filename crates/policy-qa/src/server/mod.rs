//! HTTP server for the policy assistant

pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use state::AppState;

/// Policy HTTP server
pub struct PolicyServer {
    config: AppConfig,
    state: AppState,
}

impl PolicyServer {
    /// Create a new server
    pub fn new(config: AppConfig) -> Self {
        let state = AppState::new(config.clone());
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        build_router(&self.config, self.state.clone())
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::config(format!("Invalid address: {}", e)))?;

        let router = self.router();
        self.state.spawn_session_sweeper();

        tracing::info!("Starting policy server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Routes, state and middleware
pub fn build_router(config: &AppConfig, state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", routes::api_routes(config.server.max_upload_size))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.server.enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
