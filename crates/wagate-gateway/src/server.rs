// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use wagate_core::{MessageStore, WagateError};
use wagate_dispatch::DispatchPipeline;
use wagate_registry::InstanceRegistry;

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub pipeline: Arc<DispatchPipeline>,
    pub registry: Arc<InstanceRegistry>,
    pub store: Arc<dyn MessageStore>,
    pub auth: AuthConfig,
    pub health: HealthState,
    /// Parent of every per-request dispatch token. Cancelling it abandons
    /// sends still waiting for a network acknowledgment.
    pub cancel: CancellationToken,
}

/// Gateway listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Build the gateway router.
///
/// Routes:
/// - GET /health (public)
/// - POST /{instance_id}/chat/send/text (auth)
/// - GET /{instance_id}/chat/messages (auth)
/// - GET /{instance_id}/status (auth)
pub fn router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/{instance_id}/chat/send/text", post(handlers::send_text))
        .route("/{instance_id}/chat/messages", get(handlers::chat_messages))
        .route("/{instance_id}/status", get(handlers::instance_status))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Serve the gateway until `shutdown` is cancelled.
///
/// In-flight requests are allowed to finish after shutdown starts.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), WagateError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| WagateError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!(%addr, "gateway server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| WagateError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway server stopped");
    Ok(())
}
