// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer token middleware for the API routes.
//!
//! When no token is configured, all requests are rejected (fail-closed).

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};

/// Authentication configuration for the gateway.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected bearer token. `None` rejects every API request.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Middleware that checks `Authorization: Bearer <token>`.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = auth.bearer_token.as_deref() else {
        tracing::error!("gateway has no bearer token configured -- rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected => Ok(next.run(request).await),
        _ => {
            tracing::debug!(path = %request.uri().path(), "bearer auth rejected");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
