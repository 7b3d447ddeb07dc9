// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Wagate messaging gateway.
//!
//! Exposes the dispatch pipeline, chat history, and instance status over a
//! small REST API guarded by a bearer token, plus an unauthenticated
//! health endpoint.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use error::ApiError;
pub use server::{router, start_server, GatewayState, HealthState, ServerConfig};
