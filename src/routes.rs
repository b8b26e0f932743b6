//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /encode` - Shorten a URL
//! - `POST /decode` - Resolve a short URL
//! - `GET  /up`     - Health check
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Abuse prevention** - Per-client throttle and blocklist, evaluated
//!   before any handler runs
//!
//! Trailing-slash normalization wraps the router in [`crate::server`].

use crate::api;
use crate::api::middleware::{abuse, tracing};
use crate::state::AppState;
use axum::{Router, middleware};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(api::routes::public_routes())
        .layer(middleware::from_fn_with_state(state.clone(), abuse::layer))
        .with_state(state)
        .layer(tracing::layer())
}
