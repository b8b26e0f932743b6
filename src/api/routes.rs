//! API route configuration.

use crate::api::handlers::{decode_handler, encode_handler, health_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Public API routes.
///
/// # Endpoints
///
/// - `POST /encode` - Shorten an origin URL
/// - `POST /decode` - Resolve a short URL back to its origin
/// - `GET  /up`     - Health check
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/encode", post(encode_handler))
        .route("/decode", post(decode_handler))
        .route("/up", get(health_handler))
}
