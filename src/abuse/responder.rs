//! HTTP responses for throttled and blocked clients.

use axum::{
    Json,
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Why the gatekeeper turned a request away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Throttled {
        limit: u32,
        /// Seconds until the client's window resets.
        retry_after: u64,
        /// Epoch seconds at which the window resets.
        reset_at: i64,
    },
    Banned,
}

/// Body rendered for a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbuseBody {
    pub error: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// Fully formatted rejection: status, rate-limit headers and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbuseResponse {
    pub status: StatusCode,
    pub headers: Vec<(HeaderName, String)>,
    pub body: AbuseBody,
}

impl AbuseResponse {
    pub fn from_rejection(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Throttled {
                limit,
                retry_after,
                reset_at,
            } => Self {
                status: StatusCode::TOO_MANY_REQUESTS,
                headers: vec![
                    (
                        HeaderName::from_static("x-ratelimit-limit"),
                        limit.to_string(),
                    ),
                    (
                        HeaderName::from_static("x-ratelimit-remaining"),
                        "0".to_string(),
                    ),
                    (
                        HeaderName::from_static("x-ratelimit-reset"),
                        reset_at.to_string(),
                    ),
                    (header::RETRY_AFTER, retry_after.to_string()),
                ],
                body: AbuseBody {
                    error: "Rate limit exceeded",
                    message: "Too many requests. Please try again later.",
                    retry_after: Some(retry_after),
                },
            },
            Rejection::Banned => Self {
                status: StatusCode::FORBIDDEN,
                headers: Vec::new(),
                body: AbuseBody {
                    error: "Forbidden",
                    message: "Your IP has been blocked",
                    retry_after: None,
                },
            },
        }
    }
}

impl From<Rejection> for AbuseResponse {
    fn from(rejection: Rejection) -> Self {
        Self::from_rejection(rejection)
    }
}

impl IntoResponse for AbuseResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();

        let headers = response.headers_mut();
        for (name, value) in self.headers {
            if let Ok(value) = HeaderValue::from_str(&value) {
                headers.insert(name, value);
            }
        }

        response
    }
}
