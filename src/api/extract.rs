//! Request body extraction shared by the API handlers.

use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Request parameters read from a JSON or URL-encoded form body.
///
/// The format is chosen by `Content-Type`. A request with neither content
/// type yields `T::default()`, so required fields surface as validation
/// errors rather than as extractor rejections. Malformed bodies are `400`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Params<T>(pub T);

impl<S, T> FromRequest<S> for Params<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request(e.body_text()))?;
            Ok(Self(value))
        } else if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request(e.body_text()))?;
            Ok(Self(value))
        } else {
            Ok(Self(T::default()))
        }
    }
}
