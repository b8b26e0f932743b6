//! Handlers for the encode and decode endpoints.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
};
use tracing::debug;
use validator::Validate;

use crate::api::dto::shorten::{DecodeRequest, DecodeResponse, EncodeRequest, EncodeResponse};
use crate::api::extract::Params;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::request_origin::base_url_from_request;
use crate::utils::url_validator::{short_code, validate_short_url};

/// Shortens an origin URL.
///
/// # Endpoint
///
/// `POST /encode`
///
/// # Request Body
///
/// ```json
/// { "url": "https://www.example.com" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "short_url": "http://localhost/86Rf07" }
/// ```
///
/// Repeating the request returns the same `short_url`.
///
/// # Errors
///
/// - `400` - blank or invalid origin URL
/// - `500` - storage failure
pub async fn encode_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Params(payload): Params<EncodeRequest>,
) -> Result<(StatusCode, Json<EncodeResponse>), AppError> {
    payload.validate()?;

    let code = state.shorten_service.encode(&payload.url).await?;

    let base_url = match state.base_url {
        Some(ref base_url) => base_url.clone(),
        None => base_url_from_request(&headers, &uri, state.behind_proxy)?,
    };

    Ok((
        StatusCode::CREATED,
        Json(EncodeResponse {
            short_url: format!("{base_url}/{code}"),
        }),
    ))
}

/// Resolves a short URL issued by this service.
///
/// # Endpoint
///
/// `POST /decode`
///
/// # Request Body
///
/// ```json
/// { "url": "http://localhost/86Rf07" }
/// ```
///
/// The host must equal `DOMAIN_NAME`; the code is the last segment of the
/// parsed path. Query and fragment are ignored, and a trailing `/` leaves an
/// empty code, which is reported as not found.
///
/// # Response
///
/// ```json
/// { "origin_url": "https://www.example.com" }
/// ```
///
/// # Errors
///
/// - `400` - `{"error": "URL is invalid"}` for malformed URLs or a foreign host
/// - `404` - `{"error": "Record not found"}` for unknown or undecodable codes
pub async fn decode_handler(
    State(state): State<AppState>,
    Params(payload): Params<DecodeRequest>,
) -> Result<Json<DecodeResponse>, AppError> {
    let short_url = validate_short_url(&payload.url, &state.domain_name).map_err(|reason| {
        debug!(url = %payload.url, %reason, "Rejected short URL");
        AppError::bad_request("URL is invalid")
    })?;

    let record = state
        .shorten_service
        .decode(short_code(short_url.path()))
        .await?;

    Ok(Json(DecodeResponse {
        origin_url: record.origin_url,
    }))
}
