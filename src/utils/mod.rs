//! Helpers for request handling.
//!
//! - [`url_validator`] - Origin URL validation and the decode-path domain check
//! - [`request_origin`] - Client identifier and base URL extraction from headers

pub mod request_origin;
pub mod url_validator;
