//! Syntactic URL checks for the encode and decode paths.
//!
//! Neither check touches the network: no DNS, no fetching.

use url::Url;
use validator::ValidationError;

/// Why a candidate short URL was turned away on the decode path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShortUrlError {
    #[error("URL could not be parsed")]
    Malformed,

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL host does not match the configured domain")]
    HostMismatch,
}

/// Checks that `candidate` is an absolute HTTP(S) URL served by `domain`.
///
/// Host comparison is ASCII case-insensitive and ignores the port.
/// Malformed input is an ordinary `Err`, never a panic.
///
/// # Examples
///
/// ```
/// use shorten_api::utils::url_validator::{validate_short_url, ShortUrlError};
///
/// assert!(validate_short_url("http://localhost/abc123", "localhost").is_ok());
/// assert_eq!(
///     validate_short_url("http://unauthorized.com/abcd", "localhost"),
///     Err(ShortUrlError::HostMismatch)
/// );
/// ```
pub fn validate_short_url(candidate: &str, domain: &str) -> Result<Url, ShortUrlError> {
    let url = Url::parse(candidate).map_err(|_| ShortUrlError::Malformed)?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ShortUrlError::UnsupportedProtocol);
    }

    match url.host_str() {
        Some(host) if host.eq_ignore_ascii_case(domain) => Ok(url),
        _ => Err(ShortUrlError::HostMismatch),
    }
}

/// The code carried by a short URL: everything after its last `/`.
pub fn short_code(short_url: &str) -> &str {
    short_url.rsplit('/').next().unwrap_or(short_url)
}

/// Validates an origin URL submitted for shortening.
///
/// Accepts absolute HTTP(S) URLs with a host.
///
/// # Errors
///
/// - `blank` - `"Origin url can't be blank"`
/// - `invalid` - `"Origin url is invalid"`
pub fn validate_origin_url(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Origin url can't be blank".into()));
    }

    let valid = Url::parse(value).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
    });

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid").with_message("Origin url is invalid".into()))
    }
}
