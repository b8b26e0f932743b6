//! Client identity and public base URL derived from request headers.

use crate::AppError;
use axum::http::{HeaderMap, Uri, header};
use std::net::IpAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_REAL_IP: &str = "x-real-ip";

/// Key used to scope throttle and ban state to one client.
///
/// With `behind_proxy`, the first address in `X-Forwarded-For` wins, then
/// `X-Real-IP`; header values that do not parse as IP addresses are ignored.
/// Otherwise only the socket peer address is trusted. Requests with no
/// identifiable address share the key `"unknown"`, so they are still limited.
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, behind_proxy: bool) -> String {
    if behind_proxy {
        let forwarded = header_str(headers, X_FORWARDED_FOR)
            .and_then(|v| v.split(',').next())
            .and_then(parse_ip);
        let real = header_str(headers, X_REAL_IP).and_then(parse_ip);

        if let Some(ip) = forwarded.or(real) {
            return ip.to_string();
        }
    }

    peer.map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// `<scheme>://<host[:port]>` under which this request reached the service.
///
/// The host comes from the `Host` header, falling back to the request URI's
/// authority. The scheme is `X-Forwarded-Proto` when `behind_proxy` is set
/// and the header names HTTP or HTTPS, else `http`.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if no host can be determined or the
/// `Host` header is not valid UTF-8.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert(header::HOST, "sho.rt:8080".parse().unwrap());
///
/// let base = base_url_from_request(&headers, &Uri::from_static("/encode"), false).unwrap();
/// assert_eq!(base, "http://sho.rt:8080");
/// ```
pub fn base_url_from_request(
    headers: &HeaderMap,
    uri: &Uri,
    behind_proxy: bool,
) -> Result<String, AppError> {
    let host = match headers.get(header::HOST) {
        Some(value) => value
            .to_str()
            .map_err(|_| AppError::bad_request("Invalid Host header"))?
            .to_string(),
        None => uri
            .authority()
            .map(|a| a.as_str().to_string())
            .ok_or_else(|| AppError::bad_request("Missing Host header"))?,
    };

    let scheme = if behind_proxy {
        header_str(headers, X_FORWARDED_PROTO)
            .map(|v| v.split(',').next().unwrap_or(v).trim().to_ascii_lowercase())
            .filter(|p| p == "http" || p == "https")
            .unwrap_or_else(|| "http".to_string())
    } else {
        "http".to_string()
    };

    Ok(format!("{scheme}://{host}"))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn parse_ip(value: &str) -> Option<IpAddr> {
    value.trim().parse().ok()
}
