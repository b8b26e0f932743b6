//! Per-client throttling and blocklist middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use tracing::{error, warn};

use crate::abuse::{AbuseResponse, Decision};
use crate::state::AppState;
use crate::utils::request_origin::client_ip;

/// Gatekeeps every request before routing.
///
/// # Flow
///
/// 1. Identify the client (peer IP, or forwarded headers behind a proxy)
/// 2. Reject banned clients with `403 Forbidden`
/// 3. Reject clients over their window with `429 Too Many Requests`;
///    enough of these within the find-time window bans the client
/// 4. Otherwise continue to the handler
///
/// Passes everything through when abuse protection is disabled.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .merge(api::routes::public_routes())
///     .layer(middleware::from_fn_with_state(state.clone(), abuse::layer));
/// ```
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let Some(gatekeeper) = st.gatekeeper.as_ref() else {
        return next.run(req).await;
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let ip = client_ip(req.headers(), peer, st.behind_proxy);

    let decision = gatekeeper.check(&ip);
    let Some(rejection) = decision.rejection() else {
        return next.run(req).await;
    };

    let path = req.uri().path();
    match decision {
        Decision::Banned { until } => {
            error!(%ip, path, rule = "blocklist", %until, "Rejected banned client");
            metrics::counter!("abuse_rejections_total", "rule" => "blocklist").increment(1);
        }
        Decision::Throttled {
            limit,
            retry_after,
            banned_until,
            ..
        } => {
            warn!(%ip, path, rule = "throttle", limit, retry_after, "Throttled client");
            metrics::counter!("abuse_rejections_total", "rule" => "throttle").increment(1);

            if let Some(until) = banned_until {
                warn!(%ip, %until, "Client banned after repeated throttling");
                metrics::counter!("abuse_bans_total").increment(1);
            }
        }
        Decision::Allowed { .. } => {}
    }

    AbuseResponse::from_rejection(rejection).into_response()
}
