//! Shared application state for request handlers.

use std::sync::Arc;

use crate::abuse::Gatekeeper;
use crate::application::services::ShortenService;

/// Application state shared across all HTTP handlers.
///
/// Cheap to clone: services are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub shorten_service: Arc<ShortenService>,

    /// `None` when abuse protection is disabled.
    pub gatekeeper: Option<Arc<Gatekeeper>>,

    /// Host accepted by `POST /decode`.
    pub domain_name: String,

    /// Fixed prefix for issued short URLs; derived per request when `None`.
    pub base_url: Option<String>,

    /// Trust forwarded headers for client identity and scheme.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(shorten_service: Arc<ShortenService>, domain_name: impl Into<String>) -> Self {
        Self {
            shorten_service,
            gatekeeper: None,
            domain_name: domain_name.into(),
            base_url: None,
            behind_proxy: false,
        }
    }

    pub fn with_gatekeeper(mut self, gatekeeper: Arc<Gatekeeper>) -> Self {
        self.gatekeeper = Some(gatekeeper);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn behind_proxy(mut self, behind_proxy: bool) -> Self {
        self.behind_proxy = behind_proxy;
        self
    }
}
