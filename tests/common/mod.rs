#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use shorten_api::abuse::{AbuseConfig, BanRule, Gatekeeper, ManualClock, ThrottleRule};
use shorten_api::application::services::ShortenService;
use shorten_api::codec::{Alphabet, Codec, DEFAULT_MIN_LENGTH};
use shorten_api::domain::entities::{NewUrl, UrlRecord};
use shorten_api::domain::repositories::UrlRepository;
use shorten_api::error::AppError;
use shorten_api::infrastructure::persistence::InMemoryUrlRepository;
use shorten_api::routes::app_router;
use shorten_api::state::AppState;
use std::sync::Arc;
use std::time::Duration;

pub const DOMAIN: &str = "localhost";
pub const BASE_URL: &str = "http://localhost";

/// Repository whose every call fails like an unreachable database.
pub struct FailingRepository;

#[async_trait]
impl UrlRepository for FailingRepository {
    async fn find_by_origin_url(&self, _origin_url: &str) -> Result<Option<UrlRecord>, AppError> {
        Err(AppError::internal("connection refused"))
    }

    async fn create(&self, _new_url: NewUrl) -> Result<UrlRecord, AppError> {
        Err(AppError::internal("connection refused"))
    }

    async fn find_by_id(&self, _id: i64) -> Result<Option<UrlRecord>, AppError> {
        Err(AppError::internal("connection refused"))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::internal("connection refused"))
    }
}

/// Codec with the service's default alphabet and minimum length.
pub fn default_codec() -> Codec {
    Codec::new(Alphabet::default(), DEFAULT_MIN_LENGTH).unwrap()
}

pub fn create_test_state(repository: Arc<dyn UrlRepository>) -> AppState {
    create_test_state_with_codec(repository, default_codec())
}

pub fn create_test_state_with_codec(repository: Arc<dyn UrlRepository>, codec: Codec) -> AppState {
    let service = Arc::new(ShortenService::new(repository, Arc::new(codec)));
    AppState::new(service, DOMAIN).with_base_url(BASE_URL)
}

pub fn abuse_config(limit: u32, max_retry: u32) -> AbuseConfig {
    AbuseConfig {
        throttle: ThrottleRule {
            limit,
            period: Duration::from_secs(300),
        },
        ban: BanRule {
            max_retry,
            find_time: Duration::from_secs(1800),
            ban_time: Duration::from_secs(43_200),
        },
    }
}

/// Server on an in-memory store with abuse protection disabled.
pub fn create_test_server() -> (TestServer, Arc<InMemoryUrlRepository>) {
    let repository = Arc::new(InMemoryUrlRepository::new());
    let state = create_test_state(repository.clone());

    (TestServer::new(app_router(state)).unwrap(), repository)
}

/// Server with a gatekeeper driven by a manual clock.
pub fn create_guarded_server(config: AbuseConfig, behind_proxy: bool) -> (TestServer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let gatekeeper = Arc::new(Gatekeeper::new(config, clock.clone()));

    let state = create_test_state(Arc::new(InMemoryUrlRepository::new()))
        .with_gatekeeper(gatekeeper)
        .behind_proxy(behind_proxy);

    (TestServer::new(app_router(state)).unwrap(), clock)
}

/// Encodes `url` through the API and returns the issued short URL.
pub async fn encode(server: &TestServer, url: &str) -> String {
    let response = server
        .post("/encode")
        .json(&serde_json::json!({ "url": url }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<serde_json::Value>()["short_url"]
        .as_str()
        .unwrap()
        .to_string()
}
