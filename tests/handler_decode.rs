mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use shorten_api::codec::{Alphabet, Codec};
use shorten_api::infrastructure::persistence::InMemoryUrlRepository;
use shorten_api::routes::app_router;
use std::sync::Arc;

#[tokio::test]
async fn test_decode_success() {
    let (server, _repository) = common::create_test_server();
    let short_url = common::encode(&server, "https://www.example.com").await;

    let response = server.post("/decode").json(&json!({ "url": short_url })).await;

    response.assert_status_ok();
    response.assert_json(&json!({ "origin_url": "https://www.example.com" }));
}

#[tokio::test]
async fn test_decode_form_body_and_host_case() {
    let (server, _repository) = common::create_test_server();
    let short_url = common::encode(&server, "https://www.example.com/path").await;
    let shouted = short_url.replace("localhost", "LOCALHOST");

    let response = server
        .post("/decode")
        .form(&[("url", format!("  {shouted}  "))])
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "origin_url": "https://www.example.com/path" }));
}

#[tokio::test]
async fn test_decode_ignores_port_query_and_fragment() {
    let (server, _repository) = common::create_test_server();
    let short_url = common::encode(&server, "https://www.example.com").await;
    let code = short_url.rsplit('/').next().unwrap();

    let response = server
        .post("/decode")
        .json(&json!({ "url": format!("https://localhost:8443/{code}?utm=x#top") }))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_decode_trailing_slash_is_not_found() {
    let (server, _repository) = common::create_test_server();
    let short_url = common::encode(&server, "https://www.example.com").await;

    let response = server
        .post("/decode")
        .json(&json!({ "url": format!("{short_url}/") }))
        .await;

    response.assert_status_not_found();
    response.assert_json(&json!({ "error": "Record not found" }));
}

#[tokio::test]
async fn test_round_trip_with_punctuated_alphabet() {
    let alphabet = Alphabet::new("abcdefghijklmnopqrstuvwxyz-._~").unwrap();
    let codec = Codec::new(alphabet, 6).unwrap();
    let state = common::create_test_state_with_codec(
        Arc::new(InMemoryUrlRepository::new()),
        codec,
    );
    let server = TestServer::new(app_router(state)).unwrap();

    for i in 0..30 {
        let origin = format!("https://www.example.com/{}", "p".repeat(i));
        let short_url = common::encode(&server, &origin).await;

        let response = server.post("/decode").json(&json!({ "url": short_url })).await;

        response.assert_status_ok();
        response.assert_json(&json!({ "origin_url": origin }));
    }
}

#[tokio::test]
async fn test_decode_domain_mismatch() {
    let (server, _repository) = common::create_test_server();

    let response = server
        .post("/decode")
        .json(&json!({ "url": "http://unauthorized.com/abcd" }))
        .await;

    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "URL is invalid" }));
}

#[tokio::test]
async fn test_decode_malformed_url() {
    let (server, _repository) = common::create_test_server();

    for url in ["invalid_url", "", "ftp://localhost/abcd", "localhost/abcd"] {
        let response = server.post("/decode").json(&json!({ "url": url })).await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "URL is invalid" }));
    }
}

#[tokio::test]
async fn test_decode_unknown_code() {
    let (server, _repository) = common::create_test_server();

    for code in ["zzzz99", "nonexist"] {
        let response = server
            .post("/decode")
            .json(&json!({ "url": format!("http://localhost/{code}") }))
            .await;

        response.assert_status_not_found();
        response.assert_json(&json!({ "error": "Record not found" }));
    }
}

#[tokio::test]
async fn test_decode_well_formed_code_without_record() {
    let (server, _repository) = common::create_test_server();
    let code = common::default_codec().encode(&[23, 999]).unwrap();

    let response = server
        .post("/decode")
        .json(&json!({ "url": format!("http://localhost/{code}") }))
        .await;

    response.assert_status_not_found();
    response.assert_json(&json!({ "error": "Record not found" }));
}

#[tokio::test]
async fn test_decode_rejects_codes_from_another_alphabet() {
    let (server, _repository) = common::create_test_server();
    let issued = common::encode(&server, "https://www.example.com").await;
    let code = issued.rsplit('/').next().unwrap();

    let rotated = Codec::new(Alphabet::new("abcdefghijklmnopqrstuvw").unwrap(), 6).unwrap();
    let foreign = rotated.encode(&[23, 1]).unwrap();
    assert_ne!(foreign, code);

    let response = server
        .post("/decode")
        .json(&json!({ "url": format!("http://localhost/{foreign}") }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_decode_storage_failure() {
    let state = common::create_test_state(Arc::new(common::FailingRepository));
    let server = TestServer::new(app_router(state)).unwrap();
    let code = common::default_codec().encode(&[23, 1]).unwrap();

    let response = server
        .post("/decode")
        .json(&json!({ "url": format!("http://localhost/{code}") }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "connection refused" }));
}
