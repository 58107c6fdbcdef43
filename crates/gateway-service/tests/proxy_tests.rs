//! End-to-end forwarding tests.
//!
//! A wiremock backend stands in for each tier; the gateway must relay
//! method, path, query, headers and body to it and relay its response
//! back unchanged.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use futures::future::join_all;
use gw_test_utils::{TestGateway, TestTokenBuilder};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Request preservation
// ============================================================================

#[tokio::test]
async fn test_forwards_method_path_query_and_body() -> Result<(), anyhow::Error> {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(query_param("x", "1"))
        .and(body_string("order-payload"))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&backend)
        .await;

    let gateway = TestGateway::spawn(&[("gold", &backend.uri())]).await?;
    let token = TestTokenBuilder::new().with_tier("gold").mint();

    let response = reqwest::Client::new()
        .post(format!("{}/orders?x=1", gateway.url()))
        .bearer_auth(token)
        .body("order-payload")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.text().await?, "created");
    Ok(())
}

#[tokio::test]
async fn test_forwards_request_headers() -> Result<(), anyhow::Error> {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("x-request-id", "abc-123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&backend)
        .await;

    let gateway = TestGateway::spawn(&[("gold", &backend.uri())]).await?;
    let token = TestTokenBuilder::new().with_tier("gold").mint();

    let response = reqwest::Client::new()
        .get(format!("{}/orders", gateway.url()))
        .bearer_auth(token)
        .header("x-request-id", "abc-123")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

// ============================================================================
// Response relay
// ============================================================================

#[tokio::test]
async fn test_relays_backend_status_headers_and_body() -> Result<(), anyhow::Error> {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(
            ResponseTemplate::new(418)
                .insert_header("x-backend", "a")
                .set_body_string("teapot"),
        )
        .mount(&backend)
        .await;

    let gateway = TestGateway::spawn(&[("gold", &backend.uri())]).await?;
    let token = TestTokenBuilder::new().with_tier("gold").mint();

    let response = reqwest::Client::new()
        .get(format!("{}/orders", gateway.url()))
        .bearer_auth(token)
        .send()
        .await?;

    // Status and body pass through verbatim, non-2xx included.
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(
        response.headers().get("x-backend").map(|v| v.as_bytes()),
        Some(&b"a"[..])
    );
    assert_eq!(response.text().await?, "teapot");
    Ok(())
}

// ============================================================================
// Tier claim failures
// ============================================================================

#[tokio::test]
async fn test_unknown_tier_is_403() -> Result<(), anyhow::Error> {
    let backend = MockServer::start().await;
    let gateway = TestGateway::spawn(&[("gold", &backend.uri())]).await?;

    let token = TestTokenBuilder::new().with_tier("platinum").mint();

    let response = reqwest::Client::new()
        .get(format!("{}/orders", gateway.url()))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"].as_str(), Some("UNKNOWN_TIER"));
    Ok(())
}

#[tokio::test]
async fn test_missing_tier_claim_is_400() -> Result<(), anyhow::Error> {
    let backend = MockServer::start().await;
    let gateway = TestGateway::spawn(&[("gold", &backend.uri())]).await?;

    // Validly signed, no tier claim at all.
    let token = TestTokenBuilder::new().mint();

    let response = reqwest::Client::new()
        .get(format!("{}/orders", gateway.url()))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"].as_str(), Some("MISSING_TIER"));
    Ok(())
}

#[tokio::test]
async fn test_non_string_tier_claim_is_400() -> Result<(), anyhow::Error> {
    let backend = MockServer::start().await;
    let gateway = TestGateway::spawn(&[("gold", &backend.uri())]).await?;

    let token = TestTokenBuilder::new().with_claim("tier", json!(3)).mint();

    let response = reqwest::Client::new()
        .get(format!("{}/orders", gateway.url()))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"].as_str(), Some("INVALID_TIER"));
    Ok(())
}

// ============================================================================
// Upstream failures
// ============================================================================

#[tokio::test]
async fn test_unreachable_backend_is_502_without_leaking_detail() -> Result<(), anyhow::Error> {
    // Nothing listens on this port; connections are refused.
    let gateway = TestGateway::spawn(&[("gold", "http://127.0.0.1:9")]).await?;

    let token = TestTokenBuilder::new().with_tier("gold").mint();

    let response = reqwest::Client::new()
        .get(format!("{}/orders", gateway.url()))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = response.text().await?;
    assert!(
        !body.contains("refused") && !body.contains("127.0.0.1:9"),
        "502 body must not carry the raw connection error, got: {body}"
    );

    let parsed: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(
        parsed["error"]["code"].as_str(),
        Some("UPSTREAM_UNAVAILABLE")
    );
    Ok(())
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_tiers_route_to_their_own_backends() -> Result<(), anyhow::Error> {
    // Each tier gets a backend that only answers with its own name; any
    // cross-contamination of targets or claims shows up as a wrong body.
    let tiers = ["bronze", "silver", "gold", "platinum"];

    let mut backends = Vec::new();
    for tier in tiers {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/whoami"))
            .respond_with(ResponseTemplate::new(200).set_body_string(tier))
            .mount(&backend)
            .await;
        backends.push(backend);
    }

    let uris: Vec<String> = backends.iter().map(MockServer::uri).collect();
    let routes: Vec<(&str, &str)> = tiers
        .iter()
        .zip(uris.iter())
        .map(|(tier, uri)| (*tier, uri.as_str()))
        .collect();

    let gateway = TestGateway::spawn(&routes).await?;
    let client = reqwest::Client::new();

    let requests = tiers.iter().cycle().take(40).map(|&tier| {
        let client = client.clone();
        let url = format!("{}/whoami", gateway.url());
        let token = TestTokenBuilder::new().with_tier(tier).mint();
        async move {
            let response = client.get(url).bearer_auth(token).send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<(StatusCode, String, &str), anyhow::Error>((status, body, tier))
        }
    });

    for result in join_all(requests).await {
        let (status, body, tier) = result?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, tier, "response body must match the requested tier");
    }
    Ok(())
}
