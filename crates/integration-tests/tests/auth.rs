//! Bearer token handling on protected routes.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};

use farm_fresh_integration_tests::{TestApp, now_secs};

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new();

    for uri in ["/api/carts", "/api/checkout", "/api/checkout/all"] {
        let res = app.request(Method::GET, uri, None, None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(res.body["error"], "Missing bearer token");
    }
}

#[tokio::test]
async fn test_invalid_tokens_are_unauthorized() {
    let app = TestApp::new();
    app.seed_user("u-sari").await;

    let expired = TestApp::token_expiring("u-sari", now_secs() - 3600);
    for token in [expired.as_str(), "not-a-jwt"] {
        let res = app.request(Method::GET, "/api/carts", Some(token), None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.body["error"], "Invalid or expired token");
    }
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let app = TestApp::new();

    let res = app
        .request(Method::GET, "/api/carts", Some(&TestApp::token("ghost")), None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], "User not found");
}

#[tokio::test]
async fn test_scheme_is_case_insensitive() {
    let app = TestApp::new();
    app.seed_user("u-sari").await;

    let request = Request::builder()
        .uri("/api/carts")
        .header(
            header::AUTHORIZATION,
            format!("bearer {}", TestApp::token("u-sari")),
        )
        .body(Body::empty())
        .unwrap();

    let res = app.send(request).await;
    assert_eq!(res.status, StatusCode::OK);
}
