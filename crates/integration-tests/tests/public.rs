//! Public endpoints: health, catalog, farms and history.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;

use farm_fresh_integration_tests::{MultipartForm, TestApp};

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new();

    let res = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "ok");

    let res = app.request(Method::GET, "/health/ready", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_generated_or_echoed() {
    let app = TestApp::new();

    let res = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(res.request_id.unwrap().len(), 36);

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "edge-42")
        .body(Body::empty())
        .unwrap();
    let res = app.send(request).await;
    assert_eq!(res.request_id.as_deref(), Some("edge-42"));
}

#[tokio::test]
async fn test_product_catalog() {
    let app = TestApp::new();
    app.seed_product("prod-A", "Rp10.000", "sayur").await;
    app.seed_product("prod-B", "Rp5.000", "buah").await;

    let all = app.request(Method::GET, "/api/products", None, None).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body.as_array().unwrap().len(), 2);

    let one = app.request(Method::GET, "/api/products/prod-B", None, None).await;
    assert_eq!(one.status, StatusCode::OK);
    assert_eq!(one.body["idProduct"], "prod-B");
    assert_eq!(one.body["price"], "Rp5.000");
    assert_eq!(one.body["type"], "buah");

    let missing = app.request(Method::GET, "/api/products/prod-Z", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "Product not found");

    let sayur = app
        .request(Method::GET, "/api/products/type/sayur", None, None)
        .await;
    let sayur = sayur.body.as_array().unwrap();
    assert_eq!(sayur.len(), 1);
    assert_eq!(sayur[0]["idProduct"], "prod-A");
}

#[tokio::test]
async fn test_farm_directory() {
    let app = TestApp::new();
    app.seed_farm("farm-1", "Kebun Lembang").await;
    app.seed_farm("farm-2", "Tani Makmur").await;

    let all = app.request(Method::GET, "/api/farmers", None, None).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body.as_array().unwrap().len(), 2);

    let one = app.request(Method::GET, "/api/farmers/farm-2", None, None).await;
    assert_eq!(one.status, StatusCode::OK);
    assert_eq!(one.body["idFarm"], "farm-2");
    assert_eq!(one.body["storeName"], "Tani Makmur");
    assert_eq!(one.body["owner"], "Pemilik farm-2");

    let missing = app.request(Method::GET, "/api/farmers/farm-9", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "Farm not found");
}

#[tokio::test]
async fn test_history_is_public() {
    let app = TestApp::new();

    let empty = app.request(Method::GET, "/api/history", None, None).await;
    assert_eq!(empty.status, StatusCode::NOT_FOUND);
    assert_eq!(empty.body["error"], "No checkout history found");

    app.seed_user("u-sari").await;
    app.seed_product("prod-A", "Rp10.000", "sayur").await;
    let token = TestApp::token("u-sari");
    app.request(
        Method::POST,
        "/api/carts",
        Some(&token),
        Some(json!({ "productId": "prod-A", "quantity": 3 })),
    )
    .await;
    let form = MultipartForm::new()
        .text("customer", r#"{"name":"Sari"}"#)
        .text("shipping", r#"{"name":"Ibu Sari","address":"Jl. Melati 7"}"#)
        .file("image", "bukti.png", "image/png", b"png");
    let placed = app.multipart(Method::POST, "/api/checkout", &token, form).await;
    assert_eq!(placed.status, StatusCode::CREATED);

    let history = app.request(Method::GET, "/api/history", None, None).await;
    assert_eq!(history.status, StatusCode::OK);
    let rows = history.body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["checkoutId"], placed.body["checkout"]["checkoutId"]);
    assert_eq!(rows[0]["name"], "Sari");
    assert_eq!(rows[0]["totalItem"], 1);
    assert_eq!(rows[0]["totalPrice"], "Rp30.000");
    assert_eq!(rows[0]["shippingName"], "Ibu Sari");
    assert_eq!(rows[0]["address"], "Jl. Melati 7");
}
