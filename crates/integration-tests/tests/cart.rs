//! Cart endpoints over the in-memory backends.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use farm_fresh_integration_tests::TestApp;

async fn app_with_user() -> (TestApp, String) {
    let app = TestApp::new();
    app.seed_user("u-sari").await;
    app.seed_product("prod-A", "Rp10.000", "sayur").await;
    app.seed_product("prod-B", "Rp5.000", "buah").await;
    (app, TestApp::token("u-sari"))
}

#[tokio::test]
async fn test_add_same_product_merges_quantity() {
    let (app, token) = app_with_user().await;

    let first = app
        .request(
            Method::POST,
            "/api/carts",
            Some(&token),
            Some(json!({ "productId": "prod-A", "quantity": 3 })),
        )
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["cartItem"]["quantity"], 3);
    assert_eq!(first.body["cartItem"]["totalPrice"], "Rp30.000");

    let second = app
        .request(
            Method::POST,
            "/api/carts",
            Some(&token),
            Some(json!({ "productId": "prod-A", "quantity": 2 })),
        )
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["cartItem"]["id"], first.body["cartItem"]["id"]);
    assert_eq!(second.body["cartItem"]["quantity"], 5);
    assert_eq!(second.body["cartItem"]["totalPrice"], "Rp50.000");

    let cart = app.request(Method::GET, "/api/carts", Some(&token), None).await;
    assert_eq!(cart.status, StatusCode::OK);
    assert_eq!(cart.body["cartItems"].as_array().unwrap().len(), 1);
    assert_eq!(cart.body["totalCartPrice"], "Rp50.000");
}

#[tokio::test]
async fn test_list_totals_sum_lines() {
    let (app, token) = app_with_user().await;

    for (product, quantity) in [("prod-A", 2), ("prod-B", 3)] {
        let res = app
            .request(
                Method::POST,
                "/api/carts",
                Some(&token),
                Some(json!({ "productId": product, "quantity": quantity })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }

    let cart = app.request(Method::GET, "/api/carts", Some(&token), None).await;
    let lines = cart.body["cartItems"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["name"], "Produk prod-A");
    assert_eq!(lines[0]["price"], "Rp10.000");
    assert_eq!(lines[0]["totalPrice"], "Rp20.000");
    assert_eq!(lines[1]["totalPrice"], "Rp15.000");
    assert_eq!(cart.body["totalCartPrice"], "Rp35.000");
}

#[tokio::test]
async fn test_list_uses_current_product_price() {
    let (app, token) = app_with_user().await;
    app.request(
        Method::POST,
        "/api/carts",
        Some(&token),
        Some(json!({ "productId": "prod-A", "quantity": 2 })),
    )
    .await;

    app.seed_product("prod-A", "Rp12.500", "sayur").await;

    let cart = app.request(Method::GET, "/api/carts", Some(&token), None).await;
    assert_eq!(cart.body["cartItems"][0]["totalPrice"], "Rp25.000");
    assert_eq!(cart.body["totalCartPrice"], "Rp25.000");
}

#[tokio::test]
async fn test_update_and_remove_item() {
    let (app, token) = app_with_user().await;
    let added = app
        .request(
            Method::POST,
            "/api/carts",
            Some(&token),
            Some(json!({ "productId": "prod-B", "quantity": 1 })),
        )
        .await;
    let item_id = added.body["cartItem"]["id"].as_str().unwrap().to_string();

    let updated = app
        .request(
            Method::PUT,
            &format!("/api/carts/{item_id}"),
            Some(&token),
            Some(json!({ "quantity": 4 })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["cartItem"]["quantity"], 4);
    assert_eq!(updated.body["cartItem"]["totalPrice"], "Rp20.000");

    let removed = app
        .request(Method::DELETE, &format!("/api/carts/{item_id}"), Some(&token), None)
        .await;
    assert_eq!(removed.status, StatusCode::OK);

    let again = app
        .request(Method::DELETE, &format!("/api/carts/{item_id}"), Some(&token), None)
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.body["error"], "Item not found in cart");
}

#[tokio::test]
async fn test_clear_cart_then_empty() {
    let (app, token) = app_with_user().await;
    app.request(
        Method::POST,
        "/api/carts",
        Some(&token),
        Some(json!({ "productId": "prod-A", "quantity": 1 })),
    )
    .await;

    let cleared = app.request(Method::DELETE, "/api/carts", Some(&token), None).await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.body["removed"], 1);

    let again = app.request(Method::DELETE, "/api/carts", Some(&token), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.body["error"], "Cart is empty");
}

#[tokio::test]
async fn test_rejects_bad_input() {
    let (app, token) = app_with_user().await;

    let zero = app
        .request(
            Method::POST,
            "/api/carts",
            Some(&token),
            Some(json!({ "productId": "prod-A", "quantity": 0 })),
        )
        .await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);

    let unknown = app
        .request(
            Method::POST,
            "/api/carts",
            Some(&token),
            Some(json!({ "productId": "prod-Z", "quantity": 1 })),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["error"], "Product not found");
}

#[tokio::test]
async fn test_carts_are_per_user() {
    let (app, token) = app_with_user().await;
    app.seed_user("u-budi").await;
    let other = TestApp::token("u-budi");

    app.request(
        Method::POST,
        "/api/carts",
        Some(&token),
        Some(json!({ "productId": "prod-A", "quantity": 1 })),
    )
    .await;

    let cart = app.request(Method::GET, "/api/carts", Some(&other), None).await;
    assert_eq!(cart.status, StatusCode::OK);
    assert!(cart.body["cartItems"].as_array().unwrap().is_empty());
    assert_eq!(cart.body["totalCartPrice"], "Rp0");
}

#[tokio::test]
async fn test_add_with_overflowing_total_is_rejected() {
    let (app, token) = app_with_user().await;
    app.seed_product("prod-mahal", "Rp100.000.000.000.000.000.000", "buah")
        .await;

    let res = app
        .request(
            Method::POST,
            "/api/carts",
            Some(&token),
            Some(json!({ "productId": "prod-mahal", "quantity": 4_000_000_000_u32 })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Quantity is too large");

    let cart = app.request(Method::GET, "/api/carts", Some(&token), None).await;
    assert_eq!(cart.body["cartItems"].as_array().unwrap().len(), 0);
}
