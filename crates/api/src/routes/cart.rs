//! Cart route handlers.
//!
//! Every handler acts on the caller's own cart, resolved from the bearer
//! token by [`RequireAuth`].

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use farm_fresh_core::{CartItemId, ProductId, Quantity};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{CartItem, CartSummary};
use crate::services::cart::AddOutcome;
use crate::state::AppState;

/// Body of `POST /api/carts`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// Body of `PUT /api/carts/{itemId}`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantity {
    pub quantity: Quantity,
}

/// Response carrying the affected line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub message: &'static str,
    pub cart_item: CartItem,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Response of `DELETE /api/carts`.
#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub message: &'static str,
    pub removed: usize,
}

/// List the caller's cart with totals recomputed from current prices.
#[instrument(skip(state, identity), fields(cart_id = %identity.cart_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<CartSummary>> {
    let summary = state.cart_service().list_items(&identity.cart_id).await?;
    Ok(Json(summary))
}

/// Add a product to the cart.
///
/// Returns 201 when a new line is created and 200 when the quantity was
/// merged into an existing line for the same product.
#[instrument(skip(state, identity, body), fields(cart_id = %identity.cart_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    body: std::result::Result<Json<AddToCart>, JsonRejection>,
) -> Result<(StatusCode, Json<CartItemResponse>)> {
    let Json(body) = body?;

    let outcome = state
        .cart_service()
        .add_item(&identity.cart_id, &body.product_id, body.quantity)
        .await?;

    let (status, message) = match &outcome {
        AddOutcome::Created(_) => (StatusCode::CREATED, "Product added to cart"),
        AddOutcome::Merged(_) => (StatusCode::OK, "Cart item quantity updated"),
    };

    Ok((
        status,
        Json(CartItemResponse {
            message,
            cart_item: outcome.item().clone(),
        }),
    ))
}

/// Replace the quantity of one line.
#[instrument(skip(state, identity, body), fields(cart_id = %identity.cart_id, item_id = %item_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(item_id): Path<CartItemId>,
    body: std::result::Result<Json<UpdateQuantity>, JsonRejection>,
) -> Result<Json<CartItemResponse>> {
    let Json(body) = body?;

    let item = state
        .cart_service()
        .update_item_quantity(&identity.cart_id, &item_id, body.quantity)
        .await?;

    Ok(Json(CartItemResponse {
        message: "Cart item updated",
        cart_item: item,
    }))
}

/// Remove one line.
#[instrument(skip(state, identity), fields(cart_id = %identity.cart_id, item_id = %item_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(item_id): Path<CartItemId>,
) -> Result<Json<MessageResponse>> {
    state
        .cart_service()
        .remove_item(&identity.cart_id, &item_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Cart item removed",
    }))
}

/// Remove every line. An already-empty cart is a 404.
#[instrument(skip(state, identity), fields(cart_id = %identity.cart_id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<ClearedResponse>> {
    let removed = state.cart_service().clear_cart(&identity.cart_id).await?;

    Ok(Json(ClearedResponse {
        message: "Cart cleared",
        removed,
    }))
}
