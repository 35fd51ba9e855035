//! Product catalog handlers.
//!
//! The catalog is read-only over HTTP; products are loaded with `ff-cli seed`.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use farm_fresh_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

/// List every product.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.store()).list().await?;
    Ok(Json(products))
}

/// Show one product.
#[instrument(skip(state), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.store())
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

/// List products whose `type` matches exactly.
#[instrument(skip(state))]
pub async fn by_type(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.store())
        .list_by_type(&kind)
        .await?;
    Ok(Json(products))
}
