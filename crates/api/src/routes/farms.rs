//! Farm directory handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use farm_fresh_core::FarmId;

use crate::db::FarmRepository;
use crate::error::{AppError, Result};
use crate::models::Farm;
use crate::state::AppState;

/// List every farm.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Farm>>> {
    let farms = FarmRepository::new(state.store()).list().await?;
    Ok(Json(farms))
}

/// Show one farm.
#[instrument(skip(state), fields(farm_id = %id))]
pub async fn show(State(state): State<AppState>, Path(id): Path<FarmId>) -> Result<Json<Farm>> {
    FarmRepository::new(state.store())
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Farm".to_string()))
}
