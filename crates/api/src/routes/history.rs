//! Checkout history handler.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::models::HistoryEntry;
use crate::state::AppState;

/// Summaries of every checkout. Public; not filtered by caller.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<HistoryEntry>>> {
    let entries = state.history_service().list().await?;
    Ok(Json(entries))
}
