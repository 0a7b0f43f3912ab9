//! Database maintenance endpoints (administrative listener only)

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{error::AppResult, repository::ResetMode, services::admin::DatabaseStatus, AppState};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Drop the catalog tables and migration history, migrate and seed again
pub async fn reset_database(State(state): State<AppState>) -> AppResult<Json<MessageResponse>> {
    state.services.admin.reset(ResetMode::Tables).await?;
    Ok(Json(MessageResponse {
        message: "Database reset successfully".to_string(),
    }))
}

/// Recreate the whole schema, migrate and seed again
pub async fn force_reset_database(
    State(state): State<AppState>,
) -> AppResult<Json<MessageResponse>> {
    state.services.admin.reset(ResetMode::Schema).await?;
    Ok(Json(MessageResponse {
        message: "Database force reset successfully".to_string(),
    }))
}

pub async fn database_status(State(state): State<AppState>) -> AppResult<Json<DatabaseStatus>> {
    let status = state.services.admin.status().await?;
    Ok(Json(status))
}
