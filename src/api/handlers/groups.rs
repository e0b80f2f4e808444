/*
 * Responsibility
 * - GET /groups, GET /groups/{group_id}/users
 * - Forward the caller's bearer token to the directory as-is
 * - Directory failures become a fixed 500 message; detail goes to the log only
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::extractors::BearerToken;
use crate::error::AppError;
use crate::services::directory::DirectoryUser;
use crate::state::AppState;

const GROUPS_FAILED: &str = "Failed to fetch unique groups";
const GROUP_USERS_FAILED: &str = "Failed to fetch users for the specified group";

pub async fn list_groups(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<Vec<String>>, AppError> {
    let groups = state.directory.list_groups(&token).await.map_err(|e| {
        tracing::error!(error = %e, "error fetching unique groups");
        AppError::upstream(GROUPS_FAILED)
    })?;

    Ok(Json(groups))
}

pub async fn list_group_users(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<DirectoryUser>>, AppError> {
    let users = state
        .directory
        .list_group_users(&token, &group_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, group_id = %group_id, "error fetching users for group");
            AppError::upstream(GROUP_USERS_FAILED)
        })?;

    Ok(Json(users))
}
