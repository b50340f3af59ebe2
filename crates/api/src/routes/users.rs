//! Sub-user management routes (admin only).

use axum::{
    Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use expensa_core::accounts::CreateSubUserInput;
use expensa_core::auth::UserView;
use expensa_shared::AppError;
use expensa_shared::types::UserId;

use crate::AppState;
use crate::extractors::AppJson;
use crate::middleware::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::auth::UserPayload;

/// Creates the sub-user routes (gate applied by the caller).
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(list_users))
        .route("/user/create", post(create_user))
        .route("/user/{user_id}", delete(delete_user))
}

/// POST /user/create - Provision a sub-user and email the credentials.
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(payload): AppJson<CreateSubUserInput>,
) -> ApiResult<UserPayload> {
    let user = state
        .accounts
        .create_sub_user(auth.user_id(), payload)
        .await?;
    Ok(ApiResponse::ok(
        "User created successfully and credentials sent via email",
        UserPayload { user },
    ))
}

/// GET /user - List sub-users created by the caller.
async fn list_users(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Vec<UserView>> {
    let users = state.accounts.list_sub_users(auth.user_id()).await?;
    Ok(ApiResponse::ok("Users fetched successfully", users))
}

/// DELETE /user/{user_id} - Remove a sub-user created by the caller.
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<()> {
    let user_id = user_id
        .parse::<UserId>()
        .map_err(|_| AppError::Validation("Invalid user ID".into()))?;

    state
        .accounts
        .delete_sub_user(auth.user_id(), user_id)
        .await?;
    Ok(ApiResponse::message("User deleted successfully"))
}
