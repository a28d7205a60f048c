//! Account management routes (admin only).

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use nursery_core::auth::UserRole;
use nursery_shared::auth::CreateUserRequest;
use serde::Serialize;
use tracing::info;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users).post(create_user))
}

/// Account without its password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// Username.
    pub username: String,
    /// `admin` or `staff`.
    pub role: String,
}

/// GET /users - List accounts.
async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    user.require_admin()?;

    let users = state
        .users()
        .list()
        .await?
        .into_iter()
        .map(|u| UserResponse {
            username: u.username,
            role: u.role,
        })
        .collect();
    Ok(Json(users))
}

/// POST /users - Add an account.
async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    user.require_admin()?;

    let role: UserRole = payload.role.parse()?;
    state
        .users()
        .create(&payload.username, &payload.password, role)
        .await?;

    info!(
        created_by = user.username(),
        username = %payload.username.trim(),
        %role,
        "account added"
    );
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            username: payload.username.trim().to_string(),
            role: role.to_string(),
        }),
    ))
}
