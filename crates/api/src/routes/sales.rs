//! Sale and return routes. Both are open to every signed-in user and are
//! recorded under the caller's own username.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use nursery_db::RecordedMovement;
use serde::Deserialize;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the sale/return routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", post(record_sale))
        .route("/returns", post(record_return))
}

/// Request body for a sale or return.
#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    /// Item name.
    pub item: String,
    /// Units.
    pub quantity: i64,
}

/// POST /sales - Sell units of an item.
async fn record_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<MovementRequest>,
) -> ApiResult<(StatusCode, Json<RecordedMovement>)> {
    let recorded = state
        .sales()
        .record_sale(&payload.item, payload.quantity, user.username())
        .await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// POST /returns - Take units of an item back.
async fn record_return(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<MovementRequest>,
) -> ApiResult<(StatusCode, Json<RecordedMovement>)> {
    let recorded = state
        .sales()
        .record_return(&payload.item, payload.quantity, user.username())
        .await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}
