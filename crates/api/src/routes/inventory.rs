//! Inventory routes.
//!
//! Everyone signed in can read the catalog; only admins change it.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use nursery_core::catalog::{Category, ItemInput};
use nursery_db::entities::inventory;
use serde::Serialize;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the inventory routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(list_items).post(upsert_item))
        .route("/inventory/low-stock", get(low_stock))
        .route("/inventory/categories", get(categories))
        .route("/inventory/{item}", get(get_item).delete(delete_item))
}

/// A category and the types it allows.
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    /// Category name.
    pub category: Category,
    /// Allowed types.
    pub types: &'static [&'static str],
}

/// GET /inventory - Whole catalog by name.
async fn list_items(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<inventory::Model>>> {
    Ok(Json(state.inventory().list().await?))
}

/// GET /inventory/low-stock - Items at or below their threshold.
async fn low_stock(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<inventory::Model>>> {
    Ok(Json(state.inventory().list_low_stock().await?))
}

/// GET /inventory/categories - The category/type table.
async fn categories(_user: AuthUser) -> Json<Vec<CategoryResponse>> {
    Json(
        Category::ALL
            .iter()
            .map(|&category| CategoryResponse {
                category,
                types: category.allowed_types(),
            })
            .collect(),
    )
}

/// GET /inventory/{item} - One item.
async fn get_item(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(item): Path<String>,
) -> ApiResult<Json<inventory::Model>> {
    Ok(Json(state.inventory().get(&item).await?))
}

/// POST /inventory - Add an item or overwrite it.
async fn upsert_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ItemInput>,
) -> ApiResult<Json<inventory::Model>> {
    user.require_inventory_admin()?;
    Ok(Json(state.inventory().upsert(payload).await?))
}

/// DELETE /inventory/{item} - Remove an item. Its history stays.
async fn delete_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item): Path<String>,
) -> ApiResult<StatusCode> {
    user.require_inventory_admin()?;
    state.inventory().delete(&item).await?;
    Ok(StatusCode::NO_CONTENT)
}
