//! Dashboard and daily closing routes, scoped to the caller.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::NaiveDate;
use nursery_core::reports::{DailyClosing, Dashboard};
use serde::Deserialize;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/dashboard", get(dashboard))
        .route("/reports/daily-closing", get(daily_closing))
}

/// Query parameters for the daily closing.
#[derive(Debug, Default, Deserialize)]
pub struct ClosingQuery {
    /// Business day, `YYYY-MM-DD`. Defaults to today in the shop timezone.
    pub date: Option<NaiveDate>,
}

/// GET /reports/dashboard - Sales and profit metrics.
async fn dashboard(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Dashboard>> {
    Ok(Json(state.reports().dashboard(&user.principal).await?))
}

/// GET /reports/daily-closing - Closing for one business day.
async fn daily_closing(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ClosingQuery>,
) -> ApiResult<Json<DailyClosing>> {
    let reports = state.reports();
    let closing = match query.date {
        Some(date) => reports.daily_closing(&user.principal, date).await?,
        None => reports.today_closing(&user.principal).await?,
    };
    Ok(Json(closing))
}
