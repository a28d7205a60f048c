//! Transaction history and invoice routes.
//!
//! Staff only ever see their own rows. A staff request for another user's
//! transaction answers 404, the same as a missing id.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::NaiveDate;
use nursery_core::invoice::Invoice;
use nursery_core::ledger::LedgerError;
use nursery_core::reports::{LedgerRecord, TransactionHistory};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions/{id}", get(get_transaction))
        .route("/transactions/{id}/invoice", get(get_invoice))
}

/// Query parameters for the history view.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Only this user's rows (ignored for staff).
    pub username: Option<String>,
    /// First business day, `YYYY-MM-DD`.
    pub from: Option<NaiveDate>,
    /// Last business day, `YYYY-MM-DD`.
    pub to: Option<NaiveDate>,
}

/// Invoice fields plus a printable rendering.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    /// Structured invoice.
    pub invoice: Invoice,
    /// Plain-text rendering.
    pub text: String,
}

/// GET /transactions - Filtered history, newest first, with totals.
async fn list_transactions(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<TransactionHistory>> {
    let history = state
        .reports()
        .history_for(&user.principal, query.username, query.from, query.to)
        .await?;
    Ok(Json(history))
}

/// Loads a row the caller is allowed to see.
async fn visible_transaction(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> Result<LedgerRecord, LedgerError> {
    let record = state.sales().find_by_id(id).await?;
    if user.principal.role.can_view_all_transactions() || record.username == user.username() {
        Ok(record)
    } else {
        Err(LedgerError::TransactionNotFound(id))
    }
}

/// GET /transactions/{id} - One log row.
async fn get_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<LedgerRecord>> {
    Ok(Json(visible_transaction(&state, &user, id).await?))
}

/// GET /transactions/{id}/invoice - Invoice for one log row.
async fn get_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<InvoiceResponse>> {
    let record = visible_transaction(&state, &user, id).await?;
    let invoice = Invoice::from_record(&record, state.shop.clone(), state.timezone)?;

    Ok(Json(InvoiceResponse {
        text: invoice.render(),
        invoice,
    }))
}
