//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Login sessions and the authentication middleware
//! - JSON error responses

pub mod error;
pub mod middleware;
pub mod routes;
pub mod session;

use std::sync::Arc;

use axum::Router;
use chrono_tz::Tz;
use nursery_core::invoice::ShopHeader;
use nursery_db::{InventoryRepository, ReportRepository, SalesRepository, UserRepository};
use nursery_shared::{JwtService, Notifier};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use session::SessionStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Channel that delivers passcodes.
    pub notifier: Arc<dyn Notifier>,
    /// Destination every passcode is sent to.
    pub otp_recipient: String,
    /// Live login sessions.
    pub sessions: SessionStore,
    /// Header printed on invoices.
    pub shop: ShopHeader,
    /// Timezone that defines a business day.
    pub timezone: Tz,
}

impl AppState {
    /// Credential store.
    #[must_use]
    pub fn users(&self) -> UserRepository {
        UserRepository::new((*self.db).clone())
    }

    /// Inventory ledger.
    #[must_use]
    pub fn inventory(&self) -> InventoryRepository {
        InventoryRepository::new((*self.db).clone())
    }

    /// Transaction log.
    #[must_use]
    pub fn sales(&self) -> SalesRepository {
        SalesRepository::new((*self.db).clone())
    }

    /// Report queries.
    #[must_use]
    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new((*self.db).clone(), self.timezone)
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
