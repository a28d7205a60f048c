//! JSON error responses.
//!
//! Every failure leaves the API as `{ "error": CODE, "message": text }` with
//! the status code its domain error carries.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nursery_core::auth::AuthError;
use nursery_core::catalog::CatalogError;
use nursery_core::ledger::LedgerError;
use nursery_core::reports::ReportError;
use nursery_db::ReportQueryError;
use nursery_shared::{AppError, JwtError};
use serde_json::json;
use tracing::error;

/// Error returned by every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn new(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            error!(code, message = %message.into(), "request failed");
            "An internal error occurred".to_string()
        } else {
            message.into()
        };
        Self {
            status,
            code,
            message,
        }
    }

    /// Role does not allow the operation.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into()).into()
    }

    /// Missing or rejected credentials.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into()).into()
    }

    /// HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.code, "message": self.message })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::new(err.status_code(), err.error_code(), err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::new(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::new(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self::new(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        Self::new(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<ReportQueryError> for ApiError {
    fn from(err: ReportQueryError) -> Self {
        match err {
            ReportQueryError::Report(err) => err.into(),
            ReportQueryError::Ledger(err) => err.into(),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::new(401, "TOKEN_EXPIRED", "Token has expired"),
            JwtError::DecodingError(_) => {
                Self::new(401, "INVALID_TOKEN", "Invalid or malformed token")
            }
            JwtError::EncodingError(msg) => AppError::Internal(msg).into(),
        }
    }
}
