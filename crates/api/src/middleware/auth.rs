//! Authentication middleware for protected routes.
//!
//! A token alone is not enough: the login session it was minted for must
//! still be live and authenticated. Role checks use the session's principal,
//! never anything the client sends.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use nursery_core::auth::Principal;
use tracing::debug;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Checks that the token's login session is authenticated
/// 4. Stores the signed-in user in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or_else(|| {
            ApiError::unauthorized("Authorization header with Bearer token is required")
        })?;

    let claims = state.jwt_service.validate_token(token)?;

    let session = state
        .sessions
        .get(claims.session_id())
        .await
        .map_err(|_| ApiError::unauthorized("Session has ended, log in again"))?;
    let principal = session
        .lock()
        .await
        .principal()
        .filter(|p| p.username == claims.username())
        .cloned()
        .ok_or_else(|| {
            debug!(username = claims.username(), "token for unauthenticated session");
            ApiError::unauthorized("Session is not authenticated")
        })?;

    Ok(AuthUser {
        principal,
        session_id: claims.session_id(),
    })
}

/// Extractor for the signed-in user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Username and role.
    pub principal: Principal,
    /// Login session behind the token.
    pub session_id: Uuid,
}

impl AuthUser {
    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.principal.username
    }

    /// Fails unless the user may create accounts.
    ///
    /// # Errors
    ///
    /// Returns a 403 `ApiError` for staff.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.principal.role.can_manage_users() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin role required"))
        }
    }

    /// Fails unless the user may change the catalog.
    ///
    /// # Errors
    ///
    /// Returns a 403 `ApiError` for staff.
    pub fn require_inventory_admin(&self) -> Result<(), ApiError> {
        if self.principal.role.can_manage_inventory() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Only admins can change inventory"))
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
