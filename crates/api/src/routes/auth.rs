//! Authentication routes: password + passcode login, logout and the two
//! password branches.
//!
//! Every step works on a server-side session named by the `session_id`
//! returned from the step that opened it.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use chrono::Utc;
use nursery_core::auth::{AuthError, AuthSession, AuthStep, Principal, check_new_password};
use nursery_shared::auth::{
    ChangePasswordStartRequest, CompletePasswordRequest, ForgotPasswordRequest, LoginRequest,
    LoginResponse, PendingOtpResponse, SessionRequest, VerifyOtpRequest,
};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/otp", post(verify_otp))
        .route("/auth/otp/resend", post(resend_otp))
        .route("/auth/otp/back", post(back))
        .route("/auth/password/change", post(start_password_change))
        .route("/auth/password/forgot", post(start_password_reset))
        .route("/auth/password/complete", post(complete_password))
}

/// Auth routes that need a signed-in user.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/logout", post(logout))
}

/// Subject and body label of the passcode mail for a step.
fn otp_labels(step: &AuthStep) -> (&'static str, &'static str) {
    match step {
        AuthStep::PasswordChange { .. } => ("Password Change OTP", "password change"),
        AuthStep::PasswordReset { .. } => ("Password Reset OTP", "password reset"),
        _ => ("Login OTP", "login"),
    }
}

/// Sends `code` for the session's current step.
///
/// On failure the session is walked back to `login` so no passcode is left
/// pending that nobody received.
async fn deliver(state: &AppState, session: &mut AuthSession, code: &str) -> Result<(), AuthError> {
    let (subject, label) = otp_labels(session.step());
    let body = format!("Your {label} OTP is: {code}");

    if let Err(e) = state.notifier.send(&state.otp_recipient, subject, &body).await {
        warn!(session_id = %session.id, error = %e, "passcode delivery failed");
        session.back()?;
        return Err(AuthError::Delivery(e.to_string()));
    }
    Ok(())
}

fn pending(session: &AuthSession, message: &str) -> PendingOtpResponse {
    PendingOtpResponse {
        session_id: session.id,
        step: session.step().name().to_string(),
        message: message.to_string(),
    }
}

/// POST /auth/login - Check the password and send the login passcode.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<PendingOtpResponse>> {
    let username = payload.username.trim();
    let role = state.users().verify(username, &payload.password).await?;

    let (session_id, handle) = state.sessions.open().await;
    let mut session = handle.lock().await;
    let code = session.credentials_accepted(Principal::new(username, role), Utc::now())?;

    if let Err(e) = deliver(&state, &mut session, &code).await {
        state.sessions.remove(session_id).await;
        return Err(e.into());
    }

    info!(username, %session_id, "login passcode sent");
    Ok(Json(pending(&session, "OTP sent")))
}

/// POST /auth/otp - Check the login passcode and issue an access token.
async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let handle = state.sessions.get(payload.session_id).await?;
    let mut session = handle.lock().await;

    let principal = session
        .submit_login_otp(payload.code.trim(), Utc::now())
        .inspect_err(|e| warn!(session_id = %payload.session_id, error = %e, "passcode rejected"))?;

    let access_token = state.jwt_service.generate_access_token(
        &principal.username,
        payload.session_id,
        principal.role.as_str(),
    )?;

    info!(username = %principal.username, role = %principal.role, "user logged in");
    Ok(Json(LoginResponse {
        username: principal.username,
        role: principal.role.to_string(),
        access_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    }))
}

/// POST /auth/otp/resend - Replace the pending passcode with a fresh one.
async fn resend_otp(
    State(state): State<AppState>,
    Json(payload): Json<SessionRequest>,
) -> ApiResult<Json<PendingOtpResponse>> {
    let handle = state.sessions.get(payload.session_id).await?;
    let mut session = handle.lock().await;

    let code = session.reissue(Utc::now())?;
    deliver(&state, &mut session, &code).await?;

    Ok(Json(pending(&session, "OTP sent")))
}

/// POST /auth/otp/back - Abandon the pending step.
async fn back(
    State(state): State<AppState>,
    Json(payload): Json<SessionRequest>,
) -> ApiResult<Json<PendingOtpResponse>> {
    let handle = state.sessions.get(payload.session_id).await?;
    let mut session = handle.lock().await;
    session.back()?;

    Ok(Json(pending(&session, "Back to login")))
}

/// POST /auth/logout - End the session behind the token.
async fn logout(State(state): State<AppState>, user: AuthUser) -> StatusCode {
    state.sessions.remove(user.session_id).await;
    info!(username = user.username(), "user logged out");
    StatusCode::NO_CONTENT
}

/// POST /auth/password/change - Check the old password and send a passcode.
async fn start_password_change(
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordStartRequest>,
) -> ApiResult<Json<PendingOtpResponse>> {
    let username = payload.username.trim();
    state.users().verify(username, &payload.old_password).await?;

    open_password_flow(&state, username, |session, now| {
        session.begin_password_change(username, now)
    })
    .await
}

/// POST /auth/password/forgot - Send a passcode for a known username.
async fn start_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<PendingOtpResponse>> {
    let username = payload.username.trim();
    if state.users().find(username).await?.is_none() {
        return Err(AuthError::UserNotFound(username.to_string()).into());
    }

    open_password_flow(&state, username, |session, now| {
        session.begin_password_reset(username, now)
    })
    .await
}

async fn open_password_flow<F>(
    state: &AppState,
    username: &str,
    begin: F,
) -> ApiResult<Json<PendingOtpResponse>>
where
    F: FnOnce(&mut AuthSession, chrono::DateTime<Utc>) -> Result<String, AuthError>,
{
    let (session_id, handle) = state.sessions.open().await;
    let mut session = handle.lock().await;
    let code = begin(&mut *session, Utc::now())?;

    if let Err(e) = deliver(state, &mut session, &code).await {
        state.sessions.remove(session_id).await;
        return Err(e.into());
    }

    info!(username, %session_id, step = session.step().name(), "password passcode sent");
    Ok(Json(pending(&session, "OTP sent")))
}

/// POST /auth/password/complete - Check the passcode and store the new password.
async fn complete_password(
    State(state): State<AppState>,
    Json(payload): Json<CompletePasswordRequest>,
) -> ApiResult<Json<Value>> {
    check_new_password(&payload.new_password, &payload.confirm_password)?;

    let handle = state.sessions.get(payload.session_id).await?;
    let flow = handle
        .lock()
        .await
        .complete_password_flow(payload.otp.trim(), Utc::now())?;

    state
        .users()
        .reset_password(flow.username(), &payload.new_password)
        .await?;
    state.sessions.remove(payload.session_id).await;

    Ok(Json(json!({
        "username": flow.username(),
        "message": "Password updated"
    })))
}
