//! Authentication routes: registration, verification, login, token refresh,
//! and password recovery.

use axum::{Router, extract::State, routing::post};
use expensa_core::auth::{AuthSession, LoginInput, RegisterInput, ResetPasswordInput, UserView};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::extractors::AppJson;
use crate::response::{ApiResponse, ApiResult};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/verifyEmail", post(verify_email))
        .route("/auth/resendVerification", post(resend_verification))
        .route("/auth/login", post(login))
        .route("/auth/refreshToken", post(refresh_token))
        .route("/auth/forgotPassword", post(forgot_password))
        .route("/auth/resetPassword", post(reset_password))
}

/// Wraps a user view as `{ "user": ... }`.
#[derive(Debug, Serialize)]
pub struct UserPayload {
    /// Sanitized user.
    pub user: UserView,
}

/// Body of `POST /auth/verifyEmail`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    /// Account email.
    #[serde(default)]
    pub email: String,
    /// 4-digit code from the email.
    #[serde(default)]
    pub verification_code: String,
}

/// Body carrying only an email.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    /// Account email.
    #[serde(default)]
    pub email: String,
}

/// Body of `POST /auth/refreshToken`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// Refresh token from a previous login.
    #[serde(default)]
    pub refresh_token: String,
}

/// POST /auth/register - Create an unverified account and email a code.
async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterInput>,
) -> ApiResult<UserPayload> {
    let user = state.auth.register(payload).await?;
    Ok(ApiResponse::ok(
        "User registered successfully. Please check your email for the verification code.",
        UserPayload { user },
    ))
}

/// POST /auth/verifyEmail - Consume a verification code.
async fn verify_email(
    State(state): State<AppState>,
    AppJson(payload): AppJson<VerifyEmailRequest>,
) -> ApiResult<UserPayload> {
    let user = state
        .auth
        .verify_email(&payload.email, &payload.verification_code)
        .await?;
    Ok(ApiResponse::ok("Email verified successfully", UserPayload { user }))
}

/// POST /auth/resendVerification - Issue a fresh verification code.
async fn resend_verification(
    State(state): State<AppState>,
    AppJson(payload): AppJson<EmailRequest>,
) -> ApiResult<()> {
    state.auth.resend_verification(&payload.email).await?;
    Ok(ApiResponse::message(
        "If the account is awaiting verification, a new code has been sent",
    ))
}

/// POST /auth/login - Authenticate and return a token pair.
async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginInput>,
) -> ApiResult<AuthSession> {
    let session = state.auth.login(payload).await?;
    Ok(ApiResponse::ok("Login successful", session))
}

/// POST /auth/refreshToken - Exchange a refresh token for a new pair.
async fn refresh_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshTokenRequest>,
) -> ApiResult<AuthSession> {
    let session = state.auth.refresh(&payload.refresh_token).await?;
    Ok(ApiResponse::ok("Token refreshed successfully", session))
}

/// POST /auth/forgotPassword - Email a reset code if the account exists.
async fn forgot_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<EmailRequest>,
) -> ApiResult<()> {
    state.auth.forgot_password(&payload.email).await?;
    Ok(ApiResponse::message(
        "If an account exists with this email, a reset code has been sent",
    ))
}

/// POST /auth/resetPassword - Set a new password with a reset code.
async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordInput>,
) -> ApiResult<()> {
    state.auth.reset_password(payload).await?;
    Ok(ApiResponse::message("Password has been reset successfully"))
}
