use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::session::{AdminSession, Visitor};
use super::users::UserResponse;
use super::{audited, Succeeded};
use crate::context::AppContext;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub succeeded: bool,
    /// Sent back as `Authorization: Bearer <id_token>`.
    pub id_token: String,
    pub refresh_token: String,
    pub user: Option<UserResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub uid: String,
    pub email: String,
    pub user: Option<UserResponse>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /auth/login
///
/// Only accounts whose profile has `is_admin` get a session.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 303, description = "Already signed in; see /"),
        (status = 401, description = "Wrong credentials or not an admin"),
    ),
    tag = "auth"
)]
pub async fn login(
    _visitor: Visitor,
    ctx: web::Data<AppContext>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { email, password } = body.into_inner();
    let auth = ctx.auth.clone();
    let signed_in = web::block(move || audited("sign in").run(|| auth.login(&email, &password)))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(LoginResponse {
        succeeded: true,
        id_token: signed_in.id_token,
        refresh_token: signed_in.refresh_token,
        user: signed_in.session.profile.map(UserResponse::from),
    }))
}

/// POST /auth/forgot-password
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email sent", body = Succeeded),
        (status = 400, description = "Invalid email address"),
        (status = 303, description = "Already signed in; see /"),
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    _visitor: Visitor,
    ctx: web::Data<AppContext>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let email = body.into_inner().email;
    let auth = ctx.auth.clone();
    web::block(move || audited("send password reset").run(|| auth.send_password_reset(&email)))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(Succeeded::yes()))
}

/// POST /auth/logout
///
/// Revokes every token issued to the caller.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = Succeeded),
        (status = 303, description = "No session; see /login"),
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout(
    AdminSession(session): AdminSession,
    ctx: web::Data<AppContext>,
) -> Result<HttpResponse, AppError> {
    let auth = ctx.auth.clone();
    web::block(move || audited("sign out").run(|| auth.logout(&session)))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(Succeeded::yes()))
}

/// GET /auth/session
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "The signed-in admin", body = SessionResponse),
        (status = 303, description = "No session; see /login"),
        (status = 503, description = "Session could not be verified"),
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn current_session(AdminSession(session): AdminSession) -> HttpResponse {
    HttpResponse::Ok().json(SessionResponse {
        uid: session.uid,
        email: session.email,
        user: session.profile.map(UserResponse::from),
    })
}
