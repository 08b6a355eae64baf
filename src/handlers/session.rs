//! Route guards as request extractors.
//!
//! Console handlers take an [`AdminSession`]; the sign-in and password
//! recovery handlers take a [`Visitor`]. Both resolve the bearer token at the
//! identity service and apply the guard decision table before the handler
//! body runs.

use std::future::Future;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};

use crate::context::AppContext;
use crate::domain::guard::{decide, GuardDecision, RouteKind, Session, SessionState, LOGIN_PATH};
use crate::errors::AppError;

/// An authenticated session whose profile carries `is_admin`.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

/// A caller without a session, allowed onto public routes.
#[derive(Debug, Clone, Copy)]
pub struct Visitor;

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token.to_string())
}

async fn resolve(req: &HttpRequest) -> Result<SessionState, AppError> {
    let Some(token) = bearer_token(req) else {
        return Ok(SessionState::Unauthenticated);
    };
    let auth = req
        .app_data::<web::Data<AppContext>>()
        .map(|ctx| ctx.auth.clone())
        .ok_or_else(|| AppError::Internal("application context is not registered".into()))?;
    web::block(move || auth.resolve_session(Some(&token)))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))
}

fn enforce(decision: GuardDecision) -> Result<(), AppError> {
    match decision {
        GuardDecision::Allow => Ok(()),
        GuardDecision::Redirect(location) => Err(AppError::Redirect(location)),
        GuardDecision::Pending => Err(AppError::Unavailable),
    }
}

impl FromRequest for AdminSession {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let state = resolve(&req).await?;
            enforce(decide(&state, RouteKind::Private))?;
            match state {
                SessionState::Authenticated(session) if session.is_admin() => {
                    Ok(AdminSession(session))
                }
                SessionState::Authenticated(session) => {
                    log::warn!("Non-admin {} denied {}", session.uid, req.path());
                    Err(AppError::Forbidden(
                        "Unauthorized: Only admin users can access this panel".into(),
                    ))
                }
                SessionState::Unknown => Err(AppError::Unavailable),
                SessionState::Unauthenticated => Err(AppError::Redirect(LOGIN_PATH)),
            }
        })
    }
}

impl FromRequest for Visitor {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let state = resolve(&req).await?;
            enforce(decide(&state, RouteKind::Public))?;
            Ok(Visitor)
        })
    }
}
