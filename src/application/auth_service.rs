use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::guard::{Session, SessionState};
use crate::domain::ports::{IdentityProvider, UserRepository};
use crate::domain::user::is_plausible_email;

/// A signed-in admin with the tokens the client presents from now on.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminLogin {
    pub session: Session,
    pub id_token: String,
    pub refresh_token: String,
}

pub trait SessionAuth: Send + Sync {
    fn login(&self, email: &str, password: &str) -> Result<AdminLogin, DomainError>;
    fn send_password_reset(&self, email: &str) -> Result<(), DomainError>;
    fn logout(&self, session: &Session) -> Result<(), DomainError>;
    /// Never fails: an unreachable identity service or store yields `Unknown`.
    fn resolve_session(&self, id_token: Option<&str>) -> SessionState;
}

pub struct AuthService<R, I> {
    users: R,
    identity: Arc<I>,
}

impl<R: UserRepository, I: IdentityProvider> AuthService<R, I> {
    pub fn new(users: R, identity: Arc<I>) -> Self {
        Self { users, identity }
    }
}

impl<R: UserRepository, I: IdentityProvider> SessionAuth for AuthService<R, I> {
    fn login(&self, email: &str, password: &str) -> Result<AdminLogin, DomainError> {
        let signed_in = self.identity.sign_in(email.trim(), password)?;
        let profile = self.users.find_by_id(&signed_in.uid)?;

        if !profile.as_ref().is_some_and(|p| p.is_admin) {
            // The tokens are dropped here, which is the sign-out.
            log::warn!("Rejected console sign-in of non-admin {}", signed_in.uid);
            return Err(DomainError::Unauthorized(
                "Unauthorized: Only admin users can access this panel".into(),
            ));
        }

        Ok(AdminLogin {
            session: Session {
                uid: signed_in.uid,
                email: signed_in.email,
                profile,
            },
            id_token: signed_in.id_token,
            refresh_token: signed_in.refresh_token,
        })
    }

    fn send_password_reset(&self, email: &str) -> Result<(), DomainError> {
        let email = email.trim();
        if !is_plausible_email(email) {
            return Err(DomainError::InvalidInput("Invalid email address".into()));
        }
        self.identity.send_password_reset(email)
    }

    fn logout(&self, session: &Session) -> Result<(), DomainError> {
        self.identity.revoke_sessions(&session.uid)
    }

    fn resolve_session(&self, id_token: Option<&str>) -> SessionState {
        let Some(token) = id_token.filter(|t| !t.is_empty()) else {
            return SessionState::Unauthenticated;
        };
        let identity = match self.identity.verify(token) {
            Ok(Some(identity)) => identity,
            Ok(None) => return SessionState::Unauthenticated,
            Err(e) => {
                log::warn!("Session could not be verified: {}", e);
                return SessionState::Unknown;
            }
        };
        match self.users.find_by_id(&identity.uid) {
            Ok(profile) => SessionState::Authenticated(Session {
                uid: identity.uid,
                email: identity.email,
                profile,
            }),
            Err(e) => {
                log::warn!("Profile of {} could not be loaded: {}", identity.uid, e);
                SessionState::Unknown
            }
        }
    }
}
