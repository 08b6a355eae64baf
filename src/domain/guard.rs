//! Session-derived route decisions.

use super::user::User;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// An established session, with the user's profile merged in when one exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub uid: String,
    pub email: String,
    pub profile: Option<User>,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.is_admin)
    }

    pub fn is_super_admin(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.is_super_admin)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// The identity service could not be consulted.
    Unknown,
    Authenticated(Session),
    Unauthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Sign-in and password recovery.
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
    /// No decision can be made until the session is known.
    Pending,
}

pub fn decide(state: &SessionState, route: RouteKind) -> GuardDecision {
    match (state, route) {
        (SessionState::Unauthenticated, RouteKind::Private) => GuardDecision::Redirect(LOGIN_PATH),
        (SessionState::Authenticated(_), RouteKind::Public) => GuardDecision::Redirect(HOME_PATH),
        (SessionState::Unknown, RouteKind::Private) => GuardDecision::Pending,
        (SessionState::Unknown, RouteKind::Public)
        | (SessionState::Unauthenticated, RouteKind::Public)
        | (SessionState::Authenticated(_), RouteKind::Private) => GuardDecision::Allow,
    }
}
