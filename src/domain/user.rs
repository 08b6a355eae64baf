use chrono::{DateTime, Utc};

use super::errors::DomainError;

/// A console user profile. `id` is the identity-service uid.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
    pub is_super_admin: bool,
    pub blocked: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
    pub created_by: Option<String>,
}

/// Resume position in the users listing (ordered by email, then id).
#[derive(Debug, Clone, PartialEq)]
pub struct UserCursor {
    pub email: String,
    pub id: String,
}

impl From<&User> for UserCursor {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id.clone(),
        }
    }
}

/// Input of the admin-creation flow.
#[derive(Debug, Clone)]
pub struct AdminDraft {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl AdminDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !is_plausible_email(&self.email) {
            return Err(DomainError::InvalidInput("Invalid email address".into()));
        }
        if self.username.trim().chars().count() < 3 {
            return Err(DomainError::InvalidInput(
                "Username must be at least 3 characters".into(),
            ));
        }
        if self.password.is_empty() {
            return Err(DomainError::InvalidInput("Password is required".into()));
        }
        if self.password.chars().count() < 6 {
            return Err(DomainError::InvalidInput(
                "Password must be at least 6 characters".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a block/unblock action.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockChange {
    pub user_id: String,
    pub blocked: bool,
}

pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}
