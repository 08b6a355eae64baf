use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::guard::Session;
use crate::domain::pagination::{paginate, CursorCache, Page, PageRequest};
use crate::domain::ports::{IdentityProvider, NewAccount, UserRepository};
use crate::domain::user::{AdminDraft, BlockChange, NewUser, User, UserCursor};

/// User management as seen by the console.
pub trait UserAdmin: Send + Sync {
    fn list_users(&self, page: i64) -> Result<Page<User>, DomainError>;
    fn block_user(
        &self,
        actor: &Session,
        user_id: &str,
        block: bool,
    ) -> Result<BlockChange, DomainError>;
    fn delete_user(&self, actor: &Session, user_id: &str) -> Result<(), DomainError>;
    fn create_admin(&self, actor: &Session, draft: AdminDraft) -> Result<User, DomainError>;
}

pub struct UserService<R, I> {
    repo: R,
    identity: Arc<I>,
    cursors: CursorCache<(), UserCursor>,
    page_size: i64,
}

impl<R: UserRepository, I: IdentityProvider> UserService<R, I> {
    pub fn new(repo: R, identity: Arc<I>, page_size: i64) -> Self {
        Self {
            repo,
            identity,
            cursors: CursorCache::new(),
            page_size,
        }
    }
}

impl<R: UserRepository, I: IdentityProvider> UserAdmin for UserService<R, I> {
    fn list_users(&self, page: i64) -> Result<Page<User>, DomainError> {
        paginate(
            &self.repo,
            &self.cursors,
            &(),
            PageRequest {
                page,
                page_size: self.page_size,
            },
        )
    }

    fn block_user(
        &self,
        actor: &Session,
        user_id: &str,
        block: bool,
    ) -> Result<BlockChange, DomainError> {
        if actor.uid == user_id {
            return Err(DomainError::Forbidden(
                "You cannot block your own account".into(),
            ));
        }
        let target = self.repo.find_by_id(user_id)?.ok_or(DomainError::NotFound)?;
        if target.is_super_admin {
            return Err(DomainError::Unauthorized(
                "Unauthorized: Cannot block super admin".into(),
            ));
        }
        self.repo.set_blocked(user_id, block)?;
        Ok(BlockChange {
            user_id: user_id.to_string(),
            blocked: block,
        })
    }

    fn delete_user(&self, actor: &Session, user_id: &str) -> Result<(), DomainError> {
        if actor.uid == user_id {
            return Err(DomainError::Forbidden(
                "You cannot delete your own account".into(),
            ));
        }
        if !actor.is_super_admin() {
            return Err(DomainError::Forbidden(
                "You are not allowed to delete users".into(),
            ));
        }
        self.repo.find_by_id(user_id)?.ok_or(DomainError::NotFound)?;
        self.identity.delete_account(user_id)?;
        self.repo.delete(user_id)?;
        self.cursors.clear();
        Ok(())
    }

    fn create_admin(&self, actor: &Session, draft: AdminDraft) -> Result<User, DomainError> {
        // The session may predate a demotion, so the flag is read again.
        let actor_is_admin = self
            .repo
            .find_by_id(&actor.uid)?
            .is_some_and(|profile| profile.is_admin);
        if !actor_is_admin {
            return Err(DomainError::Unauthorized(
                "Unauthorized: Only admins can create new admin users".into(),
            ));
        }
        draft.validate()?;

        let email = draft.email.trim().to_string();
        let username = draft.username.trim().to_string();
        let uid = self.identity.create_account(&NewAccount {
            email: email.clone(),
            password: draft.password,
            display_name: username.clone(),
        })?;
        self.identity.grant_admin(&uid)?;

        let user = self.repo.insert(NewUser {
            id: uid,
            email,
            display_name: username,
            is_admin: true,
            created_by: Some(actor.uid.clone()),
        })?;
        self.cursors.clear();
        Ok(user)
    }
}
