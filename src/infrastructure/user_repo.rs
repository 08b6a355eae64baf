use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::pagination::PageSource;
use crate::domain::ports::UserRepository;
use crate::domain::user::{NewUser, User, UserCursor};
use crate::schema::users;

use super::models::{NewUserRow, UserRow};

#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl PageSource for DieselUserRepository {
    type Item = User;
    type Filter = ();
    type Cursor = UserCursor;

    fn count(&self, _: &()) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(users::table.count().get_result(&mut conn)?)
    }

    fn cursor_at(&self, _: &(), position: i64) -> Result<Option<UserCursor>, DomainError> {
        let mut conn = self.pool.get()?;
        let key = users::table
            .select((users::email, users::id))
            .order((users::email.asc(), users::id.asc()))
            .offset(position)
            .first::<(String, String)>(&mut conn)
            .optional()?;
        Ok(key.map(|(email, id)| UserCursor { email, id }))
    }

    fn page_after(
        &self,
        _: &(),
        after: Option<&UserCursor>,
        limit: i64,
    ) -> Result<Vec<User>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = users::table
            .select(UserRow::as_select())
            .order((users::email.asc(), users::id.asc()))
            .limit(limit)
            .into_boxed();
        if let Some(c) = after {
            query = query.filter(
                users::email
                    .gt(c.email.clone())
                    .or(users::email.eq(c.email.clone()).and(users::id.gt(c.id.clone()))),
            );
        }
        let rows = query.load(&mut conn)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    fn cursor_of(item: &User) -> UserCursor {
        UserCursor::from(item)
    }
}

impl UserRepository for DieselUserRepository {
    fn find_by_id(&self, id: &str) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(User::from))
    }

    fn insert(&self, user: NewUser) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: &user.id,
                email: &user.email,
                display_name: &user.display_name,
                is_admin: user.is_admin,
                created_by: user.created_by.as_deref(),
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn set_blocked(&self, id: &str, blocked: bool) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(users::table.find(id))
            .set(users::blocked.eq(blocked))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(users::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
