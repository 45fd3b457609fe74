//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Account deletion removes playlists, anime entries and the user row in one
//! transaction. The foreign keys also cascade, but the explicit deletes keep
//! the behaviour independent of how the schema was provisioned.

use async_trait::async_trait;
use diesel::dsl::{exists, now};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, PasswordHash, StoredCredentials, User, UserId, UserName,
};

use super::diesel_helpers::{is_unique_violation, map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserProfileUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{anime_entries, playlists, users};

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn map_write_error(error: diesel::result::Error, email: &EmailAddress) -> UserPersistenceError {
    if is_unique_violation(&error, EMAIL_CONSTRAINT) {
        UserPersistenceError::duplicate_email(email.as_ref())
    } else {
        map_diesel_error(error)
    }
}

fn row_to_credentials(row: UserRow) -> Result<StoredCredentials, UserPersistenceError> {
    let invalid = |err: crate::domain::UserValidationError| {
        UserPersistenceError::query(format!("stored user {} is invalid: {err}", row.id))
    };
    let user = User::new(
        UserId::from_uuid(row.id),
        UserName::new(&row.name).map_err(invalid)?,
        EmailAddress::new(&row.email).map_err(invalid)?,
        row.theme.parse().map_err(invalid)?,
        row.is_demo,
    );
    Ok(StoredCredentials {
        user,
        password_hash: PasswordHash::new(row.password_hash),
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, account: &StoredCredentials) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = &account.user;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password_hash: account.password_hash.as_str(),
            theme: user.theme().as_str(),
            is_demo: user.is_demo(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, user.email()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| row_to_credentials(row).map(|stored| stored.user))
            .transpose()
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_credentials).transpose()
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(users::table.filter(users::email.eq(email.as_ref()))))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn update_profile(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = UserProfileUpdate {
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            theme: user.theme().as_str(),
        };

        let updated = diesel::update(users::table.filter(users::id.eq(user.id().as_uuid())))
            .set((&changes, users::updated_at.eq(now)))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, user.email()))?;
        Ok(updated > 0)
    }

    async fn delete_with_owned_resources(
        &self,
        id: &UserId,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *id.as_uuid();

        conn.transaction(|conn| {
            async move {
                diesel::delete(playlists::table.filter(playlists::owner_id.eq(owner)))
                    .execute(conn)
                    .await?;
                diesel::delete(anime_entries::table.filter(anime_entries::owner_id.eq(owner)))
                    .execute(conn)
                    .await?;
                let removed = diesel::delete(users::table.filter(users::id.eq(owner)))
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(removed > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage; query behaviour is exercised against a live
    //! database outside the unit suite.
    use super::*;
    use crate::domain::Theme;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    #[fixture]
    fn row() -> UserRow {
        UserRow {
            id: Uuid::from_u128(7),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
            theme: "light".into(),
            is_demo: true,
        }
    }

    #[rstest]
    fn row_converts_to_credentials(row: UserRow) {
        let stored = row_to_credentials(row).expect("valid row");
        assert_eq!(stored.user.theme(), Theme::Light);
        assert!(stored.user.is_demo());
        assert!(stored.password_hash.as_str().starts_with("$argon2id$"));
    }

    #[rstest]
    fn corrupt_theme_surfaces_as_query_error(mut row: UserRow) {
        row.theme = "sepia".into();
        let err = row_to_credentials(row).expect_err("invalid theme");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }
}
