//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Profile mutations are single `UPDATE ... RETURNING` statements so the
//! refreshed row comes back in one round trip. Prefix search lower-cases
//! both sides and escapes `LIKE` metacharacters in the query.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{ProfileUpdate, UserPersistenceError, UserRepository};
use crate::domain::{
    AvatarPath, Bio, User, UserId, UserSummary, UserValidationError, Username, UsernamePrefix,
};

use super::models::{UserProfileChanges, UserRow, UserSummaryRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

diesel::define_sql_function! {
    fn lower(value: Text) -> Text;
}

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.into_message())
}

fn map_diesel_error(
    error: diesel::result::Error,
    update: Option<&ProfileUpdate>,
) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => match update {
            Some(ProfileUpdate::Username(username)) => {
                UserPersistenceError::duplicate_username(username.as_ref())
            }
            _ => UserPersistenceError::query("unique constraint violated"),
        },
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        _ => UserPersistenceError::query("database error"),
    }
}

fn map_row_error(error: UserValidationError) -> UserPersistenceError {
    UserPersistenceError::query(format!("stored user row is invalid: {error}"))
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let username = Username::new(row.username).map_err(map_row_error)?;
    let bio = row.bio.map(Bio::new).transpose().map_err(map_row_error)?;
    let avatar = row
        .avatar
        .map(AvatarPath::new)
        .transpose()
        .map_err(map_row_error)?;
    Ok(User::new(UserId::from_uuid(row.id), username)
        .with_bio(bio)
        .with_avatar(avatar))
}

fn row_to_summary(row: UserSummaryRow) -> Result<UserSummary, UserPersistenceError> {
    Ok(UserSummary {
        id: UserId::from_uuid(row.id),
        username: Username::new(row.username).map_err(map_row_error)?,
        avatar: row
            .avatar
            .map(AvatarPath::new)
            .transpose()
            .map_err(map_row_error)?,
    })
}

fn changes_for(update: &ProfileUpdate) -> UserProfileChanges<'_> {
    let mut changes = UserProfileChanges {
        username: None,
        bio: None,
        avatar: None,
        updated_at: Utc::now(),
    };
    match update {
        ProfileUpdate::Avatar(path) => changes.avatar = Some(Some(path.as_ref())),
        ProfileUpdate::Bio(bio) => changes.bio = Some(bio.as_ref().map(AsRef::as_ref)),
        ProfileUpdate::Username(username) => changes.username = Some(username.as_ref()),
    }
    changes
}

/// Lower-case `prefix` and escape `\`, `%` and `_` so they match literally
/// under PostgreSQL's default `LIKE` escape character.
fn like_prefix_pattern(prefix: &UsernamePrefix) -> String {
    let mut pattern = String::with_capacity(prefix.as_ref().len() + 1);
    for ch in prefix.as_ref().to_lowercase().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;
        row.map(row_to_user).transpose()
    }

    async fn apply_profile_update(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = changes_for(update);
        let row = diesel::update(users::table.find(*id.as_uuid()))
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, Some(update)))?;
        row.map(row_to_user).transpose()
    }

    async fn search_by_username_prefix(
        &self,
        prefix: &UsernamePrefix,
        limit: usize,
    ) -> Result<Vec<UserSummary>, UserPersistenceError> {
        let limit = i64::try_from(limit)
            .map_err(|_| UserPersistenceError::query("search limit out of range"))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserSummaryRow> = users::table
            .filter(lower(users::username).like(like_prefix_pattern(prefix)))
            .select(UserSummaryRow::as_select())
            .order(users::username.asc())
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;
        rows.into_iter().map(row_to_summary).collect()
    }
}
