//! User repository with soft-expiry support.
//!
//! All query methods exclude expired accounts; expiry is a terminal state
//! and nothing in the application resolves an expired user. Every write runs
//! in a transaction that commits on success and rolls back re-raising on
//! failure.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{ScopeSet, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Which accounts a listing query may return.
///
/// Managers pass the listing gate but only see user-scoped accounts; admins
/// see everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserVisibility {
    All,
    UserScopedOnly,
}

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find an active user by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find an active user by exact (case-sensitive) username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Persist a new user; fails with a conflict if the username is already
    /// taken by an active account.
    async fn create(&self, user: &User) -> AppResult<()>;

    /// Full overwrite of an existing user's mutable fields.
    async fn update(&self, user: &User) -> AppResult<()>;

    /// List active accounts ordered by creation date ascending.
    async fn list(
        &self,
        visibility: UserVisibility,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserRepository backed by SeaORM.
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active(user: &User) -> AppResult<ActiveModel> {
    Ok(ActiveModel {
        id: Set(user.id),
        username: Set(user.username.clone()),
        password_hash: Set(user.password_hash.clone()),
        scopes: Set(user.scopes.encode()?),
        email: Set(user.email.clone()),
        name: Set(user.name.clone()),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
        expire_date: Set(user.expire_date),
    })
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .filter(user::Column::ExpireDate.is_null())
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::ExpireDate.is_null())
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(User::try_from).transpose()
    }

    async fn create(&self, user: &User) -> AppResult<()> {
        let username = user.username.clone();
        let active = to_active(user)?;

        // The uniqueness constraint is "unique among non-expired rows", which
        // a plain unique index cannot express; the check runs inside the
        // insert transaction instead.
        self.db
            .transaction::<_, (), AppError>(move |txn| {
                Box::pin(async move {
                    let taken = UserEntity::find()
                        .filter(user::Column::Username.eq(username.clone()))
                        .filter(user::Column::ExpireDate.is_null())
                        .one(txn)
                        .await
                        .map_err(AppError::from)?
                        .is_some();

                    if taken {
                        return Err(AppError::conflict(format!("username {}", username)));
                    }

                    active.insert(txn).await.map_err(AppError::from)?;
                    Ok(())
                })
            })
            .await?;

        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let active = to_active(user)?;

        self.db
            .transaction::<_, (), AppError>(move |txn| {
                Box::pin(async move {
                    active.update(txn).await.map_err(|e| match e {
                        DbErr::RecordNotUpdated => AppError::NotFound,
                        other => AppError::Database(other),
                    })?;
                    Ok(())
                })
            })
            .await?;

        Ok(())
    }

    async fn list(
        &self,
        visibility: UserVisibility,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<User>> {
        let mut query = UserEntity::find().filter(user::Column::ExpireDate.is_null());

        if visibility == UserVisibility::UserScopedOnly {
            // The codec writes a canonical array, so equality is enough to
            // select accounts holding the user scope and nothing else.
            query = query.filter(user::Column::Scopes.eq(ScopeSet::user_only_encoded()));
        }

        let models = query
            .order_by_asc(user::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(User::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn listing_filters_to_canonical_user_scope() {
        let query = UserEntity::find()
            .filter(user::Column::ExpireDate.is_null())
            .filter(user::Column::Scopes.eq(ScopeSet::user_only_encoded()))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(query.contains(r#""expire_date" IS NULL"#));
        assert!(query.contains(r#""scopes" = '["user"]'"#));
    }
}
