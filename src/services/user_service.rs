//! User service.
//!
//! Actor resolution, listing with the scope-visibility rule, and the
//! hierarchy-gated mutations (update, scope change, expiry). All permission
//! decisions delegate to the pure functions in `domain::access`.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{access, Password, ScopeSet, UpdateUser, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{UserRepository, UserVisibility};
use crate::types::PageParams;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Resolve an authenticated actor by id.
    ///
    /// Expired or unknown accounts fail resolution; an expired user can
    /// never act again.
    async fn resolve_actor(&self, id: Uuid) -> AppResult<User>;

    /// Get an active user by id.
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// List accounts visible to `actor`, ordered by creation date.
    async fn list_users(&self, actor: &User, params: &PageParams) -> AppResult<Vec<User>>;

    /// Update a user's password/email/name, subject to the hierarchy rules.
    async fn update_user(&self, actor: &User, target_id: Uuid, changes: UpdateUser)
        -> AppResult<()>;

    /// Replace a user's scope set, subject to the hierarchy rules.
    async fn update_scopes(&self, actor: &User, target_id: Uuid, scopes: ScopeSet)
        -> AppResult<()>;

    /// Soft-expire a user, subject to the hierarchy rules.
    async fn expire_user(&self, actor: &User, target_id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Load the target of a mutation, enforcing the hierarchy gate.
    ///
    /// The cheap self-check runs before the lookup so an unprivileged actor
    /// probing foreign ids learns nothing beyond "forbidden".
    async fn load_target(&self, actor: &User, target_id: Uuid) -> AppResult<User> {
        if !access::is_privileged(&actor.scopes) && target_id != actor.id {
            return Err(AppError::Forbidden);
        }

        let target = self.users.find_by_id(target_id).await?.ok_or_not_found()?;

        if !access::can_act_on(&actor.scopes, &target.scopes, actor.id == target.id) {
            return Err(AppError::Forbidden);
        }

        Ok(target)
    }

    /// Persist only when a setter actually ran.
    async fn save_if_dirty(&self, user: &User) -> AppResult<()> {
        if user.is_dirty() {
            self.users.update(user).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn resolve_actor(&self, id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_users(&self, actor: &User, params: &PageParams) -> AppResult<Vec<User>> {
        if !access::is_privileged(&actor.scopes) {
            return Err(AppError::Forbidden);
        }
        params.validate()?;

        let visibility = if access::sees_all_users(&actor.scopes) {
            UserVisibility::All
        } else {
            UserVisibility::UserScopedOnly
        };

        self.users
            .list(visibility, params.offset(), params.limit())
            .await
    }

    async fn update_user(
        &self,
        actor: &User,
        target_id: Uuid,
        changes: UpdateUser,
    ) -> AppResult<()> {
        let mut target = self.load_target(actor, target_id).await?;

        if let Some(password) = changes.password {
            let hashed = Password::new(&password)?;
            target.set_password_hash(hashed.into_string());
        }
        if let Some(email) = changes.email {
            target.set_email(email);
        }
        if let Some(name) = changes.name {
            target.set_name(name);
        }

        self.save_if_dirty(&target).await
    }

    async fn update_scopes(
        &self,
        actor: &User,
        target_id: Uuid,
        scopes: ScopeSet,
    ) -> AppResult<()> {
        if scopes.is_empty() {
            return Err(AppError::validation("scopes must not be empty"));
        }

        let mut target = self.load_target(actor, target_id).await?;
        target.set_scopes(scopes);
        self.save_if_dirty(&target).await
    }

    async fn expire_user(&self, actor: &User, target_id: Uuid) -> AppResult<()> {
        let mut target = self.load_target(actor, target_id).await?;
        target.expire();

        tracing::info!(target_id = %target.id, actor_id = %actor.id, "expiring user");
        self.save_if_dirty(&target).await
    }
}
