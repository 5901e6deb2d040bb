//! User domain entity and scope types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, AppResult};

/// Capability label attached to a user account.
///
/// The derived ordering is the privilege order: `User < Manager < Admin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    User,
    Manager,
    Admin,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::User => write!(f, "user"),
            Scope::Manager => write!(f, "manager"),
            Scope::Admin => write!(f, "admin"),
        }
    }
}

/// Set of scopes held by a user.
///
/// Backed by an ordered set so the storage codec always produces a canonical
/// JSON array (`["user"]`, `["user","manager"]`, ...). Account-level
/// invariant: the set is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeSet(BTreeSet<Scope>);

impl ScopeSet {
    /// The default scope set for a freshly registered account.
    pub fn user_only() -> Self {
        Self(BTreeSet::from([Scope::User]))
    }

    pub fn contains(&self, scope: Scope) -> bool {
        self.0.contains(&scope)
    }

    /// Highest-privilege scope in the set, if any.
    pub fn highest(&self) -> Option<Scope> {
        self.0.iter().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Scope> + '_ {
        self.0.iter().copied()
    }

    /// Canonical storage form: the set has exactly this value when the
    /// account holds the `user` scope and nothing else.
    pub fn user_only_encoded() -> &'static str {
        r#"["user"]"#
    }

    /// Encode for the text storage column.
    pub fn encode(&self) -> AppResult<String> {
        serde_json::to_string(self)
            .map_err(|e| AppError::internal(format!("scope encoding failed: {}", e)))
    }

    /// Decode from the text storage column.
    pub fn decode(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| AppError::internal(format!("corrupt scope column: {}", e)))
    }
}

impl FromIterator<Scope> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = Scope>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// User domain entity.
///
/// Mutations go through the setters, which mark the entity as modified; an
/// unmodified entity is never written back (see [`User::is_dirty`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub scopes: ScopeSet,
    pub email: Option<String>,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft expiry timestamp (None = active, Some = expired)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<DateTime<Utc>>,
    #[serde(skip)]
    dirty: bool,
}

impl User {
    /// Create a new user with the default scope set.
    pub fn new(
        username: String,
        password_hash: String,
        email: Option<String>,
        name: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            scopes: ScopeSet::user_only(),
            email,
            name,
            created_at: now,
            updated_at: now,
            expire_date: None,
            dirty: false,
        }
    }

    /// Rebuild a user from persisted fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_storage(
        id: Uuid,
        username: String,
        password_hash: String,
        scopes: ScopeSet,
        email: Option<String>,
        name: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        expire_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            username,
            password_hash,
            scopes,
            email,
            name,
            created_at,
            updated_at,
            expire_date,
            dirty: false,
        }
    }

    /// Check if the account has been soft-expired.
    pub fn is_expired(&self) -> bool {
        self.expire_date.is_some()
    }

    /// Whether any setter has run since the entity was loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.touch();
    }

    pub fn set_email(&mut self, email: String) {
        self.email = Some(email);
        self.touch();
    }

    pub fn set_name(&mut self, name: String) {
        self.name = Some(name);
        self.touch();
    }

    pub fn set_scopes(&mut self, scopes: ScopeSet) {
        self.scopes = scopes;
        self.touch();
    }

    /// Soft-expire the account. Expired accounts fail every subsequent
    /// actor resolution and authentication attempt.
    pub fn expire(&mut self) {
        self.expire_date = Some(Utc::now());
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.dirty = true;
    }
}

/// User update data transfer object
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    /// New password (checked against the strength policy)
    pub password: Option<String>,
    /// New email address
    pub email: Option<String>,
    /// New display name
    pub name: Option<String>,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    pub user_id: Uuid,
    /// Login name
    #[schema(example = "runner42")]
    pub username: String,
    /// Display name
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    /// Email address
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    /// Scopes held by the account
    pub scopes: Vec<Scope>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            name: user.name,
            email: user.email,
            scopes: user.scopes.iter().collect(),
        }
    }
}
