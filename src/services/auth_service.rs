//! Authentication service.
//!
//! Registration, login, token verification and logout. Password hashing is
//! delegated to the domain `Password` value object; refresh tokens live in
//! the external token store.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{AuthConfig, SECONDS_PER_MINUTE, TOKEN_TYPE_BEARER};
use crate::domain::{Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::{RefreshTokenStore, UserRepository};

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub scopes: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Token pair returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    pub access_token: String,
    /// Opaque refresh token, also cached server-side
    pub refresh_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access-token lifetime in seconds
    #[schema(example = 600)]
    pub expires_in: i64,
}

/// Input for registering a new account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user account.
    async fn register(&self, registration: Registration) -> AppResult<User>;

    /// Login and return a token pair.
    async fn login(&self, username: &str, password: &str) -> AppResult<TokenResponse>;

    /// Verify a JWT access token and extract its claims.
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Drop the cached refresh token; missing or mismatched tokens are a
    /// no-op.
    async fn logout(&self, user_id: Uuid, refresh_token: &str) -> AppResult<()>;
}

/// Generate a token pair for a user.
fn generate_tokens(user: &User, config: &AuthConfig) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::minutes(config.jwt_expiration_minutes);

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        scopes: user.scopes.iter().map(|s| s.to_string()).collect(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        refresh_token: Uuid::new_v4().to_string(),
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_minutes * SECONDS_PER_MINUTE,
    })
}

/// Concrete implementation of AuthService.
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn RefreshTokenStore>,
    config: AuthConfig,
}

impl Authenticator {
    /// Create new auth service instance
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn RefreshTokenStore>,
        config: AuthConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            config,
        }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        // Strength policy is checked before touching storage
        let password_hash = Password::new(&registration.password)?.into_string();

        let user = User::new(
            registration.username,
            password_hash,
            registration.email,
            registration.name,
        );

        // Uniqueness among active accounts is enforced inside the insert
        // transaction; a duplicate surfaces as a conflict.
        self.users.create(&user).await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    async fn login(&self, username: &str, password: &str) -> AppResult<TokenResponse> {
        let user_result = self.users.find_by_username(username).await?;

        // Verify against a dummy hash when the user is unknown so response
        // timing does not leak which usernames exist.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let (password_hash, user_exists) = match &user_result {
            Some(user) => (user.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let stored_password = Password::from_hash(password_hash.to_string());
        let password_valid = stored_password.verify(password);

        let user = match user_result {
            Some(user) if user_exists && password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        let response = generate_tokens(&user, &self.config)?;
        self.tokens
            .store_refresh_token(user.id, &response.refresh_token)
            .await?;

        tracing::debug!(user_id = %user.id, "login succeeded");
        Ok(response)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn logout(&self, user_id: Uuid, refresh_token: &str) -> AppResult<()> {
        self.tokens
            .delete_refresh_token(user_id, refresh_token)
            .await
    }
}
