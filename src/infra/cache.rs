//! Redis-backed refresh-token store.
//!
//! The only caching this service does: a key/value store holding the
//! refresh token issued at login, consulted by the auth layer.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use uuid::Uuid;

use crate::config::{Config, CACHE_PREFIX_REFRESH_TOKEN};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Refresh-token persistence used by the auth service.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Store the refresh token for a user (no TTL; one token per user).
    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()>;

    /// Retrieve the cached refresh token for a user.
    async fn retrieve_refresh_token(&self, user_id: Uuid) -> AppResult<Option<String>>;

    /// Delete the cached refresh token, but only if it matches `token`.
    ///
    /// A missing or mismatched cached token is tolerated as a no-op; this is
    /// the one place a failure is deliberately swallowed.
    async fn delete_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()>;
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Create a new cache instance and connect to Redis.
    ///
    /// # Panics
    /// Panics if Redis connection fails.
    pub async fn connect(config: &Config) -> Self {
        let client = Client::open(config.redis_url.as_str()).expect("Failed to create Redis client");

        let connection = ConnectionManager::new(client)
            .await
            .expect("Failed to connect to Redis");

        tracing::info!("Redis cache connected");

        Self { connection }
    }

    /// Try to connect to Redis, returning an error instead of panicking.
    pub async fn try_connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    /// Check if a key exists (used by the health endpoint).
    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(key).await.map_err(cache_error)?;
        Ok(exists)
    }

    fn token_key(user_id: Uuid) -> String {
        format!("{}{}", CACHE_PREFIX_REFRESH_TOKEN, user_id)
    }
}

#[async_trait]
impl RefreshTokenStore for Cache {
    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .set(Self::token_key(user_id), token)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    async fn retrieve_refresh_token(&self, user_id: Uuid) -> AppResult<Option<String>> {
        let mut conn = self.connection.clone();
        let token: Option<String> = conn
            .get(Self::token_key(user_id))
            .await
            .map_err(cache_error)?;
        Ok(token)
    }

    async fn delete_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let key = Self::token_key(user_id);
        let mut conn = self.connection.clone();

        let cached: Option<String> = conn.get(&key).await.map_err(cache_error)?;
        if cached.as_deref() == Some(token) {
            let _: () = conn.del(&key).await.map_err(cache_error)?;
        }
        Ok(())
    }
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}
