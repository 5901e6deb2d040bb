//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and
//! infrastructure. Built once at startup; nothing here is process-global.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database, RefreshTokenStore, WeatherProvider};
use crate::services::{ActivityService, AuthService, ServiceContainer, Services, UserService};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Activity service
    pub activity_service: Arc<dyn ActivityService>,
    /// Refresh-token store
    pub cache: Arc<Cache>,
    /// Database handle
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from the infrastructure handles and config.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        weather: Arc<dyn WeatherProvider>,
        config: &Config,
    ) -> Self {
        let tokens: Arc<dyn RefreshTokenStore> = cache.clone();
        let services = Services::from_parts(
            database.get_connection(),
            tokens,
            weather,
            config.auth(),
        );

        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            activity_service: services.activities(),
            cache,
            database,
        }
    }

    /// Create new application state with manually injected services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        activity_service: Arc<dyn ActivityService>,
        cache: Arc<Cache>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            activity_service,
            cache,
            database,
        }
    }
}
