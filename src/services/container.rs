//! Service container - Centralized service construction and access.
//!
//! Wires repositories, the token store and the weather connector into the
//! service implementations. Everything is handed in at construction; there
//! is no globally reachable state.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{ActivityManager, ActivityService, AuthService, Authenticator, UserManager, UserService};
use crate::config::AuthConfig;
use crate::infra::{ActivityStore, RefreshTokenStore, UserStore, WeatherProvider};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    /// Get activity service
    fn activities(&self) -> Arc<dyn ActivityService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    activity_service: Arc<dyn ActivityService>,
}

impl Services {
    /// Create a new service container from already-built services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        activity_service: Arc<dyn ActivityService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            activity_service,
        }
    }

    /// Build the full service graph from infrastructure handles
    pub fn from_parts(
        db: DatabaseConnection,
        tokens: Arc<dyn RefreshTokenStore>,
        weather: Arc<dyn WeatherProvider>,
        auth_config: AuthConfig,
    ) -> Self {
        let users = Arc::new(UserStore::new(db.clone()));
        let activities = Arc::new(ActivityStore::new(db));

        let auth_service = Arc::new(Authenticator::new(users.clone(), tokens, auth_config));
        let user_service = Arc::new(UserManager::new(users));
        let activity_service = Arc::new(ActivityManager::new(activities, weather));

        Self {
            auth_service,
            user_service,
            activity_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn activities(&self) -> Arc<dyn ActivityService> {
        self.activity_service.clone()
    }
}
