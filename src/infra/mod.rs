//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connection and repositories
//! - Refresh-token store (Redis)
//! - Weather connector

pub mod cache;
pub mod db;
pub mod repositories;
pub mod weather;

pub use cache::{Cache, RefreshTokenStore};
pub use db::{Database, Migrator};
pub use repositories::{
    ActivityRepository, ActivityStore, UserRepository, UserStore, UserVisibility,
};
pub use weather::{DarkSkyClient, WeatherProvider};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::MockRefreshTokenStore;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockActivityRepository, MockUserRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use weather::MockWeatherProvider;
