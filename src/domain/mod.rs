//! Domain layer - Core business entities and logic
//!
//! Contains the entities, value objects and pure policy functions that make
//! up the business model, independent of infrastructure concerns.

pub mod access;
pub mod activity;
pub mod password;
pub mod user;

pub use activity::{
    ActivityPatch, ActivityRecord, Location, NewActivity, WeatherCondition,
};
pub use password::Password;
pub use user::{Scope, ScopeSet, UpdateUser, User, UserResponse};
