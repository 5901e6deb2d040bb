//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.

mod activity_service;
mod auth_service;
pub mod container;
pub mod report;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use activity_service::{ActivityManager, ActivityService};
pub use auth_service::{AuthService, Authenticator, Claims, Registration, TokenResponse};
pub use user_service::{UserManager, UserService};

// Report types
pub use report::{WeekStats, WeeklyReport};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
