//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod jogging_result;
pub mod user;
