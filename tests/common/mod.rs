//! Shared in-memory fakes for service-level tests.
//!
//! No database or Redis required: the repository and token-store traits are
//! implemented over mutex-guarded vectors, and the weather provider returns
//! a canned daily block.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use jogtrack::config::AuthConfig;
use jogtrack::domain::{ActivityRecord, Location, User, WeatherCondition};
use jogtrack::errors::{AppError, AppResult};
use jogtrack::filter::{CmpOp, Comparison, FilterExpr};
use jogtrack::infra::{
    ActivityRepository, RefreshTokenStore, UserRepository, UserVisibility, WeatherProvider,
};
use jogtrack::services::{ActivityManager, Authenticator, UserManager};

// =============================================================================
// Users
// =============================================================================

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|u| u.id == id && !u.is_expired())
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|u| u.username == username && !u.is_expired())
            .cloned())
    }

    async fn create(&self, user: &User) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|u| u.username == user.username && !u.is_expired())
        {
            return Err(AppError::conflict(format!("username {}", user.username)));
        }
        rows.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|u| u.id == user.id) {
            Some(row) => {
                *row = user.clone();
                Ok(())
            }
            None => Err(AppError::NotFound),
        }
    }

    async fn list(
        &self,
        visibility: UserVisibility,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<User>> {
        let mut rows: Vec<User> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|u| !u.is_expired())
            .filter(|u| match visibility {
                UserVisibility::All => true,
                UserVisibility::UserScopedOnly => {
                    u.scopes == jogtrack::domain::ScopeSet::user_only()
                }
            })
            .cloned()
            .collect();
        rows.sort_by_key(|u| u.created_at);
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

// =============================================================================
// Activities
// =============================================================================

#[derive(Default)]
pub struct InMemoryActivities {
    rows: Mutex<Vec<ActivityRecord>>,
}

fn cmp_matches(ordering: Ordering, op: CmpOp) -> bool {
    match op {
        CmpOp::Eq => ordering == Ordering::Equal,
        CmpOp::Ne => ordering != Ordering::Equal,
        CmpOp::Ge => ordering != Ordering::Less,
        CmpOp::Le => ordering != Ordering::Greater,
    }
}

/// Evaluate a translated filter against one record, mirroring the inclusive
/// bound semantics of the SQL compilation.
pub fn filter_matches(expr: &FilterExpr, record: &ActivityRecord) -> bool {
    match expr {
        FilterExpr::And(left, right) => {
            filter_matches(left, record) && filter_matches(right, record)
        }
        FilterExpr::Cmp(cmp) => match *cmp {
            Comparison::Date(op, value) => cmp_matches(record.date.cmp(&value), op),
            Comparison::Distance(op, value) => {
                cmp_matches(i64::from(record.distance).cmp(&value), op)
            }
            Comparison::Time(op, value) => cmp_matches(i64::from(record.duration).cmp(&value), op),
        },
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivities {
    async fn create(&self, record: &ActivityRecord) -> AppResult<()> {
        self.rows.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn update(&self, record: &ActivityRecord) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.id == record.id) {
            Some(row) => {
                *row = record.clone();
                Ok(())
            }
            None => Err(AppError::NotFound),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ActivityRecord>> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        filter: Option<FilterExpr>,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<ActivityRecord>> {
        let mut rows: Vec<ActivityRecord> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .filter(|r| filter.as_ref().map_or(true, |f| filter_matches(f, r)))
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.date);
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn list_all_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<ActivityRecord>> {
        let mut rows: Vec<ActivityRecord> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }
}

// =============================================================================
// Refresh tokens & weather
// =============================================================================

#[derive(Default)]
pub struct FakeTokenStore {
    pub tokens: Mutex<HashMap<Uuid, String>>,
}

#[async_trait]
impl RefreshTokenStore for FakeTokenStore {
    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        self.tokens
            .lock()
            .unwrap()
            .insert(user_id, token.to_string());
        Ok(())
    }

    async fn retrieve_refresh_token(&self, user_id: Uuid) -> AppResult<Option<String>> {
        Ok(self.tokens.lock().unwrap().get(&user_id).cloned())
    }

    async fn delete_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let mut tokens = self.tokens.lock().unwrap();
        if tokens.get(&user_id).map(String::as_str) == Some(token) {
            tokens.remove(&user_id);
        }
        Ok(())
    }
}

/// Always answers with the same daily block.
pub struct FixedWeather;

#[async_trait]
impl WeatherProvider for FixedWeather {
    async fn daily_condition(
        &self,
        _location: &Location,
        _date: NaiveDate,
    ) -> AppResult<Option<WeatherCondition>> {
        Ok(Some(WeatherCondition::new(json!({
            "summary": "Clear throughout the day.",
            "icon": "clear-day"
        }))))
    }
}

/// Provider with no data for any location/date.
pub struct NoWeather;

#[async_trait]
impl WeatherProvider for NoWeather {
    async fn daily_condition(
        &self,
        _location: &Location,
        _date: NaiveDate,
    ) -> AppResult<Option<WeatherCondition>> {
        Ok(None)
    }
}

// =============================================================================
// Environment
// =============================================================================

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration-test-secret-32-chars!".to_string(),
        jwt_expiration_minutes: 10,
    }
}

/// Fully wired service graph over the in-memory fakes.
pub struct TestEnv {
    pub users: Arc<InMemoryUsers>,
    pub activities: Arc<InMemoryActivities>,
    pub tokens: Arc<FakeTokenStore>,
    pub auth: Authenticator,
    pub user_service: UserManager,
    pub activity_service: ActivityManager,
}

pub fn test_env() -> TestEnv {
    let users = Arc::new(InMemoryUsers::default());
    let activities = Arc::new(InMemoryActivities::default());
    let tokens = Arc::new(FakeTokenStore::default());

    TestEnv {
        auth: Authenticator::new(users.clone(), tokens.clone(), auth_config()),
        user_service: UserManager::new(users.clone()),
        activity_service: ActivityManager::new(activities.clone(), Arc::new(FixedWeather)),
        users,
        activities,
        tokens,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
