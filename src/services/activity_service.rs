//! Activity service.
//!
//! Record CRUD with ownership checks, filter translation for listings, the
//! weather snapshot captured on every write that changes date or location,
//! and the weekly report.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{ActivityPatch, ActivityRecord, Location, NewActivity, User, WeatherCondition};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::filter::{self, FilterExpr};
use crate::infra::{ActivityRepository, WeatherProvider};
use crate::services::report::{self, WeeklyReport};
use crate::types::PageParams;

/// Activity service trait for dependency injection.
#[async_trait]
pub trait ActivityService: Send + Sync {
    /// Create a record for the actor; returns the generated id.
    async fn create(&self, actor: &User, input: NewActivity) -> AppResult<Uuid>;

    /// Partially update one of the actor's records, returning the new state.
    async fn update(&self, actor: &User, id: Uuid, patch: ActivityPatch)
        -> AppResult<ActivityRecord>;

    /// Fetch one of the actor's records.
    async fn get(&self, actor: &User, id: Uuid) -> AppResult<ActivityRecord>;

    /// Delete one of the actor's records.
    async fn delete(&self, actor: &User, id: Uuid) -> AppResult<()>;

    /// List the actor's records, optionally narrowed by a filter expression.
    async fn list(
        &self,
        actor: &User,
        filter: Option<&str>,
        params: &PageParams,
    ) -> AppResult<Vec<ActivityRecord>>;

    /// Weekly aggregation over the actor's records.
    async fn weekly_report(&self, actor: &User, params: &PageParams) -> AppResult<WeeklyReport>;
}

/// Concrete implementation of ActivityService.
pub struct ActivityManager {
    activities: Arc<dyn ActivityRepository>,
    weather: Arc<dyn WeatherProvider>,
}

impl ActivityManager {
    /// Create new activity service instance
    pub fn new(activities: Arc<dyn ActivityRepository>, weather: Arc<dyn WeatherProvider>) -> Self {
        Self {
            activities,
            weather,
        }
    }

    /// Fetch a record and enforce ownership.
    async fn find_owned(&self, actor: &User, id: Uuid) -> AppResult<ActivityRecord> {
        let record = self.activities.find_by_id(id).await?.ok_or_not_found()?;

        if record.owner_id != actor.id {
            return Err(AppError::Forbidden);
        }

        Ok(record)
    }

    /// Fetch the weather snapshot; a connector failure or empty answer is a
    /// validation failure of the enclosing request.
    async fn fetch_condition(
        &self,
        location: &Location,
        date: NaiveDate,
    ) -> AppResult<WeatherCondition> {
        let lookup = self.weather.daily_condition(location, date).await;

        match lookup {
            Ok(Some(condition)) => Ok(condition),
            Ok(None) => Err(no_conditions()),
            Err(err) => {
                tracing::warn!(error = %err, "weather lookup failed");
                Err(no_conditions())
            }
        }
    }
}

fn no_conditions() -> AppError {
    AppError::validation("can't fetch running conditions for that location & time")
}

fn check_distance(distance: i32) -> AppResult<()> {
    if distance <= 0 {
        return Err(AppError::validation("distance needs to be positive"));
    }
    Ok(())
}

fn check_duration(duration: i32) -> AppResult<()> {
    if duration <= 0 {
        return Err(AppError::validation("invalid time (time should be positive)"));
    }
    Ok(())
}

#[async_trait]
impl ActivityService for ActivityManager {
    async fn create(&self, actor: &User, input: NewActivity) -> AppResult<Uuid> {
        check_distance(input.distance)?;
        check_duration(input.duration)?;

        let condition = self.fetch_condition(&input.location, input.date).await?;

        let record = ActivityRecord::new(
            actor.id,
            input.date,
            input.distance,
            input.duration,
            input.location,
            condition,
        );

        self.activities.create(&record).await?;
        tracing::debug!(record_id = %record.id, owner_id = %actor.id, "record created");
        Ok(record.id)
    }

    async fn update(
        &self,
        actor: &User,
        id: Uuid,
        patch: ActivityPatch,
    ) -> AppResult<ActivityRecord> {
        let mut record = self.find_owned(actor, id).await?;

        if let Some(distance) = patch.distance {
            check_distance(distance)?;
            record.distance = distance;
        }
        if let Some(duration) = patch.duration {
            check_duration(duration)?;
            record.duration = duration;
        }
        if let Some(date) = patch.date {
            record.date = date;
            record.recompute_week();
        }
        if let Some(location) = patch.location {
            record.location = location;
        }

        // The snapshot belongs to (location, date); refresh it whenever
        // either changed.
        if patch.needs_weather_refresh() {
            record.condition = self.fetch_condition(&record.location, record.date).await?;
        }

        record.updated_at = chrono::Utc::now();
        self.activities.update(&record).await?;
        Ok(record)
    }

    async fn get(&self, actor: &User, id: Uuid) -> AppResult<ActivityRecord> {
        self.find_owned(actor, id).await
    }

    async fn delete(&self, actor: &User, id: Uuid) -> AppResult<()> {
        // Ownership first; only then touch storage
        self.find_owned(actor, id).await?;
        self.activities.delete(id).await
    }

    async fn list(
        &self,
        actor: &User,
        filter: Option<&str>,
        params: &PageParams,
    ) -> AppResult<Vec<ActivityRecord>> {
        params.validate()?;

        let predicate: Option<FilterExpr> = match filter {
            Some(raw) => Some(filter::parse(raw)?),
            None => None,
        };

        self.activities
            .list_by_owner(actor.id, predicate, params.offset(), params.limit())
            .await
    }

    async fn weekly_report(&self, actor: &User, params: &PageParams) -> AppResult<WeeklyReport> {
        params.validate()?;

        let records = self.activities.list_all_by_owner(actor.id).await?;
        Ok(report::weekly_report(
            &records,
            params.offset(),
            params.limit(),
        ))
    }
}
