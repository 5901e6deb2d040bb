//! Weather connector.
//!
//! External lookup of the daily weather block for a coordinate/date pair,
//! captured as a snapshot on every record write. The provider is behind a
//! trait so services never see HTTP.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::{WeatherConfig, WEATHER_TIMEOUT_SECONDS};
use crate::domain::{Location, WeatherCondition};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Daily-forecast lookup.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch the day's condition block for a location.
    ///
    /// `Ok(None)` means the provider answered but had no data for that
    /// location/date; the caller decides how to surface that.
    async fn daily_condition(
        &self,
        location: &Location,
        date: NaiveDate,
    ) -> AppResult<Option<WeatherCondition>>;
}

/// Dark Sky-style forecast API client.
pub struct DarkSkyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DarkSkyClient {
    /// Build a client with a bounded request timeout.
    pub fn new(config: WeatherConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(WEATHER_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| AppError::internal(format!("weather client init failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
        })
    }
}

#[async_trait]
impl WeatherProvider for DarkSkyClient {
    async fn daily_condition(
        &self,
        location: &Location,
        date: NaiveDate,
    ) -> AppResult<Option<WeatherCondition>> {
        // Time-machine request pinned to midnight of the record's date
        let url = format!(
            "{}/{}/{},{},{}T00:00:00",
            self.base_url, self.api_key, location.latitude, location.longitude, date
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("weather lookup failed: {}", e)))?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "weather provider returned an error");
            return Ok(None);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::internal(format!("weather response malformed: {}", e)))?;

        Ok(body.get("daily").cloned().map(WeatherCondition::new))
    }
}
