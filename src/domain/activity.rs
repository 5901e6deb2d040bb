//! Activity-record domain entity and its value objects.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Build a location, enforcing the coordinate ranges.
    pub fn new(latitude: f64, longitude: f64) -> AppResult<Self> {
        if !((-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)) {
            return Err(AppError::validation(
                "invalid location (The latitude must be a number between -90 and 90 \
                 and the longitude between -180 and 180)",
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse the wire format `"LAT LONG"`.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let parts: Vec<&str> = raw.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(AppError::validation(
                "invalid location (should be 'LAT LONG')",
            ));
        }

        let latitude: f64 = parts[0].parse().map_err(|_| {
            AppError::validation("invalid location (lat & long should be floating-point)")
        })?;
        let longitude: f64 = parts[1].parse().map_err(|_| {
            AppError::validation("invalid location (lat & long should be floating-point)")
        })?;

        Self::new(latitude, longitude)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.latitude, self.longitude)
    }
}

/// Weather snapshot captured when a record is written.
///
/// The payload itself is opaque (whatever the forecast provider returned for
/// the day); this type only pins down the storage codec.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherCondition(serde_json::Value);

impl WeatherCondition {
    pub fn new(payload: serde_json::Value) -> Self {
        Self(payload)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

/// A single jogging result.
///
/// `iso_week`/`iso_year` are derived from `date` and stored redundantly for
/// the weekly report; every write path that changes `date` must call
/// [`ActivityRecord::recompute_week`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    /// Owning user; immutable after creation.
    pub owner_id: Uuid,
    pub date: NaiveDate,
    /// Distance in meters, always positive.
    pub distance: i32,
    /// Duration in seconds, always positive.
    pub duration: i32,
    pub location: Location,
    pub condition: WeatherCondition,
    pub iso_week: i32,
    pub iso_year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActivityRecord {
    /// Create a new record, deriving the ISO week fields from `date`.
    pub fn new(
        owner_id: Uuid,
        date: NaiveDate,
        distance: i32,
        duration: i32,
        location: Location,
        condition: WeatherCondition,
    ) -> Self {
        let (iso_year, iso_week) = iso_week_of(date);
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            date,
            distance,
            duration,
            location,
            condition,
            iso_week,
            iso_year,
            created_at: now,
            updated_at: now,
        }
    }

    /// Re-derive `iso_week`/`iso_year` after a date change.
    pub fn recompute_week(&mut self) {
        let (iso_year, iso_week) = iso_week_of(self.date);
        self.iso_year = iso_year;
        self.iso_week = iso_week;
    }

    /// Pace of this record: seconds per meter.
    pub fn pace(&self) -> f64 {
        f64::from(self.duration) / f64::from(self.distance)
    }
}

/// ISO-8601 week-numbering year and week of a date.
pub fn iso_week_of(date: NaiveDate) -> (i32, i32) {
    let week = date.iso_week();
    (week.year(), week.week() as i32)
}

/// Input for creating a record.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub date: NaiveDate,
    pub distance: i32,
    pub duration: i32,
    pub location: Location,
}

/// Partial update of a record's non-key fields.
#[derive(Debug, Clone, Default)]
pub struct ActivityPatch {
    pub date: Option<NaiveDate>,
    pub distance: Option<i32>,
    pub duration: Option<i32>,
    pub location: Option<Location>,
}

impl ActivityPatch {
    /// Whether applying this patch requires a fresh weather snapshot.
    pub fn needs_weather_refresh(&self) -> bool {
        self.date.is_some() || self.location.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_location() {
        let loc = Location::parse("32.0853 34.7818").unwrap();
        assert_eq!(loc.latitude, 32.0853);
        assert_eq!(loc.longitude, 34.7818);
        assert_eq!(loc.to_string(), "32.0853 34.7818");
    }

    #[test]
    fn rejects_malformed_location() {
        assert!(Location::parse("32.0853").is_err());
        assert!(Location::parse("one two").is_err());
        assert!(Location::parse("32.0853 34.7818 7").is_err());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(Location::parse("91.0 0.0").is_err());
        assert!(Location::parse("-91.0 0.0").is_err());
        assert!(Location::parse("0.0 180.5").is_err());
        assert!(Location::parse("90.0 -180.0").is_ok());
    }

    #[test]
    fn derives_iso_week() {
        let date = NaiveDate::from_ymd_opt(2015, 6, 20).unwrap();
        assert_eq!(iso_week_of(date), (2015, 25));
    }

    #[test]
    fn iso_week_crosses_year_boundary() {
        // Jan 1st 2016 still belongs to ISO week 53 of 2015
        let date = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
        assert_eq!(iso_week_of(date), (2015, 53));
    }

    #[test]
    fn recompute_follows_date_change() {
        let owner = Uuid::new_v4();
        let mut record = ActivityRecord::new(
            owner,
            NaiveDate::from_ymd_opt(2015, 6, 20).unwrap(),
            2000,
            405,
            Location::new(32.0853, 34.7818).unwrap(),
            WeatherCondition::default(),
        );
        assert_eq!((record.iso_year, record.iso_week), (2015, 25));

        record.date = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
        record.recompute_week();
        assert_eq!((record.iso_year, record.iso_week), (2015, 53));
    }

    #[test]
    fn pace_is_duration_over_distance() {
        let record = ActivityRecord::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2015, 6, 20).unwrap(),
            2000,
            405,
            Location::new(0.0, 0.0).unwrap(),
            WeatherCondition::default(),
        );
        assert!((record.pace() - 0.2025).abs() < f64::EPSILON);
    }
}
