//! Weekly report aggregation.
//!
//! Pure post-processing of an owner's records (already ordered by date):
//! group by ISO week, compute per-week statistics, page the ordered groups,
//! and nest the survivors by year.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ActivityRecord;

/// Per-week summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WeekStats {
    /// Mean of per-record `duration / distance` ratios (seconds per meter).
    ///
    /// Deliberately NOT `total_duration / total_distance`; the two disagree
    /// whenever record distances differ, and the API has always reported the
    /// mean of ratios.
    pub avg_pace: f64,
    /// Sum of record distances in meters.
    pub total_distance: i64,
}

/// Report shape: year -> ordered list of single-week entries.
pub type WeeklyReport = BTreeMap<i32, Vec<BTreeMap<i32, WeekStats>>>;

/// Build the weekly report for one owner's records.
///
/// Groups are ordered chronologically (`(iso_year, iso_week)` order is
/// monotone in date since ISO weeks are contiguous ranges) and paged with
/// the same raw-offset `LIMIT/OFFSET` semantics as record listings.
pub fn weekly_report(records: &[ActivityRecord], offset: u64, limit: u64) -> WeeklyReport {
    let mut groups: BTreeMap<(i32, i32), (f64, u32, i64)> = BTreeMap::new();

    for record in records {
        let entry = groups
            .entry((record.iso_year, record.iso_week))
            .or_insert((0.0, 0, 0));
        entry.0 += record.pace();
        entry.1 += 1;
        entry.2 += i64::from(record.distance);
    }

    let mut report = WeeklyReport::new();
    for ((year, week), (pace_sum, count, total_distance)) in groups
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
    {
        let stats = WeekStats {
            avg_pace: pace_sum / f64::from(count),
            total_distance,
        };
        let mut week_entry = BTreeMap::new();
        week_entry.insert(week, stats);
        report.entry(year).or_default().push(week_entry);
    }

    report
}
