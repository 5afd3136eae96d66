//! Windowing and series helpers over the daily snapshot sequence.
//!
//! Windows are taken by count, not by calendar span: the series may have
//! gaps, and the "last 14" are simply the last 14 entries.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{DailyMetricSnapshot, FeatureKey};

/// The most recent snapshot, or `None` for an empty series.
pub fn latest(snapshots: &[DailyMetricSnapshot]) -> Option<&DailyMetricSnapshot> {
    snapshots.last()
}

/// The last `n` entries in original order (all of them if fewer exist).
pub fn recent_window<T>(snapshots: &[T], n: usize) -> &[T] {
    &snapshots[snapshots.len().saturating_sub(n)..]
}

/// Look up the snapshot for a date.
pub fn find_snapshot(
    snapshots: &[DailyMetricSnapshot],
    date: NaiveDate,
) -> Option<&DailyMetricSnapshot> {
    snapshots
        .binary_search_by_key(&date, |s| s.date)
        .ok()
        .map(|idx| &snapshots[idx])
}

/// Short chart label for a date (e.g. "Mar 4").
pub fn short_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// One point of the overview trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub date: NaiveDate,
    pub active: u64,
    pub engaged: u64,
    /// Engaged users per feature, every known feature present
    pub features: BTreeMap<FeatureKey, u64>,
}

impl TrendPoint {
    pub fn feature(&self, key: FeatureKey) -> u64 {
        self.features.get(&key).copied().unwrap_or(0)
    }
}

/// One value per day for a single-metric chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub date: NaiveDate,
    pub value: u64,
}

/// Chart points for a window of snapshots.
pub fn trend_series(window: &[DailyMetricSnapshot]) -> Vec<TrendPoint> {
    window
        .iter()
        .map(|s| TrendPoint {
            label: short_label(s.date),
            date: s.date,
            active: s.total_active_users,
            engaged: s.total_engaged_users,
            features: FeatureKey::ALL
                .iter()
                .map(|&key| (key, s.feature_users(key)))
                .collect(),
        })
        .collect()
}

/// Active users per day.
pub fn active_series(window: &[DailyMetricSnapshot]) -> Vec<SeriesPoint> {
    series_of(window, |s| s.total_active_users)
}

/// Engaged users per day for one feature.
pub fn feature_series(window: &[DailyMetricSnapshot], key: FeatureKey) -> Vec<SeriesPoint> {
    series_of(window, |s| s.feature_users(key))
}

fn series_of<F>(window: &[DailyMetricSnapshot], value: F) -> Vec<SeriesPoint>
where
    F: Fn(&DailyMetricSnapshot) -> u64,
{
    window
        .iter()
        .map(|s| SeriesPoint {
            label: short_label(s.date),
            date: s.date,
            value: value(s),
        })
        .collect()
}

/// Rounded mean of active users over the window, 0 when empty.
pub fn average_active_users(window: &[DailyMetricSnapshot]) -> u64 {
    if window.is_empty() {
        return 0;
    }
    let total: u64 = window.iter().map(|s| s.total_active_users).sum();
    (total as f64 / window.len() as f64).round() as u64
}

/// Highest single-day active user count, 0 when empty.
pub fn peak_active_users(snapshots: &[DailyMetricSnapshot]) -> u64 {
    snapshots
        .iter()
        .map(|s| s.total_active_users)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeatureUsage;

    fn series(days: u32) -> Vec<DailyMetricSnapshot> {
        let start = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        (0..days)
            .map(|i| DailyMetricSnapshot {
                date: start + chrono::Duration::days(i as i64),
                total_active_users: (i + 1) as u64,
                total_engaged_users: i as u64,
                features: BTreeMap::new(),
            })
            .collect()
    }

    #[test]
    fn test_latest() {
        assert!(latest(&[]).is_none());
        let s = series(3);
        assert_eq!(latest(&s).unwrap().total_active_users, 3);
    }

    #[test]
    fn test_recent_window_lengths() {
        let s = series(28);
        for n in [0, 1, 7, 14, 28, 60] {
            let window = recent_window(&s, n);
            assert_eq!(window.len(), n.min(s.len()));
            // Always the chronologically latest entries, in order
            assert_eq!(window, &s[s.len() - window.len()..]);
        }
        assert!(recent_window::<DailyMetricSnapshot>(&[], 14).is_empty());
    }

    #[test]
    fn test_find_snapshot_with_gaps() {
        let mut s = series(5);
        s.remove(2);
        let present = s[2].date;
        let missing = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        assert_eq!(find_snapshot(&s, present).unwrap().date, present);
        assert!(find_snapshot(&s, missing).is_none());
        assert!(find_snapshot(&s, NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()).is_none());
    }

    #[test]
    fn test_trend_series_fills_missing_features() {
        let mut s = series(1);
        s[0].features.insert(
            FeatureKey::IdeChat,
            FeatureUsage {
                total_engaged_users: 4,
                editors: None,
            },
        );
        let points = trend_series(&s);
        assert_eq!(points[0].label, "Feb 1");
        assert_eq!(points[0].features.len(), 4);
        assert_eq!(points[0].feature(FeatureKey::IdeChat), 4);
        assert_eq!(points[0].feature(FeatureKey::DotcomChat), 0);
    }

    #[test]
    fn test_average_and_peak() {
        let s = series(7); // active 1..=7
        assert_eq!(average_active_users(&s), 4);
        assert_eq!(peak_active_users(&s), 7);
        assert_eq!(average_active_users(&s[..2]), 2); // 1.5 rounds up
        assert_eq!(average_active_users(&[]), 0);
        assert_eq!(peak_active_users(&[]), 0);
    }
}
