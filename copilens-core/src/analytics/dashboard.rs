//! Dashboard view-models.
//!
//! [`DashboardView`] pairs the loaded snapshots with the reference time and
//! window sizes, and derives every figure the cards, charts and drill-down
//! panels show. Nothing here is cached; each call recomputes from the
//! immutable [`DashboardData`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::adoption::{adoption_status, AdoptionLevel, AdoptionStatus};
use super::distribution::{
    activity_distribution, editor_distribution, team_distribution, DistributionEntry,
};
use super::features::{engagement_rate, feature_engagement_summary, FeatureEngagement};
use super::recency::{activity_recency, ActivityRecency};
use super::window::{
    active_series, average_active_users, feature_series, find_snapshot, latest,
    peak_active_users, recent_window, trend_series, SeriesPoint, TrendPoint,
};
use crate::config::DashboardConfig;
use crate::format::format_relative_time_opt;
use crate::types::{DashboardData, EditorUsage, FeatureKey, Seat};

/// Figures for the four summary cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_seats: u64,
    pub assigned_seats: u64,
    pub unassigned_seats: u64,
    /// Active users on the latest day
    pub active_users: u64,
    /// Engaged users on the latest day
    pub engaged_users: u64,
    pub adoption: AdoptionStatus,
    /// Date the card figures come from, `None` with no metrics
    pub as_of: Option<NaiveDate>,
}

/// One row of the seat roster table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    pub user_id: u64,
    pub login: String,
    pub avatar_url: String,
    pub initials: String,
    pub recency: ActivityRecency,
    pub editor: String,
    pub team: String,
}

impl RosterRow {
    pub fn from_seat(seat: &Seat, now: DateTime<Utc>) -> Self {
        Self {
            user_id: seat.user_id(),
            login: seat.assignee.login.clone(),
            avatar_url: seat.assignee.avatar_url.clone(),
            initials: seat.initials(),
            recency: activity_recency(seat.last_activity_at, now),
            editor: seat.editor_label(),
            team: seat.team_label().to_string(),
        }
    }
}

/// Seat allocation breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatsOverview {
    pub total_seats: u64,
    pub assigned_seats: u64,
    pub unassigned_seats: u64,
    pub by_team: Vec<DistributionEntry>,
    pub by_editor: Vec<DistributionEntry>,
    pub by_activity: Vec<DistributionEntry>,
}

/// Active-user analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveUsersDetail {
    /// Mean active users over the average window
    pub average_active: u64,
    /// Snapshots the average was taken over
    pub average_days: usize,
    /// Highest active count across the whole series
    pub peak_active: u64,
    pub series: Vec<SeriesPoint>,
    pub by_editor: Vec<DistributionEntry>,
}

/// Feature engagement breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngagedUsersDetail {
    pub engaged_users: u64,
    pub features: Vec<FeatureEngagement>,
    /// Per-feature counts over the trend window
    pub trend: Vec<TrendPoint>,
}

/// One adoption band with a marker for the current one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdoptionBand {
    pub level: AdoptionLevel,
    pub range: &'static str,
    pub current: bool,
}

/// Adoption rate explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdoptionDetail {
    pub status: AdoptionStatus,
    pub active_users: u64,
    pub total_seats: u64,
    pub bands: Vec<AdoptionBand>,
}

/// Breakdown of a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBreakdown {
    pub active_users: u64,
    pub engaged_users: u64,
    pub features: Vec<FeatureEngagement>,
    /// Code completion users per editor, empty when not reported
    pub completion_editors: Vec<EditorUsage>,
}

/// Detail for a selected trend point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendDetail {
    pub date: NaiveDate,
    /// `None` when the date is not in the series
    pub day: Option<DayBreakdown>,
}

/// Detail for a selected feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureDetail {
    pub key: FeatureKey,
    pub display_name: &'static str,
    pub engaged_users: u64,
    /// Share of the latest day's engaged users
    pub rate: u32,
    pub series: Vec<SeriesPoint>,
    pub editors: Vec<EditorUsage>,
}

/// Detail for a selected seat holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDetail {
    pub row: RosterRow,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: Option<DateTime<Utc>>,
    /// Raw editor string as reported upstream
    pub last_activity_editor: Option<String>,
    /// Relative last-activity text, measured from the view's `now`
    pub last_active: String,
}

/// Derives view-models from one loaded session.
#[derive(Debug, Clone, Copy)]
pub struct DashboardView<'a> {
    pub data: &'a DashboardData,
    pub now: DateTime<Utc>,
    pub windows: DashboardConfig,
}

impl<'a> DashboardView<'a> {
    pub fn new(data: &'a DashboardData, now: DateTime<Utc>, windows: DashboardConfig) -> Self {
        Self { data, now, windows }
    }

    /// Card figures from the latest snapshot and current roster.
    pub fn summary(&self) -> DashboardSummary {
        let latest = latest(&self.data.metrics);
        let active_users = latest.map(|s| s.total_active_users).unwrap_or(0);
        let roster = &self.data.roster;

        DashboardSummary {
            total_seats: roster.total_seats,
            assigned_seats: roster.assigned(),
            unassigned_seats: roster.unassigned(),
            active_users,
            engaged_users: latest.map(|s| s.total_engaged_users).unwrap_or(0),
            adoption: adoption_status(active_users, roster.total_seats),
            as_of: latest.map(|s| s.date),
        }
    }

    /// Points for the overview trend chart.
    pub fn trend(&self) -> Vec<TrendPoint> {
        trend_series(recent_window(&self.data.metrics, self.windows.trend_window))
    }

    /// Latest-day feature list.
    pub fn features(&self) -> Vec<FeatureEngagement> {
        feature_engagement_summary(latest(&self.data.metrics))
    }

    /// One row per assigned seat, in roster order.
    pub fn roster_rows(&self) -> Vec<RosterRow> {
        self.data
            .roster
            .seats
            .iter()
            .map(|seat| RosterRow::from_seat(seat, self.now))
            .collect()
    }

    pub fn seats_overview(&self) -> SeatsOverview {
        let roster = &self.data.roster;
        SeatsOverview {
            total_seats: roster.total_seats,
            assigned_seats: roster.assigned(),
            unassigned_seats: roster.unassigned(),
            by_team: team_distribution(&roster.seats),
            by_editor: editor_distribution(&roster.seats),
            by_activity: activity_distribution(&roster.seats, self.now),
        }
    }

    pub fn active_users_detail(&self) -> ActiveUsersDetail {
        let metrics = &self.data.metrics;
        let average_window = recent_window(metrics, self.windows.average_window);
        ActiveUsersDetail {
            average_active: average_active_users(average_window),
            average_days: average_window.len(),
            peak_active: peak_active_users(metrics),
            series: active_series(recent_window(metrics, self.windows.trend_window)),
            by_editor: editor_distribution(&self.data.roster.seats),
        }
    }

    pub fn engaged_users_detail(&self) -> EngagedUsersDetail {
        EngagedUsersDetail {
            engaged_users: self.summary().engaged_users,
            features: self.features(),
            trend: self.trend(),
        }
    }

    pub fn adoption_detail(&self) -> AdoptionDetail {
        let summary = self.summary();
        AdoptionDetail {
            status: summary.adoption,
            active_users: summary.active_users,
            total_seats: summary.total_seats,
            bands: AdoptionLevel::ALL
                .iter()
                .map(|&level| AdoptionBand {
                    level,
                    range: level.range_label(),
                    current: level == summary.adoption.level,
                })
                .collect(),
        }
    }

    /// Day breakdown for a date; an unknown date yields an empty detail.
    pub fn trend_detail(&self, date: NaiveDate) -> TrendDetail {
        let day = find_snapshot(&self.data.metrics, date).map(|snapshot| DayBreakdown {
            active_users: snapshot.total_active_users,
            engaged_users: snapshot.total_engaged_users,
            features: feature_engagement_summary(Some(snapshot)),
            completion_editors: snapshot
                .feature_editors(FeatureKey::CodeCompletions)
                .map(|e| e.to_vec())
                .unwrap_or_default(),
        });
        TrendDetail { date, day }
    }

    pub fn feature_detail(&self, key: FeatureKey) -> FeatureDetail {
        let latest = latest(&self.data.metrics);
        let engaged_users = latest.map(|s| s.feature_users(key)).unwrap_or(0);
        let total_engaged = latest.map(|s| s.total_engaged_users).unwrap_or(0);

        FeatureDetail {
            key,
            display_name: key.display_name(),
            engaged_users,
            rate: engagement_rate(engaged_users, total_engaged),
            series: feature_series(
                recent_window(&self.data.metrics, self.windows.trend_window),
                key,
            ),
            editors: latest
                .and_then(|s| s.feature_editors(key))
                .map(|e| e.to_vec())
                .unwrap_or_default(),
        }
    }

    /// Seat facts for a user id; `None` when the id is not on the roster.
    pub fn user_detail(&self, user_id: u64) -> Option<UserDetail> {
        self.data.roster.find_user(user_id).map(|seat| UserDetail {
            row: RosterRow::from_seat(seat, self.now),
            created_at: seat.created_at,
            last_activity_at: seat.last_activity_at,
            last_activity_editor: seat.last_activity_editor.clone(),
            last_active: format_relative_time_opt(seat.last_activity_at, self.now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::recency::RecencyClass;
    use crate::types::{Assignee, DailyMetricSnapshot, FeatureUsage, SeatRoster};
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 30, 9, 0, 0).unwrap()
    }

    fn data(days: u32) -> DashboardData {
        let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let metrics = (0..days)
            .map(|i| {
                let mut features = BTreeMap::new();
                features.insert(
                    FeatureKey::CodeCompletions,
                    FeatureUsage {
                        total_engaged_users: 50 + i as u64,
                        editors: Some(vec![EditorUsage {
                            name: "vscode".to_string(),
                            total_engaged_users: 50 + i as u64,
                        }]),
                    },
                );
                DailyMetricSnapshot {
                    date: start + Duration::days(i as i64),
                    total_active_users: 100 + i as u64,
                    total_engaged_users: 80 + i as u64,
                    features,
                }
            })
            .collect();

        let seats = (0..4)
            .map(|i| Seat {
                assignee: Assignee {
                    login: format!("dev{}", i),
                    id: 10 + i,
                    avatar_url: String::new(),
                },
                created_at: now() - Duration::days(90),
                last_activity_at: Some(now() - Duration::days(i as i64 * 5)),
                last_activity_editor: Some("vscode".to_string()),
                assigning_team: None,
            })
            .collect();

        DashboardData {
            metrics,
            roster: SeatRoster {
                total_seats: 200,
                seats,
            },
        }
    }

    #[test]
    fn test_summary_uses_latest_day() {
        let data = data(28);
        let view = DashboardView::new(&data, now(), DashboardConfig::default());
        let summary = view.summary();

        assert_eq!(summary.active_users, 127);
        assert_eq!(summary.engaged_users, 107);
        assert_eq!(summary.adoption.ratio, 64);
        assert_eq!(summary.adoption.level, AdoptionLevel::Moderate);
        assert_eq!(summary.assigned_seats, 4);
        assert_eq!(summary.unassigned_seats, 196);
        assert_eq!(summary.as_of, NaiveDate::from_ymd_opt(2025, 4, 28));
    }

    #[test]
    fn test_empty_data_is_zero_state() {
        let data = DashboardData {
            metrics: Vec::new(),
            roster: SeatRoster::default(),
        };
        let view = DashboardView::new(&data, now(), DashboardConfig::default());

        let summary = view.summary();
        assert_eq!(summary.active_users, 0);
        assert_eq!(summary.adoption.ratio, 0);
        assert!(summary.as_of.is_none());
        assert!(view.trend().is_empty());
        assert_eq!(view.features().len(), 4);
        assert!(view.roster_rows().is_empty());

        let active = view.active_users_detail();
        assert_eq!(active.average_active, 0);
        assert_eq!(active.peak_active, 0);

        let feature = view.feature_detail(FeatureKey::IdeChat);
        assert_eq!(feature.engaged_users, 0);
        assert_eq!(feature.rate, 0);
        assert!(feature.series.is_empty());
    }

    #[test]
    fn test_active_users_detail_windows() {
        let data = data(28);
        let view = DashboardView::new(&data, now(), DashboardConfig::default());
        let detail = view.active_users_detail();

        // Last 7 days: 121..=127
        assert_eq!(detail.average_active, 124);
        assert_eq!(detail.average_days, 7);
        assert_eq!(detail.peak_active, 127);
        assert_eq!(detail.series.len(), 14);
        assert_eq!(detail.series.last().unwrap().value, 127);
    }

    #[test]
    fn test_short_history_averages_available_days() {
        let data = data(3);
        let view = DashboardView::new(&data, now(), DashboardConfig::default());
        let detail = view.active_users_detail();
        assert_eq!(detail.average_days, 3);
        assert_eq!(detail.average_active, 101);
    }

    #[test]
    fn test_adoption_detail_marks_current_band() {
        let data = data(28);
        let view = DashboardView::new(&data, now(), DashboardConfig::default());
        let detail = view.adoption_detail();
        let current: Vec<_> = detail.bands.iter().filter(|b| b.current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].level, AdoptionLevel::Moderate);
        assert_eq!(current[0].range, "40-69%");
    }

    #[test]
    fn test_trend_detail_found_and_missing() {
        let data = data(28);
        let view = DashboardView::new(&data, now(), DashboardConfig::default());

        let found = view.trend_detail(NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());
        let day = found.day.unwrap();
        assert_eq!(day.active_users, 101);
        assert_eq!(day.features.len(), 4);
        assert_eq!(day.completion_editors.len(), 1);

        let missing = view.trend_detail(NaiveDate::from_ymd_opt(2099, 1, 1).unwrap());
        assert!(missing.day.is_none());
    }

    #[test]
    fn test_feature_detail() {
        let data = data(28);
        let view = DashboardView::new(&data, now(), DashboardConfig::default());
        let detail = view.feature_detail(FeatureKey::CodeCompletions);

        assert_eq!(detail.engaged_users, 77);
        assert_eq!(detail.rate, 72); // 77 / 107
        assert_eq!(detail.series.len(), 14);
        assert_eq!(detail.editors.len(), 1);

        let missing = view.feature_detail(FeatureKey::DotcomChat);
        assert_eq!(missing.engaged_users, 0);
        assert!(missing.series.iter().all(|p| p.value == 0));
        assert!(missing.editors.is_empty());
    }

    #[test]
    fn test_roster_rows_and_user_detail() {
        let data = data(1);
        let view = DashboardView::new(&data, now(), DashboardConfig::default());

        let rows = view.roster_rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].recency.class, RecencyClass::Today);
        assert_eq!(rows[1].recency.class, RecencyClass::Recent);
        assert_eq!(rows[2].recency.class, RecencyClass::Stale);
        assert_eq!(rows[0].team, "Unassigned");
        assert_eq!(rows[0].editor, "Vscode");
        assert_eq!(rows[0].initials, "DE");

        let user = view.user_detail(12).unwrap();
        assert_eq!(user.row.login, "dev2");
        assert_eq!(user.last_activity_editor.as_deref(), Some("vscode"));
        assert_eq!(user.last_active, "Apr 20");
        assert!(view.user_detail(999).is_none());
    }

    #[test]
    fn test_seats_overview_sums() {
        let data = data(1);
        let view = DashboardView::new(&data, now(), DashboardConfig::default());
        let overview = view.seats_overview();
        assert_eq!(overview.by_team.len(), 1);
        assert_eq!(overview.by_team[0].count, 4);
        assert_eq!(overview.by_activity.iter().map(|e| e.count).sum::<u64>(), 4);
    }

    #[test]
    fn test_user_detail_times_follow_view_clock() {
        let data = data(1);
        let later = DashboardView::new(&data, now() + Duration::days(2), DashboardConfig::default());

        let user = later.user_detail(10).unwrap();
        assert_eq!(user.row.recency.class, RecencyClass::Recent);
        assert_eq!(user.last_active, "2d ago");
    }
}
