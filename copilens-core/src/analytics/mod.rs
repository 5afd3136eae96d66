//! Analytics module for copilens
//!
//! Pure functions that turn the two loaded snapshots into the figures the
//! dashboard shows:
//! - Adoption ratio and band
//! - Windows, trend series and averages over the daily series
//! - Activity recency per seat
//! - Seat distributions by team, editor and recency
//! - Per-feature engagement
//! - Card, roster and drill-down view-models
//!
//! Every function is total over well-formed input, including empty series
//! and empty rosters; "no data" always produces a zero or empty value.

pub mod adoption;
pub mod dashboard;
pub mod distribution;
pub mod features;
pub mod recency;
pub mod window;

pub use adoption::{adoption_status, AdoptionLevel, AdoptionStatus};
pub use dashboard::{
    ActiveUsersDetail, AdoptionBand, AdoptionDetail, DashboardSummary, DashboardView,
    DayBreakdown, EngagedUsersDetail, FeatureDetail, RosterRow, SeatsOverview, TrendDetail,
    UserDetail,
};
pub use distribution::{
    activity_distribution, editor_distribution, group_by, team_distribution, DistributionEntry,
};
pub use features::{engagement_rate, feature_engagement_summary, FeatureEngagement};
pub use recency::{activity_recency, ActivityRecency, RecencyBucket, RecencyClass};
pub use window::{
    average_active_users, find_snapshot, latest, peak_active_users, recent_window, trend_series,
    SeriesPoint, TrendPoint,
};
