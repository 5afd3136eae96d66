//! Per-feature engagement figures.

use serde::Serialize;

use crate::types::{DailyMetricSnapshot, EditorUsage, FeatureKey};

/// Engagement with one feature on the latest day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureEngagement {
    pub key: FeatureKey,
    pub display_name: &'static str,
    pub engaged_users: u64,
    /// Per-editor breakdown when the upstream reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editors: Option<Vec<EditorUsage>>,
}

impl FeatureEngagement {
    /// Share of all engaged users that used this feature.
    pub fn rate(&self, total_engaged_users: u64) -> u32 {
        engagement_rate(self.engaged_users, total_engaged_users)
    }
}

/// Every known feature in display order, 0 for features the snapshot lacks.
///
/// With no snapshot at all every feature reads 0, so the list is always
/// complete and stably ordered.
pub fn feature_engagement_summary(latest: Option<&DailyMetricSnapshot>) -> Vec<FeatureEngagement> {
    FeatureKey::ALL
        .iter()
        .map(|&key| FeatureEngagement {
            key,
            display_name: key.display_name(),
            engaged_users: latest.map(|s| s.feature_users(key)).unwrap_or(0),
            editors: latest
                .and_then(|s| s.feature_editors(key))
                .map(|editors| editors.to_vec()),
        })
        .collect()
}

/// Rounded percentage of engaged users using a feature.
///
/// The denominator is floored at 1 so a day with no engaged users reads 0%
/// instead of dividing by zero.
pub fn engagement_rate(feature_users: u64, total_engaged_users: u64) -> u32 {
    let denominator = total_engaged_users.max(1);
    (feature_users as f64 / denominator as f64 * 100.0).round() as u32
}
