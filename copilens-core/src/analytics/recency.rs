//! Activity recency classification for seats.

use chrono::{DateTime, Utc};
use serde::Serialize;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Badge classification for a seat's last activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecencyClass {
    /// Active within the last day
    Today,
    /// Active within the last week
    Recent,
    /// Last active more than a week ago
    Stale,
    /// No recorded activity
    Never,
}

/// Fixed buckets of the activity distribution, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecencyBucket {
    Today,
    ThisWeek,
    Older,
    Never,
}

impl RecencyBucket {
    pub const ALL: [RecencyBucket; 4] = [
        RecencyBucket::Today,
        RecencyBucket::ThisWeek,
        RecencyBucket::Older,
        RecencyBucket::Never,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RecencyBucket::Today => "Today",
            RecencyBucket::ThisWeek => "This Week",
            RecencyBucket::Older => "Older",
            RecencyBucket::Never => "Never",
        }
    }
}

/// How long ago a seat was last active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityRecency {
    /// Whole days since last activity (floored); `None` if never active
    pub days: Option<i64>,
    pub class: RecencyClass,
}

impl ActivityRecency {
    /// Badge text: "Never", "Today", or "{days}d ago".
    pub fn label(&self) -> String {
        match (self.class, self.days) {
            (RecencyClass::Never, _) | (_, None) => "Never".to_string(),
            (RecencyClass::Today, _) => "Today".to_string(),
            (_, Some(days)) => format!("{}d ago", days),
        }
    }

    /// Distribution bucket for this classification.
    pub fn bucket(&self) -> RecencyBucket {
        match self.class {
            RecencyClass::Today => RecencyBucket::Today,
            RecencyClass::Recent => RecencyBucket::ThisWeek,
            RecencyClass::Stale => RecencyBucket::Older,
            RecencyClass::Never => RecencyBucket::Never,
        }
    }
}

/// Classify a last-activity timestamp relative to `now`.
///
/// Days are floored, so a timestamp exactly 24h old is 1 day old and still
/// `Today`. Timestamps in the future count as `Today`.
pub fn activity_recency(last_activity_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ActivityRecency {
    let Some(ts) = last_activity_at else {
        return ActivityRecency {
            days: None,
            class: RecencyClass::Never,
        };
    };

    let days = (now - ts).num_seconds().div_euclid(SECONDS_PER_DAY);
    let class = if days <= 1 {
        RecencyClass::Today
    } else if days <= 7 {
        RecencyClass::Recent
    } else {
        RecencyClass::Stale
    };

    ActivityRecency {
        days: Some(days),
        class,
    }
}
