//! Core domain types for copilens
//!
//! These types mirror the two upstream payloads the dashboard is built from:
//! a time series of daily usage snapshots and a point-in-time seat roster.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Seat** | One assigned license entitling a user to the assistant |
//! | **Active user** | A user the upstream counted as active on a given day |
//! | **Engaged user** | A user who used at least one assistant feature that day |
//! | **Feature** | A surface of the assistant (completions, IDE chat, ...) |
//! | **Roster** | The full set of assigned seats plus purchased capacity |
//!
//! Both snapshots are loaded once and never mutated; everything shown on
//! screen is derived from them by the [`crate::analytics`] functions.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Features
// ============================================

/// A known assistant feature.
///
/// Variant order is the fixed display order used everywhere a feature list
/// is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    /// Inline code completions in the IDE
    CodeCompletions,
    /// Chat inside the IDE
    IdeChat,
    /// Pull request summaries on github.com
    PullRequestSummaries,
    /// Chat on github.com
    DotcomChat,
}

impl FeatureKey {
    /// All known features in display order.
    pub const ALL: [FeatureKey; 4] = [
        FeatureKey::CodeCompletions,
        FeatureKey::IdeChat,
        FeatureKey::PullRequestSummaries,
        FeatureKey::DotcomChat,
    ];

    /// Returns the human-readable name for this feature.
    pub fn display_name(&self) -> &'static str {
        match self {
            FeatureKey::CodeCompletions => "Code Completions",
            FeatureKey::IdeChat => "IDE Chat",
            FeatureKey::PullRequestSummaries => "PR Summaries",
            FeatureKey::DotcomChat => "GitHub Chat",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKey::CodeCompletions => "code_completions",
            FeatureKey::IdeChat => "ide_chat",
            FeatureKey::PullRequestSummaries => "pull_request_summaries",
            FeatureKey::DotcomChat => "dotcom_chat",
        }
    }
}

impl std::fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for FeatureKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code_completions" | "completions" => Ok(FeatureKey::CodeCompletions),
            "ide_chat" => Ok(FeatureKey::IdeChat),
            "pull_request_summaries" | "pr_summaries" => Ok(FeatureKey::PullRequestSummaries),
            "dotcom_chat" => Ok(FeatureKey::DotcomChat),
            _ => Err(format!("unknown feature: {}", s)),
        }
    }
}

/// Engaged users for one editor within a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorUsage {
    /// Editor name as reported upstream (e.g. "vscode")
    pub name: String,
    /// Users engaged with the feature through this editor
    #[serde(default)]
    pub total_engaged_users: u64,
}

/// Usage of a single feature on a single day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureUsage {
    /// Users engaged with this feature
    pub total_engaged_users: u64,
    /// Per-editor breakdown, in upstream order, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editors: Option<Vec<EditorUsage>>,
}

// ============================================
// Metrics
// ============================================

/// One calendar day's aggregate usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMetricSnapshot {
    /// Calendar day (unique and ascending within a sequence)
    pub date: NaiveDate,
    /// Users counted as active that day
    pub total_active_users: u64,
    /// Users engaged with at least one feature that day
    pub total_engaged_users: u64,
    /// Per-feature usage; a missing entry means zero engagement
    #[serde(default)]
    pub features: BTreeMap<FeatureKey, FeatureUsage>,
}

impl DailyMetricSnapshot {
    /// Engaged users for a feature, 0 when the feature is absent.
    pub fn feature_users(&self, key: FeatureKey) -> u64 {
        self.features
            .get(&key)
            .map(|f| f.total_engaged_users)
            .unwrap_or(0)
    }

    /// Editor breakdown for a feature, if the upstream reported one.
    pub fn feature_editors(&self, key: FeatureKey) -> Option<&[EditorUsage]> {
        self.features
            .get(&key)
            .and_then(|f| f.editors.as_deref())
    }
}

// ============================================
// Seats
// ============================================

/// The user holding a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    /// Display key
    pub login: String,
    /// Stable identity key across views
    pub id: u64,
    /// Avatar image reference
    #[serde(default)]
    pub avatar_url: String,
}

/// The team through which a seat was assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssigningTeam {
    pub name: String,
}

/// One assigned license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub assignee: Assignee,
    /// When the seat was assigned
    pub created_at: DateTime<Utc>,
    /// Most recent activity; `None` means never active
    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,
    /// Editor of the most recent activity; `None` means unknown
    #[serde(default)]
    pub last_activity_editor: Option<String>,
    /// `None` means the seat was assigned directly, not via a team
    #[serde(default)]
    pub assigning_team: Option<AssigningTeam>,
}

impl Seat {
    /// Stable identity of the seat holder.
    pub fn user_id(&self) -> u64 {
        self.assignee.id
    }

    /// Team label used for grouping ("Unassigned" when no team).
    pub fn team_label(&self) -> &str {
        match self.assigning_team.as_ref().map(|t| t.name.trim()) {
            Some(name) if !name.is_empty() => name,
            _ => UNASSIGNED_TEAM,
        }
    }

    /// Editor family label used for grouping ("Unknown" when absent).
    ///
    /// GitHub reports editors as `vscode/1.88.0/copilot/1.180.0`; only the
    /// family before the first `/` is kept, with its first letter upper-cased.
    pub fn editor_label(&self) -> String {
        match self.last_activity_editor.as_deref() {
            Some(editor) => {
                let family = editor.split('/').next().unwrap_or(editor).trim();
                if family.is_empty() {
                    UNKNOWN_EDITOR.to_string()
                } else {
                    capitalize(family)
                }
            }
            None => UNKNOWN_EDITOR.to_string(),
        }
    }

    /// Two-letter avatar fallback (e.g. "OC" for "octocat").
    pub fn initials(&self) -> String {
        self.assignee
            .login
            .chars()
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Team bucket for seats without an assigning team.
pub const UNASSIGNED_TEAM: &str = "Unassigned";

/// Editor bucket for seats without a recorded editor.
pub const UNKNOWN_EDITOR: &str = "Unknown";

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Point-in-time snapshot of seat allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRoster {
    /// Purchased/licensed capacity
    pub total_seats: u64,
    /// Assigned seats
    #[serde(default)]
    pub seats: Vec<Seat>,
}

impl SeatRoster {
    /// Number of assigned seats.
    pub fn assigned(&self) -> u64 {
        self.seats.len() as u64
    }

    /// Seats purchased but not assigned to anyone.
    pub fn unassigned(&self) -> u64 {
        self.total_seats.saturating_sub(self.assigned())
    }

    /// Find a seat by its holder's id.
    pub fn find_user(&self, user_id: u64) -> Option<&Seat> {
        self.seats.iter().find(|s| s.assignee.id == user_id)
    }
}

// ============================================
// Loaded session data
// ============================================

/// The two immutable snapshots a dashboard session is built from.
///
/// Only constructed once both fetches have succeeded, so a value of this
/// type is never partially populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardData {
    /// Daily snapshots, ascending by date
    pub metrics: Vec<DailyMetricSnapshot>,
    /// Seat roster at load time
    pub roster: SeatRoster,
}
