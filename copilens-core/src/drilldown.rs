//! Drill-down navigation state.
//!
//! Exactly one detail view is open at a time, or none. Selection parameters
//! (date, feature, user) live inside the variant that needs them, so a
//! closed or different view can never carry a stale selection.
//!
//! Navigation is flat: opening a view while another is open replaces it,
//! and dismissing always returns to [`DrillDown::Closed`].

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{
    ActiveUsersDetail, AdoptionDetail, DashboardView, EngagedUsersDetail, FeatureDetail,
    SeatsOverview, TrendDetail, UserDetail,
};
use crate::format::format_long_date;
use crate::types::FeatureKey;

/// The four summary cards on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryCard {
    Seats,
    ActiveUsers,
    EngagedUsers,
    Adoption,
}

impl SummaryCard {
    pub const ALL: [SummaryCard; 4] = [
        SummaryCard::Seats,
        SummaryCard::ActiveUsers,
        SummaryCard::EngagedUsers,
        SummaryCard::Adoption,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SummaryCard::Seats => "Total Seats",
            SummaryCard::ActiveUsers => "Active Users",
            SummaryCard::EngagedUsers => "Engaged Users",
            SummaryCard::Adoption => "Adoption Rate",
        }
    }

    /// Drill-down opened by activating this card.
    pub fn target(&self) -> DrillDown {
        match self {
            SummaryCard::Seats => DrillDown::SeatsOverview,
            SummaryCard::ActiveUsers => DrillDown::ActiveUsersDetail,
            SummaryCard::EngagedUsers => DrillDown::EngagedUsersDetail,
            SummaryCard::Adoption => DrillDown::AdoptionDetail,
        }
    }
}

/// User actions that move the drill-down state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillDownEvent {
    CardActivated(SummaryCard),
    TrendPointSelected(NaiveDate),
    FeatureSelected(FeatureKey),
    SeatSelected(u64),
    Dismissed,
}

/// Which detail view is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DrillDown {
    #[default]
    Closed,
    SeatsOverview,
    ActiveUsersDetail,
    EngagedUsersDetail,
    AdoptionDetail,
    TrendDetail { date: NaiveDate },
    FeatureDetail { key: FeatureKey },
    UserDetail { user_id: u64 },
}

impl DrillDown {
    pub fn is_open(&self) -> bool {
        !matches!(self, DrillDown::Closed)
    }

    /// Apply a user action.
    pub fn apply(&mut self, event: DrillDownEvent) {
        let next = match event {
            DrillDownEvent::CardActivated(card) => card.target(),
            DrillDownEvent::TrendPointSelected(date) => DrillDown::TrendDetail { date },
            DrillDownEvent::FeatureSelected(key) => DrillDown::FeatureDetail { key },
            DrillDownEvent::SeatSelected(user_id) => DrillDown::UserDetail { user_id },
            DrillDownEvent::Dismissed => DrillDown::Closed,
        };
        tracing::debug!(from = ?self, to = ?next, "Drill-down transition");
        *self = next;
    }

    pub fn activate_card(&mut self, card: SummaryCard) {
        self.apply(DrillDownEvent::CardActivated(card));
    }

    pub fn select_trend_point(&mut self, date: NaiveDate) {
        self.apply(DrillDownEvent::TrendPointSelected(date));
    }

    pub fn select_feature(&mut self, key: FeatureKey) {
        self.apply(DrillDownEvent::FeatureSelected(key));
    }

    pub fn select_seat(&mut self, user_id: u64) {
        self.apply(DrillDownEvent::SeatSelected(user_id));
    }

    pub fn dismiss(&mut self) {
        self.apply(DrillDownEvent::Dismissed);
    }

    /// Panel title for the open view.
    pub fn title(&self, view: &DashboardView<'_>) -> String {
        match self {
            DrillDown::Closed => String::new(),
            DrillDown::SeatsOverview => "Seat Distribution".to_string(),
            DrillDown::ActiveUsersDetail => "Active Users Analysis".to_string(),
            DrillDown::EngagedUsersDetail => "Feature Engagement Breakdown".to_string(),
            DrillDown::AdoptionDetail => "Adoption Rate Details".to_string(),
            DrillDown::TrendDetail { date } => {
                format!("Activity on {}", format_long_date(*date))
            }
            DrillDown::FeatureDetail { key } => key.display_name().to_string(),
            DrillDown::UserDetail { user_id } => view
                .data
                .roster
                .find_user(*user_id)
                .map(|seat| seat.assignee.login.clone())
                .unwrap_or_else(|| "Unknown user".to_string()),
        }
    }

    /// Build the view-model for the open view.
    pub fn resolve(&self, view: &DashboardView<'_>) -> DetailView {
        match *self {
            DrillDown::Closed => DetailView::Closed,
            DrillDown::SeatsOverview => DetailView::Seats(view.seats_overview()),
            DrillDown::ActiveUsersDetail => DetailView::ActiveUsers(view.active_users_detail()),
            DrillDown::EngagedUsersDetail => {
                DetailView::EngagedUsers(view.engaged_users_detail())
            }
            DrillDown::AdoptionDetail => DetailView::Adoption(view.adoption_detail()),
            DrillDown::TrendDetail { date } => DetailView::Trend(view.trend_detail(date)),
            DrillDown::FeatureDetail { key } => DetailView::Feature(view.feature_detail(key)),
            DrillDown::UserDetail { user_id } => DetailView::User {
                user_id,
                detail: view.user_detail(user_id),
            },
        }
    }
}

/// Resolved content of the open drill-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "detail", rename_all = "snake_case")]
pub enum DetailView {
    Closed,
    Seats(SeatsOverview),
    ActiveUsers(ActiveUsersDetail),
    EngagedUsers(EngagedUsersDetail),
    Adoption(AdoptionDetail),
    Trend(TrendDetail),
    Feature(FeatureDetail),
    /// `detail` is `None` when the id is not on the roster
    User {
        user_id: u64,
        detail: Option<UserDetail>,
    },
}

impl DetailView {
    /// True for detail views with nothing to show.
    pub fn is_empty(&self) -> bool {
        match self {
            DetailView::Closed => true,
            DetailView::Trend(trend) => trend.day.is_none(),
            DetailView::User { detail, .. } => detail.is_none(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::types::{Assignee, DashboardData, Seat, SeatRoster};
    use chrono::{TimeZone, Utc};

    fn data() -> DashboardData {
        DashboardData {
            metrics: Vec::new(),
            roster: SeatRoster {
                total_seats: 2,
                seats: vec![Seat {
                    assignee: Assignee {
                        login: "octocat".to_string(),
                        id: 1,
                        avatar_url: String::new(),
                    },
                    created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                    last_activity_at: None,
                    last_activity_editor: None,
                    assigning_team: None,
                }],
            },
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_starts_closed() {
        let state = DrillDown::default();
        assert_eq!(state, DrillDown::Closed);
        assert!(!state.is_open());
    }

    #[test]
    fn test_cards_open_their_views() {
        let expected = [
            DrillDown::SeatsOverview,
            DrillDown::ActiveUsersDetail,
            DrillDown::EngagedUsersDetail,
            DrillDown::AdoptionDetail,
        ];
        for (card, want) in SummaryCard::ALL.iter().zip(expected) {
            let mut state = DrillDown::Closed;
            state.activate_card(*card);
            assert_eq!(state, want);
            assert!(state.is_open());
        }
    }

    #[test]
    fn test_selection_replaces_open_view() {
        let mut state = DrillDown::Closed;
        state.activate_card(SummaryCard::EngagedUsers);
        state.select_feature(FeatureKey::IdeChat);
        assert_eq!(
            state,
            DrillDown::FeatureDetail {
                key: FeatureKey::IdeChat
            }
        );

        state.select_seat(7);
        assert_eq!(state, DrillDown::UserDetail { user_id: 7 });

        state.select_trend_point(date(2025, 1, 5));
        assert_eq!(
            state,
            DrillDown::TrendDetail {
                date: date(2025, 1, 5)
            }
        );
    }

    #[test]
    fn test_dismiss_clears_selection() {
        let mut state = DrillDown::Closed;
        state.select_seat(1);
        state.dismiss();
        assert_eq!(state, DrillDown::Closed);

        // Opening a card afterwards carries no user id
        state.activate_card(SummaryCard::Seats);
        assert_eq!(state, DrillDown::SeatsOverview);

        // Dismissing when closed stays closed
        let mut closed = DrillDown::Closed;
        closed.dismiss();
        assert_eq!(closed, DrillDown::Closed);
    }

    #[test]
    fn test_unknown_date_resolves_to_empty_trend() {
        let data = data();
        let view = DashboardView::new(&data, Utc::now(), DashboardConfig::default());
        let mut state = DrillDown::Closed;
        state.select_trend_point(date(2099, 1, 1));

        let detail = state.resolve(&view);
        match &detail {
            DetailView::Trend(trend) => {
                assert_eq!(trend.date, date(2099, 1, 1));
                assert!(trend.day.is_none());
            }
            other => panic!("unexpected view: {:?}", other),
        }
        assert!(detail.is_empty());
        assert_eq!(state.title(&view), "Activity on January 1, 2099");
    }

    #[test]
    fn test_user_resolution() {
        let data = data();
        let view = DashboardView::new(&data, Utc::now(), DashboardConfig::default());

        let mut state = DrillDown::Closed;
        state.select_seat(1);
        assert_eq!(state.title(&view), "octocat");
        assert!(!state.resolve(&view).is_empty());

        state.select_seat(42);
        assert_eq!(state.title(&view), "Unknown user");
        assert_eq!(
            state.resolve(&view),
            DetailView::User {
                user_id: 42,
                detail: None
            }
        );
    }

    #[test]
    fn test_titles() {
        let data = data();
        let view = DashboardView::new(&data, Utc::now(), DashboardConfig::default());
        assert_eq!(DrillDown::SeatsOverview.title(&view), "Seat Distribution");
        assert_eq!(
            DrillDown::FeatureDetail {
                key: FeatureKey::PullRequestSummaries
            }
            .title(&view),
            "PR Summaries"
        );
        assert_eq!(DrillDown::Closed.resolve(&view), DetailView::Closed);
    }
}
