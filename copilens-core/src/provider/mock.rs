//! Seeded demo data for offline use.
//!
//! The same seed and anchor time always produce the same metrics and roster,
//! so demo fixtures are reproducible in tests.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::MockConfig;
use crate::error::ProviderError;
use crate::types::{
    Assignee, AssigningTeam, DailyMetricSnapshot, EditorUsage, FeatureKey, FeatureUsage, Seat,
    SeatRoster,
};

use super::MetricsProvider;

const TEAMS: [&str; 4] = ["platform", "frontend", "data", "mobile"];
const EDITORS: [&str; 3] = ["vscode", "jetbrains", "neovim"];
const LOGINS: [&str; 8] = [
    "octocat", "monalisa", "hubot", "mona", "codercat", "devops-dan", "ada", "linus",
];

/// Keeps the roster stream independent of the metrics stream.
const ROSTER_SEED_SALT: u64 = 0x5EA7_5EA7;

/// Provider that fabricates plausible usage data from a seed.
pub struct MockProvider {
    config: MockConfig,
    anchor: DateTime<Utc>,
}

impl MockProvider {
    /// Demo data ending today.
    pub fn new(config: MockConfig) -> Self {
        Self::with_anchor(config, Utc::now())
    }

    /// Demo data ending at `anchor`; recency is computed relative to it.
    pub fn with_anchor(config: MockConfig, anchor: DateTime<Utc>) -> Self {
        Self { config, anchor }
    }

    /// Generate the daily series, oldest first, ending on the anchor date.
    pub fn generate_metrics(&self) -> Vec<DailyMetricSnapshot> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let end = self.anchor.date_naive();
        let days = self.config.days;
        let seats = self.config.seat_count;

        (0..days)
            .map(|i| {
                let date = end - ChronoDuration::days((days - 1 - i) as i64);
                let weekend = matches!(
                    chrono::Datelike::weekday(&date),
                    chrono::Weekday::Sat | chrono::Weekday::Sun
                );
                let share = if weekend {
                    rng.gen_range(0.15..0.30)
                } else {
                    rng.gen_range(0.55..0.80)
                };
                let active = scale(seats, share);
                let engaged = scale(active, rng.gen_range(0.75..0.92));

                let mut features = BTreeMap::new();
                let completions = scale(engaged, rng.gen_range(0.85..0.97));
                features.insert(
                    FeatureKey::CodeCompletions,
                    FeatureUsage {
                        total_engaged_users: completions,
                        editors: Some(split_by_editor(&mut rng, completions)),
                    },
                );
                let ide_chat = scale(engaged, rng.gen_range(0.35..0.60));
                features.insert(
                    FeatureKey::IdeChat,
                    FeatureUsage {
                        total_engaged_users: ide_chat,
                        editors: Some(split_by_editor(&mut rng, ide_chat)),
                    },
                );
                features.insert(
                    FeatureKey::PullRequestSummaries,
                    FeatureUsage {
                        total_engaged_users: scale(engaged, rng.gen_range(0.08..0.20)),
                        editors: None,
                    },
                );
                features.insert(
                    FeatureKey::DotcomChat,
                    FeatureUsage {
                        total_engaged_users: scale(engaged, rng.gen_range(0.12..0.30)),
                        editors: None,
                    },
                );

                DailyMetricSnapshot {
                    date,
                    total_active_users: active,
                    total_engaged_users: engaged,
                    features,
                }
            })
            .collect()
    }

    /// Generate the seat roster.
    pub fn generate_roster(&self) -> SeatRoster {
        let mut rng = StdRng::seed_from_u64(self.config.seed ^ ROSTER_SEED_SALT);

        let seats = (0..self.config.seat_count)
            .map(|i| {
                let id = 1000 + i;
                let login = format!("{}{}", LOGINS[(i as usize) % LOGINS.len()], i);

                let assigning_team = if rng.gen_bool(0.25) {
                    None
                } else {
                    Some(AssigningTeam {
                        name: TEAMS[rng.gen_range(0..TEAMS.len())].to_string(),
                    })
                };

                let last_activity_editor = if rng.gen_bool(0.1) {
                    None
                } else {
                    Some(EDITORS[weighted_editor(&mut rng)].to_string())
                };

                let last_activity_at = if rng.gen_bool(0.1) {
                    None
                } else {
                    let hours_ago = rng.gen_range(0..24 * 30);
                    Some(self.anchor - ChronoDuration::hours(hours_ago))
                };

                let created_at = self.anchor - ChronoDuration::days(rng.gen_range(30..365));

                Seat {
                    assignee: Assignee {
                        login,
                        id,
                        avatar_url: format!("https://avatars.githubusercontent.com/u/{}?v=4", id),
                    },
                    created_at,
                    last_activity_at,
                    last_activity_editor,
                    assigning_team,
                }
            })
            .collect();

        SeatRoster {
            total_seats: self.config.total_seats,
            seats,
        }
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
    }
}

#[async_trait]
impl MetricsProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_metrics(&self) -> Result<Vec<DailyMetricSnapshot>, ProviderError> {
        self.simulate_latency().await;
        Ok(self.generate_metrics())
    }

    async fn fetch_seat_roster(&self) -> Result<SeatRoster, ProviderError> {
        self.simulate_latency().await;
        Ok(self.generate_roster())
    }
}

fn scale(value: u64, share: f64) -> u64 {
    (value as f64 * share).round() as u64
}

/// Roughly 60% vscode, 30% jetbrains, 10% neovim.
fn weighted_editor(rng: &mut StdRng) -> usize {
    match rng.gen_range(0..10) {
        0..=5 => 0,
        6..=8 => 1,
        _ => 2,
    }
}

fn split_by_editor(rng: &mut StdRng, total: u64) -> Vec<EditorUsage> {
    let vscode = scale(total, rng.gen_range(0.50..0.70));
    let jetbrains = scale(total - vscode, rng.gen_range(0.55..0.80));
    let neovim = total - vscode - jetbrains;
    [(EDITORS[0], vscode), (EDITORS[1], jetbrains), (EDITORS[2], neovim)]
        .into_iter()
        .map(|(name, total_engaged_users)| EditorUsage {
            name: name.to_string(),
            total_engaged_users,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = MockProvider::with_anchor(MockConfig::default(), anchor());
        let b = MockProvider::with_anchor(MockConfig::default(), anchor());
        assert_eq!(a.generate_metrics(), b.generate_metrics());
        assert_eq!(a.generate_roster(), b.generate_roster());
    }

    #[test]
    fn test_different_seed_different_data() {
        let a = MockProvider::with_anchor(MockConfig::default(), anchor());
        let b = MockProvider::with_anchor(
            MockConfig {
                seed: 7,
                ..Default::default()
            },
            anchor(),
        );
        assert_ne!(a.generate_roster(), b.generate_roster());
    }

    #[test]
    fn test_metrics_shape() {
        let provider = MockProvider::with_anchor(MockConfig::default(), anchor());
        let metrics = provider.generate_metrics();

        assert_eq!(metrics.len(), 28);
        assert_eq!(metrics.last().unwrap().date, anchor().date_naive());
        assert!(metrics.windows(2).all(|w| w[0].date < w[1].date));

        for day in &metrics {
            assert!(day.total_engaged_users <= day.total_active_users);
            assert!(day.total_active_users <= 150);
            assert_eq!(day.features.len(), 4);
            let editors = day.feature_editors(FeatureKey::CodeCompletions).unwrap();
            let sum: u64 = editors.iter().map(|e| e.total_engaged_users).sum();
            assert_eq!(sum, day.feature_users(FeatureKey::CodeCompletions));
        }
    }

    #[test]
    fn test_roster_shape() {
        let provider = MockProvider::with_anchor(MockConfig::default(), anchor());
        let roster = provider.generate_roster();

        assert_eq!(roster.total_seats, 200);
        assert_eq!(roster.seats.len(), 150);
        assert_eq!(roster.unassigned(), 50);

        let mut ids: Vec<u64> = roster.seats.iter().map(|s| s.assignee.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 150);

        assert!(roster.seats.iter().any(|s| s.assigning_team.is_none()));
        assert!(roster.seats.iter().any(|s| s.last_activity_at.is_none()));
        assert!(roster
            .seats
            .iter()
            .filter_map(|s| s.last_activity_at)
            .all(|ts| ts <= anchor()));
    }

    #[test]
    fn test_empty_config() {
        let provider = MockProvider::with_anchor(
            MockConfig {
                days: 0,
                seat_count: 0,
                total_seats: 0,
                ..Default::default()
            },
            anchor(),
        );
        assert!(provider.generate_metrics().is_empty());
        assert!(provider.generate_roster().seats.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_through_trait() {
        let provider = MockProvider::with_anchor(MockConfig::default(), anchor());
        let roster = provider.fetch_seat_roster().await.unwrap();
        assert_eq!(roster.seats.len(), 150);
    }
}
