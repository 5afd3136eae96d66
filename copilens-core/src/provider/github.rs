//! HTTP client for the GitHub Copilot REST API
//!
//! Reads the organization (or enterprise) Copilot metrics series and the
//! paginated seat billing roster.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::{GithubConfig, GithubScope};
use crate::error::{Error, ProviderError, Result};
use crate::types::{
    DailyMetricSnapshot, EditorUsage, FeatureKey, FeatureUsage, Seat, SeatRoster,
};

use super::MetricsProvider;

/// Seats requested per roster page (GitHub's maximum).
const SEATS_PER_PAGE: u32 = 100;

/// Upper bound on roster pages, in case `total_seats` never converges.
const MAX_SEAT_PAGES: u32 = 100;

/// One day from `GET .../copilot/metrics`
#[derive(Debug, Deserialize)]
struct MetricsDayPayload {
    date: NaiveDate,
    #[serde(default)]
    total_active_users: Option<u64>,
    #[serde(default)]
    total_engaged_users: Option<u64>,
    #[serde(default)]
    copilot_ide_code_completions: Option<FeaturePayload>,
    #[serde(default)]
    copilot_ide_chat: Option<FeaturePayload>,
    #[serde(default)]
    copilot_dotcom_chat: Option<FeaturePayload>,
    #[serde(default)]
    copilot_dotcom_pull_requests: Option<FeaturePayload>,
}

#[derive(Debug, Deserialize)]
struct FeaturePayload {
    #[serde(default)]
    total_engaged_users: Option<u64>,
    #[serde(default)]
    editors: Option<Vec<EditorPayload>>,
}

#[derive(Debug, Deserialize)]
struct EditorPayload {
    name: String,
    #[serde(default)]
    total_engaged_users: Option<u64>,
}

/// One page from `GET .../copilot/billing/seats`
#[derive(Debug, Deserialize)]
struct SeatsPagePayload {
    #[serde(default)]
    total_seats: Option<u64>,
    #[serde(default)]
    seats: Vec<Seat>,
}

impl From<FeaturePayload> for FeatureUsage {
    fn from(payload: FeaturePayload) -> Self {
        FeatureUsage {
            total_engaged_users: payload.total_engaged_users.unwrap_or(0),
            editors: payload.editors.map(|editors| {
                editors
                    .into_iter()
                    .map(|e| EditorUsage {
                        name: e.name,
                        total_engaged_users: e.total_engaged_users.unwrap_or(0),
                    })
                    .collect()
            }),
        }
    }
}

impl From<MetricsDayPayload> for DailyMetricSnapshot {
    fn from(payload: MetricsDayPayload) -> Self {
        let mut features = std::collections::BTreeMap::new();
        let wire = [
            (FeatureKey::CodeCompletions, payload.copilot_ide_code_completions),
            (FeatureKey::IdeChat, payload.copilot_ide_chat),
            (FeatureKey::DotcomChat, payload.copilot_dotcom_chat),
            (
                FeatureKey::PullRequestSummaries,
                payload.copilot_dotcom_pull_requests,
            ),
        ];
        for (key, feature) in wire {
            if let Some(feature) = feature {
                features.insert(key, FeatureUsage::from(feature));
            }
        }

        DailyMetricSnapshot {
            date: payload.date,
            total_active_users: payload.total_active_users.unwrap_or(0),
            total_engaged_users: payload.total_engaged_users.unwrap_or(0),
            features,
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> std::result::Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))
}

/// Decode a metrics response body.
pub fn parse_metrics(body: &str) -> std::result::Result<Vec<DailyMetricSnapshot>, ProviderError> {
    let days: Vec<MetricsDayPayload> = decode(body)?;
    Ok(days.into_iter().map(DailyMetricSnapshot::from).collect())
}

/// Decode one page of the seat billing response.
pub fn parse_seats_page(body: &str) -> std::result::Result<SeatRoster, ProviderError> {
    let page: SeatsPagePayload = decode(body)?;
    Ok(SeatRoster {
        total_seats: page.total_seats.unwrap_or(0),
        seats: page.seats,
    })
}

/// Provider backed by the GitHub REST API
pub struct GithubProvider {
    http_client: reqwest::Client,
    base_url: String,
    scope: GithubScope,
}

impl GithubProvider {
    /// Create a new client from configuration
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &GithubConfig) -> Result<Self> {
        config.validate()?;
        let scope = config.scope()?;
        let base_url = config.api_url.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("copilens/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|e| Error::Config(format!("invalid user agent: {}", e)))?,
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_str(&config.api_version)
                .map_err(|e| Error::Config(format!("invalid api_version: {}", e)))?,
        );

        if let Some(token) = config.resolved_token() {
            let auth_value = format!("Bearer {}", token.trim());
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| Error::Config(format!("invalid token: {}", e)))?,
            );
        } else {
            tracing::warn!("No GitHub token configured; requests will be unauthenticated");
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            scope,
        })
    }

    /// URL of the daily metrics endpoint.
    pub fn metrics_url(&self) -> String {
        format!("{}/{}/copilot/metrics", self.base_url, self.scope.path_prefix())
    }

    /// URL of one page of the seat billing endpoint.
    pub fn seats_url(&self, page: u32) -> String {
        format!(
            "{}/{}/copilot/billing/seats?per_page={}&page={}",
            self.base_url,
            self.scope.path_prefix(),
            SEATS_PER_PAGE,
            page
        )
    }

    /// GET a URL and return the body of a successful response.
    async fn get_body(&self, url: &str) -> std::result::Result<String, ProviderError> {
        tracing::debug!(url, "GitHub API request");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            response
                .text()
                .await
                .map_err(|e| ProviderError::Network(format!("failed to read response: {}", e)))
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(ProviderError::Status {
                status: status.as_u16(),
                body: error_text,
            })
        }
    }
}

#[async_trait]
impl MetricsProvider for GithubProvider {
    fn name(&self) -> &str {
        "github"
    }

    async fn fetch_metrics(&self) -> std::result::Result<Vec<DailyMetricSnapshot>, ProviderError> {
        let body = self.get_body(&self.metrics_url()).await?;
        parse_metrics(&body)
    }

    async fn fetch_seat_roster(&self) -> std::result::Result<SeatRoster, ProviderError> {
        let mut roster = parse_seats_page(&self.get_body(&self.seats_url(1)).await?)?;
        let mut page = 1;

        while roster.assigned() < roster.total_seats && page < MAX_SEAT_PAGES {
            page += 1;
            let next = parse_seats_page(&self.get_body(&self.seats_url(page)).await?)?;
            if next.seats.is_empty() {
                break;
            }
            roster.seats.extend(next.seats);
        }

        if roster.assigned() > roster.total_seats {
            tracing::warn!(
                assigned = roster.assigned(),
                total_seats = roster.total_seats,
                "Roster lists more seats than its total"
            );
        }

        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS_BODY: &str = r#"[
      {
        "date": "2024-06-24",
        "total_active_users": 24,
        "total_engaged_users": 20,
        "copilot_ide_code_completions": {
          "total_engaged_users": 20,
          "editors": [
            { "name": "vscode", "total_engaged_users": 13, "models": [] },
            { "name": "neovim", "total_engaged_users": 7 }
          ]
        },
        "copilot_ide_chat": { "total_engaged_users": 13 },
        "copilot_dotcom_pull_requests": { "total_engaged_users": 12, "repositories": [] }
      },
      {
        "date": "2024-06-25",
        "total_active_users": null,
        "total_engaged_users": 0
      }
    ]"#;

    const SEATS_BODY: &str = r#"{
      "total_seats": 3,
      "seats": [
        {
          "created_at": "2021-08-03T18:00:00-06:00",
          "updated_at": "2021-09-23T15:00:00-06:00",
          "pending_cancellation_date": null,
          "last_activity_at": "2021-10-14T00:53:32-06:00",
          "last_activity_editor": "vscode/1.77.3/copilot/1.86.82",
          "plan_type": "business",
          "assignee": {
            "login": "octocat",
            "id": 1,
            "avatar_url": "https://github.com/images/error/octocat_happy.gif",
            "type": "User"
          },
          "assigning_team": { "id": 1, "name": "Justice League", "slug": "justice-league" }
        },
        {
          "created_at": "2021-09-23T18:00:00-06:00",
          "last_activity_at": null,
          "last_activity_editor": null,
          "assignee": { "login": "octokitten", "id": 2, "avatar_url": "" }
        }
      ]
    }"#;

    #[test]
    fn test_parse_metrics() {
        let metrics = parse_metrics(METRICS_BODY).unwrap();
        assert_eq!(metrics.len(), 2);

        let first = &metrics[0];
        assert_eq!(first.total_active_users, 24);
        assert_eq!(first.feature_users(FeatureKey::CodeCompletions), 20);
        assert_eq!(first.feature_users(FeatureKey::PullRequestSummaries), 12);
        assert_eq!(first.feature_users(FeatureKey::DotcomChat), 0);
        assert!(!first.features.contains_key(&FeatureKey::DotcomChat));

        let editors = first.feature_editors(FeatureKey::CodeCompletions).unwrap();
        assert_eq!(editors.len(), 2);
        assert_eq!(editors[0].name, "vscode");
        assert_eq!(editors[1].total_engaged_users, 7);

        // Null counters decode as zero
        assert_eq!(metrics[1].total_active_users, 0);
        assert!(metrics[1].features.is_empty());
    }

    #[test]
    fn test_parse_seats_page() {
        let roster = parse_seats_page(SEATS_BODY).unwrap();
        assert_eq!(roster.total_seats, 3);
        assert_eq!(roster.seats.len(), 2);
        assert_eq!(roster.unassigned(), 1);

        let first = &roster.seats[0];
        assert_eq!(first.team_label(), "Justice League");
        assert_eq!(first.editor_label(), "Vscode");
        assert!(first.last_activity_at.is_some());

        let second = &roster.seats[1];
        assert!(second.last_activity_at.is_none());
        assert_eq!(second.team_label(), "Unassigned");
        assert_eq!(second.editor_label(), "Unknown");
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            parse_metrics(r#"{"message": "Not Found"}"#),
            Err(ProviderError::Malformed(_))
        ));
        assert!(matches!(
            parse_seats_page("not json"),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn test_urls() {
        let config = GithubConfig {
            api_url: "https://ghe.example.com/api/v3/".to_string(),
            organization: Some("octodemo".to_string()),
            ..Default::default()
        };
        let provider = GithubProvider::new(&config).unwrap();
        assert_eq!(
            provider.metrics_url(),
            "https://ghe.example.com/api/v3/orgs/octodemo/copilot/metrics"
        );
        assert_eq!(
            provider.seats_url(2),
            "https://ghe.example.com/api/v3/orgs/octodemo/copilot/billing/seats?per_page=100&page=2"
        );
    }

    #[test]
    fn test_client_requires_valid_config() {
        assert!(GithubProvider::new(&GithubConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let config = GithubConfig {
            // Port 9 (discard) on loopback is closed in CI sandboxes
            api_url: "http://127.0.0.1:9".to_string(),
            organization: Some("octodemo".to_string()),
            timeout_secs: 2,
            ..Default::default()
        };
        let provider = GithubProvider::new(&config).unwrap();
        let err = provider.fetch_metrics().await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }
}
