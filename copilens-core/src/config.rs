//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/copilens/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/copilens/` (~/.config/copilens/)
//! - State/Logs: `$XDG_STATE_HOME/copilens/` (~/.local/state/copilens/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Which provider backs the dashboard
    #[serde(default)]
    pub provider: ProviderConfig,

    /// GitHub API settings (used when `provider.kind = "github"`)
    #[serde(default)]
    pub github: GithubConfig,

    /// Demo data settings (used when `provider.kind = "mock"`)
    #[serde(default)]
    pub mock: MockConfig,

    /// Window sizes for trends and averages
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Provider selection
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
}

/// Supported providers
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Live GitHub Copilot REST API
    #[default]
    Github,
    /// Seeded offline demo data
    Mock,
}

/// GitHub Copilot API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    /// REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Organization login (mutually exclusive with `enterprise`)
    pub organization: Option<String>,

    /// Enterprise slug (mutually exclusive with `organization`)
    pub enterprise: Option<String>,

    /// Value sent as `X-GitHub-Api-Version`
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// API token (the `GITHUB_TOKEN` env var takes precedence)
    pub token: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            organization: None,
            enterprise: None,
            api_version: default_api_version(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Whose Copilot usage is being queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GithubScope {
    Organization(String),
    Enterprise(String),
}

impl GithubScope {
    /// URL path prefix for this scope (e.g. `orgs/octodemo`).
    pub fn path_prefix(&self) -> String {
        match self {
            GithubScope::Organization(org) => format!("orgs/{}", urlencoding::encode(org)),
            GithubScope::Enterprise(ent) => {
                format!("enterprises/{}", urlencoding::encode(ent))
            }
        }
    }

    /// Display name of the organization or enterprise.
    pub fn name(&self) -> &str {
        match self {
            GithubScope::Organization(name) | GithubScope::Enterprise(name) => name,
        }
    }
}

impl GithubConfig {
    /// Resolve the configured scope, requiring exactly one of organization/enterprise.
    pub fn scope(&self) -> Result<GithubScope> {
        match (&self.organization, &self.enterprise) {
            (Some(org), None) if !org.trim().is_empty() => {
                Ok(GithubScope::Organization(org.trim().to_string()))
            }
            (None, Some(ent)) if !ent.trim().is_empty() => {
                Ok(GithubScope::Enterprise(ent.trim().to_string()))
            }
            (Some(_), Some(_)) => Err(Error::Config(
                "github.organization and github.enterprise are mutually exclusive".to_string(),
            )),
            _ => Err(Error::Config(
                "github.organization or github.enterprise is required".to_string(),
            )),
        }
    }

    /// Token from `GITHUB_TOKEN`, falling back to the config file.
    pub fn resolved_token(&self) -> Option<String> {
        std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.token.clone())
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(Error::Config("github.api_url must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "github.timeout_secs must be greater than 0".to_string(),
            ));
        }
        self.scope().map(|_| ())
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_api_version() -> String {
    "2022-11-28".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Seeded demo data configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MockConfig {
    /// RNG seed; the same seed always yields the same data
    #[serde(default = "default_mock_seed")]
    pub seed: u64,

    /// Number of daily snapshots to generate
    #[serde(default = "default_mock_days")]
    pub days: usize,

    /// Purchased seat capacity
    #[serde(default = "default_mock_total_seats")]
    pub total_seats: u64,

    /// Assigned seats (must not exceed `total_seats`)
    #[serde(default = "default_mock_seat_count")]
    pub seat_count: u64,

    /// Artificial delay before each fetch resolves
    #[serde(default)]
    pub latency_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            seed: default_mock_seed(),
            days: default_mock_days(),
            total_seats: default_mock_total_seats(),
            seat_count: default_mock_seat_count(),
            latency_ms: 0,
        }
    }
}

impl MockConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.seat_count > self.total_seats {
            return Err(Error::Config(
                "mock.seat_count must not exceed mock.total_seats".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_mock_seed() -> u64 {
    42
}

fn default_mock_days() -> usize {
    28
}

fn default_mock_total_seats() -> u64 {
    200
}

fn default_mock_seat_count() -> u64 {
    150
}

/// Window sizes used by the dashboard views
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Snapshots shown in trend charts
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,

    /// Snapshots used for short-term averages
    #[serde(default = "default_average_window")]
    pub average_window: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            trend_window: default_trend_window(),
            average_window: default_average_window(),
        }
    }
}

fn default_trend_window() -> usize {
    14
}

fn default_average_window() -> usize {
    7
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Load from `path` if given, otherwise from the default location.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Switch to the mock provider, optionally overriding its seed.
    pub fn use_mock(&mut self, seed: Option<u64>) {
        self.provider.kind = ProviderKind::Mock;
        if let Some(seed) = seed {
            self.mock.seed = seed;
        }
    }

    /// Validate the sections relevant to the selected provider.
    pub fn validate(&self) -> Result<()> {
        if self.dashboard.trend_window == 0 || self.dashboard.average_window == 0 {
            return Err(Error::Config(
                "dashboard windows must be greater than 0".to_string(),
            ));
        }
        match self.provider.kind {
            ProviderKind::Github => self.github.validate(),
            ProviderKind::Mock => self.mock.validate(),
        }
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/copilens/config.toml` (~/.config/copilens/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("copilens").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/copilens/` (~/.local/state/copilens/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("copilens")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/copilens/copilens.log` (~/.local/state/copilens/copilens.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("copilens.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.kind, ProviderKind::Github);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.api_version, "2022-11-28");
        assert_eq!(config.dashboard.trend_window, 14);
        assert_eq!(config.dashboard.average_window, 7);
        assert_eq!(config.mock.seed, 42);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[provider]
kind = "mock"

[github]
organization = "octodemo"
timeout_secs = 10

[mock]
seed = 7
days = 60

[dashboard]
trend_window = 30

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.provider.kind, ProviderKind::Mock);
        assert_eq!(config.github.organization.as_deref(), Some("octodemo"));
        assert_eq!(config.github.timeout_secs, 10);
        assert_eq!(config.mock.seed, 7);
        assert_eq!(config.mock.days, 60);
        assert_eq!(config.mock.total_seats, 200);
        assert_eq!(config.dashboard.trend_window, 30);
        assert_eq!(config.dashboard.average_window, 7);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_github_scope() {
        let config = GithubConfig {
            organization: Some("octodemo".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.scope().unwrap(),
            GithubScope::Organization("octodemo".to_string())
        );
        assert_eq!(config.scope().unwrap().path_prefix(), "orgs/octodemo");

        let config = GithubConfig {
            enterprise: Some("acme corp".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.scope().unwrap().path_prefix(),
            "enterprises/acme%20corp"
        );
    }

    #[test]
    fn test_github_validation() {
        // Neither scope set
        assert!(GithubConfig::default().validate().is_err());

        // Both scopes set
        let config = GithubConfig {
            organization: Some("a".to_string()),
            enterprise: Some("b".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GithubConfig {
            organization: Some("a".to_string()),
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mock_validation() {
        let config = MockConfig {
            seat_count: 300,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(MockConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = Config::default();
        config.provider.kind = ProviderKind::Mock;
        config.dashboard.average_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[github]\nenterprise = \"acme\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.github.enterprise.as_deref(), Some("acme"));

        std::fs::write(&path, "[github\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_use_mock_override() {
        let mut config = Config::default();
        config.use_mock(None);
        assert_eq!(config.provider.kind, ProviderKind::Mock);
        assert_eq!(config.mock.seed, 42);

        config.use_mock(Some(7));
        assert_eq!(config.mock.seed, 7);
        assert!(config.validate().is_ok());
    }
}
