//! Metrics providers
//!
//! A provider supplies the two raw snapshots a dashboard is built from:
//! the ascending daily metrics series and the seat roster.
//!
//! ## Loading
//!
//! [`load_dashboard`] issues both fetches concurrently and only returns a
//! [`DashboardData`] once both have succeeded. If either fails the whole
//! load fails with that provider error, so callers never see half of the
//! data.
//!
//! [`spawn_load`] runs the same load on a tokio task and hands back a
//! [`LoadHandle`]. Dropping the handle aborts the task, which is how a view
//! that is torn down mid-load guarantees it receives no late result.
//!
//! ## Usage
//!
//! Pick the provider in `~/.config/copilens/config.toml`:
//!
//! ```toml
//! [provider]
//! kind = "github"
//!
//! [github]
//! organization = "octodemo"
//! ```

mod github;
mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::{Config, ProviderKind};
use crate::error::{Error, ProviderError, Result};
use crate::types::{DailyMetricSnapshot, DashboardData, SeatRoster};

pub use github::{parse_metrics, parse_seats_page, GithubProvider};
pub use mock::MockProvider;

/// Source of raw Copilot usage data.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Daily snapshots, ascending by date.
    async fn fetch_metrics(&self) -> std::result::Result<Vec<DailyMetricSnapshot>, ProviderError>;

    /// Current seat roster.
    async fn fetch_seat_roster(&self) -> std::result::Result<SeatRoster, ProviderError>;
}

/// Build the provider selected in the configuration.
pub fn build_provider(config: &Config) -> Result<Arc<dyn MetricsProvider>> {
    match config.provider.kind {
        ProviderKind::Github => Ok(Arc::new(GithubProvider::new(&config.github)?)),
        ProviderKind::Mock => {
            config.mock.validate()?;
            Ok(Arc::new(MockProvider::new(config.mock.clone())))
        }
    }
}

/// Fetch metrics and roster concurrently and combine them.
pub async fn load_dashboard(provider: &dyn MetricsProvider) -> Result<DashboardData> {
    tracing::info!(provider = provider.name(), "Loading dashboard data");

    let fetched = tokio::try_join!(provider.fetch_metrics(), provider.fetch_seat_roster());
    let (metrics, roster) = match fetched {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!(provider = provider.name(), error = %e, "Dashboard load failed");
            return Err(e.into());
        }
    };

    check_ascending(&metrics)?;

    tracing::info!(
        provider = provider.name(),
        days = metrics.len(),
        seats = roster.seats.len(),
        total_seats = roster.total_seats,
        "Dashboard data loaded"
    );

    Ok(DashboardData { metrics, roster })
}

/// Reject series that break the strictly-ascending date invariant.
fn check_ascending(metrics: &[DailyMetricSnapshot]) -> std::result::Result<(), ProviderError> {
    for pair in metrics.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(ProviderError::Malformed(format!(
                "metrics are not strictly ascending by date ({} then {})",
                pair[0].date, pair[1].date
            )));
        }
    }
    Ok(())
}

/// Start loading on a background task.
///
/// Must be called from within a tokio runtime.
pub fn spawn_load(provider: Arc<dyn MetricsProvider>) -> LoadHandle {
    let (tx, rx) = oneshot::channel();
    let task = tokio::spawn(async move {
        let result = load_dashboard(provider.as_ref()).await;
        // Receiver gone means the view was torn down; nothing to deliver.
        let _ = tx.send(result);
    });
    LoadHandle { task, rx }
}

/// An in-flight dashboard load.
///
/// Dropping the handle aborts the load.
pub struct LoadHandle {
    task: JoinHandle<()>,
    rx: oneshot::Receiver<Result<DashboardData>>,
}

impl LoadHandle {
    /// Non-blocking check for the load result.
    ///
    /// Returns `None` while the fetches are still in flight.
    pub fn poll_result(&mut self) -> Option<Result<DashboardData>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(task_ended())),
        }
    }

    /// Wait for the load to settle.
    pub async fn wait(mut self) -> Result<DashboardData> {
        match (&mut self.rx).await {
            Ok(result) => result,
            Err(_) => Err(task_ended()),
        }
    }

    /// Abandon the load; no result will be delivered.
    pub fn cancel(self) {
        tracing::debug!("Dashboard load cancelled");
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn task_ended() -> Error {
    Error::Provider(ProviderError::Network(
        "load task ended without a result".to_string(),
    ))
}
