//! # copilens-core
//!
//! Core library for copilens - a Copilot usage and adoption dashboard.
//!
//! This library provides:
//! - Domain types for daily usage snapshots and the seat roster
//! - Metrics providers (GitHub REST API and a seeded mock)
//! - Derived metrics and dashboard view-models
//! - Drill-down navigation state
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Data flow
//!
//! - **Load:** a [`MetricsProvider`] fetches the daily series and the roster
//!   concurrently; both must succeed.
//! - **Derive:** [`analytics::DashboardView`] computes card, chart and table
//!   figures from the loaded [`DashboardData`].
//! - **Navigate:** [`DrillDown`] tracks which detail panel is open and
//!   resolves it into a [`DetailView`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use copilens_core::{analytics::DashboardView, build_provider, load_dashboard, Config};
//!
//! # async fn run() -> copilens_core::Result<()> {
//! let config = Config::load()?;
//! let provider = build_provider(&config)?;
//! let data = load_dashboard(provider.as_ref()).await?;
//!
//! let view = DashboardView::new(&data, chrono::Utc::now(), config.dashboard);
//! println!("adoption: {}%", view.summary().adoption.ratio);
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use drilldown::{DetailView, DrillDown, DrillDownEvent, SummaryCard};
pub use error::{Error, ProviderError, Result};
pub use provider::{build_provider, load_dashboard, spawn_load, LoadHandle, MetricsProvider};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod drilldown;
pub mod error;
pub mod format;
pub mod logging;
pub mod provider;
pub mod types;
