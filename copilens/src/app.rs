//! Application state for the TUI.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use copilens_core::analytics::DashboardView;
use copilens_core::config::DashboardConfig;
use copilens_core::{
    spawn_load, DashboardData, DrillDown, FeatureKey, LoadHandle, MetricsProvider, Result,
    SummaryCard,
};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::TableState;

/// Lifecycle of the dashboard data.
pub enum LoadState {
    /// Both fetches in flight
    Loading(LoadHandle),
    /// Load failed; message shown in the error banner
    Failed(String),
    /// Data loaded at `loaded_at`
    Ready {
        data: DashboardData,
        loaded_at: DateTime<Utc>,
    },
}

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusPane {
    #[default]
    Trend,
    Features,
    Roster,
}

impl FocusPane {
    fn next(self) -> Self {
        match self {
            FocusPane::Trend => FocusPane::Features,
            FocusPane::Features => FocusPane::Roster,
            FocusPane::Roster => FocusPane::Trend,
        }
    }

    fn previous(self) -> Self {
        match self {
            FocusPane::Trend => FocusPane::Roster,
            FocusPane::Features => FocusPane::Trend,
            FocusPane::Roster => FocusPane::Features,
        }
    }
}

/// Main application state.
pub struct App {
    provider: Arc<dyn MetricsProvider>,
    /// Window sizes for trends and averages
    pub windows: DashboardConfig,
    pub load: LoadState,
    /// Open drill-down panel, if any
    pub drill_down: DrillDown,
    pub focus: FocusPane,
    /// Selected bar in the trend chart
    pub trend_index: usize,
    pub feature_state: TableState,
    pub roster_state: TableState,
    pub should_quit: bool,
}

impl App {
    /// Create the app and start the first load.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(provider: Arc<dyn MetricsProvider>, windows: DashboardConfig) -> Self {
        let handle = spawn_load(Arc::clone(&provider));
        Self {
            provider,
            windows,
            load: LoadState::Loading(handle),
            drill_down: DrillDown::default(),
            focus: FocusPane::default(),
            trend_index: 0,
            feature_state: TableState::default(),
            roster_state: TableState::default(),
            should_quit: false,
        }
    }

    /// Name of the provider backing the dashboard.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Derived view over the loaded data, `None` until loaded.
    pub fn view(&self) -> Option<DashboardView<'_>> {
        match &self.load {
            LoadState::Ready { data, loaded_at } => {
                Some(DashboardView::new(data, *loaded_at, self.windows))
            }
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load, LoadState::Loading(_))
    }

    /// Pick up the load result if it has arrived.
    pub fn poll_load(&mut self) {
        let result = match &mut self.load {
            LoadState::Loading(handle) => handle.poll_result(),
            _ => None,
        };
        if let Some(result) = result {
            self.finish_load(result);
        }
    }

    fn finish_load(&mut self, result: Result<DashboardData>) {
        match result {
            Ok(data) => {
                tracing::info!(
                    days = data.metrics.len(),
                    seats = data.roster.seats.len(),
                    "Dashboard ready"
                );
                self.load = LoadState::Ready {
                    data,
                    loaded_at: Utc::now(),
                };
                self.reset_selection();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dashboard load failed");
                self.load = LoadState::Failed(e.to_string());
                self.drill_down.dismiss();
            }
        }
    }

    /// Discard the current data and load again.
    ///
    /// Replacing an in-flight handle drops it, which aborts that load.
    pub fn reload(&mut self) {
        tracing::info!(provider = self.provider.name(), "Reloading dashboard");
        self.drill_down.dismiss();
        self.load = LoadState::Loading(spawn_load(Arc::clone(&self.provider)));
    }

    fn reset_selection(&mut self) {
        self.drill_down = DrillDown::default();
        self.trend_index = self.trend_len().saturating_sub(1);
        self.feature_state.select(Some(0));
        let seats = self.roster_len();
        self.roster_state.select((seats > 0).then_some(0));
    }

    fn trend_len(&self) -> usize {
        self.view().map(|v| v.trend().len()).unwrap_or(0)
    }

    fn roster_len(&self) -> usize {
        match &self.load {
            LoadState::Ready { data, .. } => data.roster.seats.len(),
            _ => 0,
        }
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => {
                if !self.is_loading() {
                    self.reload();
                }
            }
            KeyCode::Esc | KeyCode::Backspace => {
                self.drill_down.dismiss();
            }
            _ if self.view().is_none() => {}
            KeyCode::Char('1') => self.drill_down.activate_card(SummaryCard::Seats),
            KeyCode::Char('2') => self.drill_down.activate_card(SummaryCard::ActiveUsers),
            KeyCode::Char('3') => self.drill_down.activate_card(SummaryCard::EngagedUsers),
            KeyCode::Char('4') => self.drill_down.activate_card(SummaryCard::Adoption),
            KeyCode::Tab => {
                self.focus = self.focus.next();
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Right | KeyCode::Char('l') => {
                self.move_selection(1);
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Left | KeyCode::Char('h') => {
                self.move_selection(-1);
            }
            KeyCode::Enter => {
                self.open_focused();
            }
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        match self.focus {
            FocusPane::Trend => {
                self.trend_index = step(self.trend_index, delta, self.trend_len());
            }
            FocusPane::Features => {
                let current = self.feature_state.selected().unwrap_or(0);
                self.feature_state
                    .select(Some(step(current, delta, FeatureKey::ALL.len())));
            }
            FocusPane::Roster => {
                let len = self.roster_len();
                if len > 0 {
                    let current = self.roster_state.selected().unwrap_or(0);
                    self.roster_state.select(Some(step(current, delta, len)));
                }
            }
        }
    }

    /// Drill into the selected item of the focused pane.
    fn open_focused(&mut self) {
        let Some(view) = self.view() else {
            return;
        };
        let target = match self.focus {
            FocusPane::Trend => view
                .trend()
                .get(self.trend_index)
                .map(|point| DrillTarget::Trend(point.date)),
            FocusPane::Features => self
                .feature_state
                .selected()
                .and_then(|idx| FeatureKey::ALL.get(idx))
                .map(|key| DrillTarget::Feature(*key)),
            FocusPane::Roster => self
                .roster_state
                .selected()
                .and_then(|idx| view.data.roster.seats.get(idx))
                .map(|seat| DrillTarget::Seat(seat.user_id())),
        };

        match target {
            Some(DrillTarget::Trend(date)) => self.drill_down.select_trend_point(date),
            Some(DrillTarget::Feature(key)) => self.drill_down.select_feature(key),
            Some(DrillTarget::Seat(user_id)) => self.drill_down.select_seat(user_id),
            None => {}
        }
    }
}

enum DrillTarget {
    Trend(chrono::NaiveDate),
    Feature(FeatureKey),
    Seat(u64),
}

/// Move an index by `delta` within `0..len`, clamping at both ends.
fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    current.saturating_add_signed(delta).min(len - 1)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use copilens_core::config::MockConfig;
    use copilens_core::provider::MockProvider;
    use copilens_core::{Error, ProviderError};
    use crossterm::event::KeyModifiers;

    fn provider() -> Arc<dyn MetricsProvider> {
        let anchor = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
        Arc::new(MockProvider::with_anchor(
            MockConfig {
                seat_count: 12,
                total_seats: 20,
                ..Default::default()
            },
            anchor,
        ))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn settle(app: &mut App) {
        let state = std::mem::replace(&mut app.load, LoadState::Failed(String::new()));
        match state {
            LoadState::Loading(handle) => {
                let result = handle.wait().await;
                app.finish_load(result);
            }
            other => app.load = other,
        }
    }

    pub(crate) async fn ready_app() -> App {
        let mut app = App::new(provider(), DashboardConfig::default());
        settle(&mut app).await;
        assert!(app.view().is_some());
        app
    }

    #[test]
    fn test_step_clamps() {
        assert_eq!(step(0, -1, 5), 0);
        assert_eq!(step(4, 1, 5), 4);
        assert_eq!(step(2, 1, 5), 3);
        assert_eq!(step(3, 1, 0), 0);
    }

    #[tokio::test]
    async fn test_starts_loading_then_ready() {
        let mut app = App::new(provider(), DashboardConfig::default());
        assert!(app.is_loading());
        assert_eq!(app.provider_name(), "mock");

        settle(&mut app).await;
        assert!(!app.is_loading());
        assert_eq!(app.trend_index, 13);
        assert_eq!(app.roster_state.selected(), Some(0));
        assert_eq!(app.feature_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_keys_ignored_while_loading() {
        let mut app = App::new(provider(), DashboardConfig::default());
        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.drill_down, DrillDown::Closed);
        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.is_loading());
    }

    #[tokio::test]
    async fn test_card_keys_open_and_escape_closes() {
        let mut app = ready_app().await;

        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.drill_down, DrillDown::SeatsOverview);
        app.handle_key(key(KeyCode::Char('4')));
        assert_eq!(app.drill_down, DrillDown::AdoptionDetail);

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.drill_down, DrillDown::Closed);

        app.handle_key(key(KeyCode::Char('2')));
        app.handle_key(key(KeyCode::Backspace));
        assert!(!app.drill_down.is_open());
    }

    #[tokio::test]
    async fn test_enter_drills_into_focused_pane() {
        let mut app = ready_app().await;
        let expected_date = app.view().unwrap().trend()[12].date;

        // Trend pane: step back one bar from the latest
        app.handle_key(key(KeyCode::Char('k')));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            app.drill_down,
            DrillDown::TrendDetail {
                date: expected_date
            }
        );

        // Feature pane
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, FocusPane::Features);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            app.drill_down,
            DrillDown::FeatureDetail {
                key: FeatureKey::IdeChat
            }
        );

        // Roster pane
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('j')));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.drill_down, DrillDown::UserDetail { user_id: 1001 });

        // Back to the trend
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, FocusPane::Trend);
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.focus, FocusPane::Roster);
    }

    #[tokio::test]
    async fn test_failed_load_and_reload() {
        let mut app = ready_app().await;
        app.handle_key(key(KeyCode::Char('1')));

        app.finish_load(Err(Error::Provider(ProviderError::Status {
            status: 401,
            body: "Bad credentials".to_string(),
        })));
        match &app.load {
            LoadState::Failed(message) => assert!(message.contains("401")),
            _ => panic!("expected failed state"),
        }
        assert!(app.view().is_none());

        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.is_loading());
        assert_eq!(app.drill_down, DrillDown::Closed);

        settle(&mut app).await;
        assert!(app.view().is_some());
    }

    #[tokio::test]
    async fn test_failed_load_closes_drill_down() {
        let mut app = ready_app().await;
        app.handle_key(key(KeyCode::Enter));
        assert!(app.drill_down.is_open());

        app.finish_load(Err(Error::Provider(ProviderError::Network(
            "connection reset".to_string(),
        ))));
        assert_eq!(app.drill_down, DrillDown::Closed);
    }

    #[tokio::test]
    async fn test_quit() {
        let mut app = App::new(provider(), DashboardConfig::default());
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }
}
