//! UI rendering for the TUI.

mod detail;

use copilens_core::analytics::{
    engagement_rate, AdoptionLevel, DashboardSummary, FeatureEngagement, RecencyClass, RosterRow,
    TrendPoint,
};
use copilens_core::format::{format_count, format_percent};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Sparkline, Table, Wrap,
    },
    Frame,
};

use crate::app::{App, FocusPane, LoadState};

// ========== Palette ==========

/// Primary accent (borders, active users)
const ACCENT: Color = Color::Rgb(0, 180, 180);
/// Engaged users series
const ENGAGED: Color = Color::Rgb(138, 43, 226);
/// Secondary text
const DIM: Color = Color::Rgb(128, 128, 128);
/// Field labels
const LABEL_COLOR: Color = Color::Rgb(100, 180, 180);
/// Border of the focused pane
const BORDER_FOCUS: Color = Color::Rgb(255, 215, 0);
/// Border of unfocused panes
const BORDER_IDLE: Color = Color::Rgb(60, 60, 60);
/// Drill-down panel border
const BORDER_DETAIL: Color = Color::Rgb(180, 100, 180);

const LEVEL_STRONG: Color = Color::Rgb(50, 205, 50);
const LEVEL_MODERATE: Color = Color::Rgb(255, 215, 0);
const LEVEL_LOW: Color = Color::Rgb(255, 127, 80);

const ERROR_RED: Color = Color::Rgb(220, 80, 80);

/// Colors for teams and editors, picked by hashing the label.
const GROUP_PALETTE: [Color; 8] = [
    Color::Rgb(0, 180, 180),
    Color::Rgb(220, 180, 0),
    Color::Rgb(138, 43, 226),
    Color::Rgb(50, 205, 50),
    Color::Rgb(255, 127, 80),
    Color::Rgb(100, 149, 237),
    Color::Rgb(255, 105, 180),
    Color::Rgb(192, 192, 192),
];

/// Stable color for a group label, independent of its position in a list.
pub(crate) fn label_color(label: &str) -> Color {
    // FNV-1a
    let hash = label.bytes().fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3)
    });
    GROUP_PALETTE[(hash % GROUP_PALETTE.len() as u64) as usize]
}

pub(crate) fn level_color(level: AdoptionLevel) -> Color {
    match level {
        AdoptionLevel::Strong => LEVEL_STRONG,
        AdoptionLevel::Moderate => LEVEL_MODERATE,
        AdoptionLevel::Underutilized => LEVEL_LOW,
    }
}

pub(crate) fn recency_color(class: RecencyClass) -> Color {
    match class {
        RecencyClass::Today => LEVEL_STRONG,
        RecencyClass::Recent => LEVEL_MODERATE,
        RecencyClass::Stale => LEVEL_LOW,
        RecencyClass::Never => DIM,
    }
}

/// Render the whole screen.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Layout: header, body, footer
    let chunks = Layout::vertical([
        Constraint::Length(2), // Header
        Constraint::Min(5),    // Body
        Constraint::Length(1), // Footer
    ])
    .split(area);

    render_header(frame, app, chunks[0]);

    match &app.load {
        LoadState::Loading(_) => render_loading(frame, chunks[1]),
        LoadState::Failed(message) => render_error_banner(frame, message, chunks[1]),
        LoadState::Ready { .. } => render_dashboard(frame, app, chunks[1]),
    }

    render_footer(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([
        Constraint::Length(11), // App name
        Constraint::Min(1),     // Source and date
    ])
    .split(area);

    let app_name = Paragraph::new(" copilens").style(Style::default().fg(ACCENT).bold());
    frame.render_widget(app_name, chunks[0]);

    let as_of = app
        .view()
        .and_then(|view| view.summary().as_of)
        .map(|date| format!("  as of {}", date.format("%b %-d, %Y")))
        .unwrap_or_default();

    let info = Line::from(vec![
        Span::styled("Copilot usage", Style::default().fg(Color::White)),
        Span::styled(format!("  [{}]", app.provider_name()), Style::default().fg(DIM)),
        Span::styled(as_of, Style::default().fg(DIM)),
    ]);
    let info = Paragraph::new(info).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(info, chunks[1]);
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let placeholder = Paragraph::new("Loading Copilot metrics and seats...")
        .style(Style::default().fg(DIM))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
    frame.render_widget(placeholder, area);
}

/// Session-level error banner; no partial data is shown.
fn render_error_banner(frame: &mut Frame, message: &str, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "Failed to load dashboard",
            Style::default().fg(ERROR_RED).bold(),
        )),
        Line::raw(""),
        Line::from(Span::raw(message.to_string())),
        Line::raw(""),
        Line::from(vec![
            Span::styled("r", Style::default().fg(Color::Yellow).bold()),
            Span::styled(" to retry  ", Style::default().fg(DIM)),
            Span::styled("q", Style::default().fg(Color::Yellow).bold()),
            Span::styled(" to quit", Style::default().fg(DIM)),
        ]),
    ];
    let banner = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ERROR_RED))
                .title(" Error "),
        );
    frame.render_widget(banner, area);
}

fn render_dashboard(frame: &mut Frame, app: &mut App, area: Rect) {
    // Derive everything up front so the stateful widgets can borrow the app.
    let Some(view) = app.view() else {
        return;
    };
    let summary = view.summary();
    let trend = view.trend();
    let features = view.features();
    let rows = view.roster_rows();
    let panel = app
        .drill_down
        .is_open()
        .then(|| (app.drill_down.title(&view), app.drill_down.resolve(&view)));

    let chunks = Layout::vertical([
        Constraint::Length(5),      // Cards
        Constraint::Percentage(45), // Trend + features
        Constraint::Min(5),         // Roster
    ])
    .split(area);

    render_cards(frame, &summary, chunks[0]);

    let middle = Layout::horizontal([
        Constraint::Percentage(60), // Trend
        Constraint::Percentage(40), // Features
    ])
    .split(chunks[1]);

    render_trend(frame, app, &trend, middle[0]);
    render_features(frame, app, &features, summary.engaged_users, middle[1]);
    render_roster(frame, app, &rows, chunks[2]);

    if let Some((title, detail)) = panel {
        let popup = centered_rect(area, 80, 85);
        frame.render_widget(Clear, popup);
        detail::render_panel(frame, &title, &detail, popup);
    }
}

fn render_cards(frame: &mut Frame, summary: &DashboardSummary, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);

    let seats = vec![
        big_value(format_count(summary.total_seats), Color::White),
        Line::from(Span::styled(
            format!(
                "{} assigned · {} free",
                format_count(summary.assigned_seats),
                format_count(summary.unassigned_seats)
            ),
            Style::default().fg(DIM),
        )),
    ];
    render_card(frame, "[1] Total Seats", seats, chunks[0]);

    let active = vec![
        big_value(format_count(summary.active_users), ACCENT),
        Line::from(Span::styled("on the latest day", Style::default().fg(DIM))),
    ];
    render_card(frame, "[2] Active Users", active, chunks[1]);

    let engaged_share = engagement_rate(summary.engaged_users, summary.active_users);
    let engaged = vec![
        big_value(format_count(summary.engaged_users), ENGAGED),
        Line::from(Span::styled(
            format!("{} of active", format_percent(engaged_share)),
            Style::default().fg(DIM),
        )),
    ];
    render_card(frame, "[3] Engaged Users", engaged, chunks[2]);

    let color = level_color(summary.adoption.level);
    let adoption = vec![
        big_value(format_percent(summary.adoption.ratio), color),
        Line::from(Span::styled(
            summary.adoption.level.label(),
            Style::default().fg(color),
        )),
    ];
    render_card(frame, "[4] Adoption Rate", adoption, chunks[3]);
}

fn big_value(text: String, color: Color) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(color).bold()))
}

fn render_card(frame: &mut Frame, title: &str, lines: Vec<Line<'static>>, area: Rect) {
    let card = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_IDLE))
            .title(format!(" {} ", title))
            .title_style(Style::default().fg(LABEL_COLOR)),
    );
    frame.render_widget(card, area);
}

fn pane_block(title: &str, focused: bool) -> Block<'static> {
    let border = if focused { BORDER_FOCUS } else { BORDER_IDLE };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(border).bold())
}

/// Active and engaged sparklines with a marker under the selected day.
fn render_trend(frame: &mut Frame, app: &App, trend: &[TrendPoint], area: Rect) {
    let block = pane_block("Usage Trend", app.focus == FocusPane::Trend);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if trend.is_empty() {
        let empty = Paragraph::new("No daily metrics").style(Style::default().fg(DIM));
        frame.render_widget(empty, inner);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Min(2),    // Active
        Constraint::Min(2),    // Engaged
        Constraint::Length(1), // Marker
        Constraint::Length(1), // Selected point
    ])
    .split(inner);

    let max = trend.iter().map(|p| p.active).max().unwrap_or(0).max(1);
    let active: Vec<u64> = trend.iter().map(|p| p.active).collect();
    let engaged: Vec<u64> = trend.iter().map(|p| p.engaged).collect();

    let active_spark = Sparkline::default()
        .data(&active)
        .max(max)
        .style(Style::default().fg(ACCENT))
        .bar_set(symbols::bar::NINE_LEVELS);
    frame.render_widget(active_spark, chunks[0]);

    let engaged_spark = Sparkline::default()
        .data(&engaged)
        .max(max)
        .style(Style::default().fg(ENGAGED))
        .bar_set(symbols::bar::NINE_LEVELS);
    frame.render_widget(engaged_spark, chunks[1]);

    let index = app.trend_index.min(trend.len() - 1);
    let marker = Line::from(vec![
        Span::raw(" ".repeat(index)),
        Span::styled("▲", Style::default().fg(BORDER_FOCUS)),
    ]);
    frame.render_widget(Paragraph::new(marker), chunks[2]);

    let point = &trend[index];
    let selected = Line::from(vec![
        Span::styled(point.label.clone(), Style::default().fg(Color::White).bold()),
        Span::raw("  "),
        Span::styled(format!("{} active", point.active), Style::default().fg(ACCENT)),
        Span::raw("  "),
        Span::styled(
            format!("{} engaged", point.engaged),
            Style::default().fg(ENGAGED),
        ),
    ]);
    frame.render_widget(Paragraph::new(selected), chunks[3]);
}

fn render_features(
    frame: &mut Frame,
    app: &mut App,
    features: &[FeatureEngagement],
    engaged_users: u64,
    area: Rect,
) {
    let header = Row::new(
        ["Feature", "Users", "Rate"]
            .into_iter()
            .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow).bold())),
    );

    let rows = features.iter().map(|feature| {
        let rate = feature.rate(engaged_users);
        Row::new([
            Cell::from(feature.display_name),
            Cell::from(format_count(feature.engaged_users)),
            Cell::from(format_percent(rate)).style(Style::default().fg(ACCENT)),
        ])
    });

    let widths = [
        Constraint::Fill(1),    // Feature
        Constraint::Length(7),  // Users
        Constraint::Length(5),  // Rate
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(pane_block("Features", app.focus == FocusPane::Features))
        .row_highlight_style(selection_style(app.focus == FocusPane::Features))
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(table, area, &mut app.feature_state);
}

fn render_roster(frame: &mut Frame, app: &mut App, rows: &[RosterRow], area: Rect) {
    let header_cells = ["User", "Last Active", "Editor", "Team"]
        .into_iter()
        .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow).bold()));
    let header = Row::new(header_cells).height(1);

    let table_rows = rows.iter().map(|row| {
        let recency = Cell::from(Line::from(vec![
            Span::styled("● ", Style::default().fg(recency_color(row.recency.class))),
            Span::raw(row.recency.label()),
        ]));
        Row::new([
            Cell::from(Line::from(vec![
                Span::styled(format!("{:<3}", row.initials), Style::default().fg(DIM)),
                Span::raw(row.login.clone()),
            ])),
            recency,
            Cell::from(row.editor.clone()).style(Style::default().fg(label_color(&row.editor))),
            Cell::from(row.team.clone()).style(Style::default().fg(label_color(&row.team))),
        ])
    });

    let widths = [
        Constraint::Fill(2),    // User
        Constraint::Length(12), // Last Active
        Constraint::Fill(1),    // Editor
        Constraint::Fill(1),    // Team
    ];

    let title = format!("Seats ({})", rows.len());
    let table = Table::new(table_rows, widths)
        .header(header)
        .block(pane_block(&title, app.focus == FocusPane::Roster))
        .row_highlight_style(selection_style(app.focus == FocusPane::Roster))
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(table, area, &mut app.roster_state);
}

fn selection_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .add_modifier(Modifier::REVERSED)
            .fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Cyan)
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints: &[(&str, &str)] = match &app.load {
        LoadState::Loading(_) => &[("q", "quit")],
        LoadState::Failed(_) => &[("r", "retry"), ("q", "quit")],
        LoadState::Ready { .. } if app.drill_down.is_open() => &[
            ("Esc", "close"),
            ("1-4", "cards"),
            ("Enter", "open selected"),
            ("q", "quit"),
        ],
        LoadState::Ready { .. } => &[
            ("1-4", "cards"),
            ("Tab", "focus"),
            ("j/k", "move"),
            ("Enter", "drill down"),
            ("r", "reload"),
            ("q", "quit"),
        ],
    };

    let mut spans = vec![Span::raw(" ")];
    for (key, action) in hints {
        spans.push(Span::styled(*key, Style::default().fg(Color::Yellow).bold()));
        spans.push(Span::styled(format!(" {}  ", action), Style::default().fg(DIM)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// A rectangle of the given percentage size centered in `area`.
fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1])[1]
}
