//! Drill-down panel rendering.

use copilens_core::analytics::{
    ActiveUsersDetail, AdoptionDetail, DistributionEntry, EngagedUsersDetail, FeatureDetail,
    FeatureEngagement, SeatsOverview, SeriesPoint, TrendDetail, UserDetail,
};
use copilens_core::format::{
    format_count, format_long_date, format_percent, format_timestamp,
};
use copilens_core::{DetailView, EditorUsage, FeatureKey};
use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use super::{
    label_color, level_color, recency_color, ACCENT, BORDER_DETAIL, DIM, ENGAGED, LABEL_COLOR,
};

/// Width of distribution and feature bars, in cells.
const BAR_WIDTH: usize = 24;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the open drill-down as a bordered panel.
pub fn render_panel(frame: &mut Frame, title: &str, detail: &DetailView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_DETAIL))
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(BORDER_DETAIL).bold())
        .title_bottom(Line::from(" Esc to close ").right_aligned());

    let paragraph = Paragraph::new(detail_lines(detail))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Lines for a resolved drill-down.
pub fn detail_lines(detail: &DetailView) -> Vec<Line<'static>> {
    match detail {
        DetailView::Closed => Vec::new(),
        DetailView::Seats(seats) => seats_lines(seats),
        DetailView::ActiveUsers(active) => active_users_lines(active),
        DetailView::EngagedUsers(engaged) => engaged_users_lines(engaged),
        DetailView::Adoption(adoption) => adoption_lines(adoption),
        DetailView::Trend(trend) => trend_lines(trend),
        DetailView::Feature(feature) => feature_lines(feature),
        DetailView::User { user_id, detail } => match detail {
            Some(user) => user_lines(user),
            None => vec![
                Line::raw(""),
                Line::from(Span::styled(
                    format!("User {} is not on the seat roster.", user_id),
                    Style::default().fg(DIM),
                )),
            ],
        },
    }
}

fn seats_lines(seats: &SeatsOverview) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            field("Total"),
            value(format_count(seats.total_seats)),
            field("   Assigned"),
            value(format_count(seats.assigned_seats)),
            field("   Unassigned"),
            value(format_count(seats.unassigned_seats)),
        ]),
        Line::raw(""),
    ];
    lines.extend(distribution_lines("By Team", &seats.by_team, true));
    lines.push(Line::raw(""));
    lines.extend(distribution_lines("By Editor", &seats.by_editor, true));
    lines.push(Line::raw(""));
    lines.extend(distribution_lines("By Last Activity", &seats.by_activity, false));
    lines
}

fn active_users_lines(active: &ActiveUsersDetail) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            field(format!("{}-day average", active.average_days)),
            value(format_count(active.average_active)),
            field("   Peak"),
            value(format_count(active.peak_active)),
        ]),
        Line::raw(""),
        section("Daily Active Users"),
    ];
    lines.extend(series_lines(&active.series, ACCENT));
    lines.push(Line::raw(""));
    lines.extend(distribution_lines("Seats by Editor", &active.by_editor, true));
    lines
}

fn engaged_users_lines(engaged: &EngagedUsersDetail) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            field("Engaged users"),
            value(format_count(engaged.engaged_users)),
        ]),
        Line::raw(""),
        section("By Feature"),
    ];
    lines.extend(feature_bars(&engaged.features, engaged.engaged_users));
    lines.push(Line::raw(""));
    lines.push(section("Feature Trend"));

    let header = FeatureKey::ALL
        .iter()
        .map(|key| format!("{:>17}", key.display_name()))
        .collect::<String>();
    lines.push(Line::from(Span::styled(
        format!("{:<8}{}", "", header),
        Style::default().fg(DIM),
    )));
    for point in &engaged.trend {
        let counts = FeatureKey::ALL
            .iter()
            .map(|key| format!("{:>17}", format_count(point.feature(*key))))
            .collect::<String>();
        lines.push(Line::from(vec![
            Span::styled(format!("{:<8}", point.label), Style::default().fg(LABEL_COLOR)),
            Span::raw(counts),
        ]));
    }
    lines
}

fn adoption_lines(adoption: &AdoptionDetail) -> Vec<Line<'static>> {
    let color = level_color(adoption.status.level);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format_percent(adoption.status.ratio),
                Style::default().fg(color).bold(),
            ),
            Span::raw("  "),
            Span::styled(adoption.status.level.label(), Style::default().fg(color)),
        ]),
        Line::from(Span::styled(
            format!(
                "{} active users of {} seats",
                format_count(adoption.active_users),
                format_count(adoption.total_seats)
            ),
            Style::default().fg(DIM),
        )),
        Line::raw(""),
        section("Adoption Bands"),
    ];
    for band in &adoption.bands {
        let marker = if band.current { "▶ " } else { "  " };
        let style = if band.current {
            Style::default().fg(level_color(band.level)).bold()
        } else {
            Style::default().fg(DIM)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(format!("{:<15}", band.level.label()), style),
            Span::styled(band.range, style),
        ]));
    }
    lines
}

fn trend_lines(trend: &TrendDetail) -> Vec<Line<'static>> {
    let Some(day) = &trend.day else {
        return vec![
            Line::raw(""),
            Line::from(Span::styled(
                format!("No metrics recorded for {}.", format_long_date(trend.date)),
                Style::default().fg(DIM),
            )),
        ];
    };

    let mut lines = vec![
        Line::from(vec![
            field("Active"),
            value(format_count(day.active_users)),
            field("   Engaged"),
            value(format_count(day.engaged_users)),
        ]),
        Line::raw(""),
        section("Features"),
    ];
    lines.extend(feature_bars(&day.features, day.engaged_users));
    if !day.completion_editors.is_empty() {
        lines.push(Line::raw(""));
        lines.push(section("Code Completions by Editor"));
        lines.extend(editor_lines(&day.completion_editors));
    }
    lines
}

fn feature_lines(feature: &FeatureDetail) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            field("Engaged users"),
            value(format_count(feature.engaged_users)),
            field("   Share of engaged"),
            value(format_percent(feature.rate)),
        ]),
        Line::raw(""),
        section("Daily Users"),
    ];
    lines.extend(series_lines(&feature.series, ENGAGED));
    lines.push(Line::raw(""));
    lines.push(section("By Editor"));
    if feature.editors.is_empty() {
        lines.push(Line::from(Span::styled(
            "No editor breakdown reported",
            Style::default().fg(DIM),
        )));
    } else {
        lines.extend(editor_lines(&feature.editors));
    }
    lines
}

fn user_lines(user: &UserDetail) -> Vec<Line<'static>> {
    let row = &user.row;
    vec![
        Line::from(vec![
            Span::styled(
                format!("{}  ", row.initials),
                Style::default().fg(Color::Black).bg(label_color(&row.login)),
            ),
            Span::raw(" "),
            Span::styled(row.login.clone(), Style::default().fg(Color::White).bold()),
            Span::styled(format!("  #{}", row.user_id), Style::default().fg(DIM)),
        ]),
        Line::raw(""),
        Line::from(vec![
            field("Team"),
            Span::styled(row.team.clone(), Style::default().fg(label_color(&row.team))),
        ]),
        Line::from(vec![
            field("Editor"),
            Span::styled(row.editor.clone(), Style::default().fg(label_color(&row.editor))),
            Span::styled(
                user.last_activity_editor
                    .as_ref()
                    .map(|raw| format!("  ({})", raw))
                    .unwrap_or_default(),
                Style::default().fg(DIM),
            ),
        ]),
        Line::from(vec![
            field("Last active"),
            Span::styled(
                row.recency.label(),
                Style::default().fg(recency_color(row.recency.class)),
            ),
            Span::styled(
                format!("  {}", user.last_active),
                Style::default().fg(DIM),
            ),
        ]),
        Line::from(vec![
            field("Seat assigned"),
            Span::raw(format_timestamp(user.created_at)),
        ]),
    ]
}

fn field(label: impl Into<String>) -> Span<'static> {
    Span::styled(format!("{}: ", label.into()), Style::default().fg(LABEL_COLOR))
}

fn value(text: String) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::White).bold())
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(Color::Yellow).bold(),
    ))
}

/// Horizontal bars for a distribution, scaled to its largest entry.
fn distribution_lines(title: &str, entries: &[DistributionEntry], keyed: bool) -> Vec<Line<'static>> {
    let mut lines = vec![section(title)];
    if entries.is_empty() {
        lines.push(Line::from(Span::styled("No seats", Style::default().fg(DIM))));
        return lines;
    }

    let max = entries.iter().map(|e| e.count).max().unwrap_or(0);
    for entry in entries {
        let color = if keyed {
            label_color(&entry.label)
        } else {
            ACCENT
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{:<16}", truncate(&entry.label, 15))),
            Span::styled(bar(entry.count, max), Style::default().fg(color)),
            Span::raw(format!(" {}", format_count(entry.count))),
        ]));
    }
    lines
}

fn feature_bars(features: &[FeatureEngagement], engaged_users: u64) -> Vec<Line<'static>> {
    features
        .iter()
        .map(|feature| {
            let rate = feature.rate(engaged_users);
            Line::from(vec![
                Span::raw(format!("{:<18}", feature.display_name)),
                Span::styled(bar(rate.min(100) as u64, 100), Style::default().fg(ENGAGED)),
                Span::raw(format!(
                    " {} ({})",
                    format_count(feature.engaged_users),
                    format_percent(rate)
                )),
            ])
        })
        .collect()
}

fn editor_lines(editors: &[EditorUsage]) -> Vec<Line<'static>> {
    let max = editors
        .iter()
        .map(|e| e.total_engaged_users)
        .max()
        .unwrap_or(0);
    editors
        .iter()
        .map(|editor| {
            Line::from(vec![
                Span::raw(format!("{:<16}", truncate(&editor.name, 15))),
                Span::styled(
                    bar(editor.total_engaged_users, max),
                    Style::default().fg(label_color(&editor.name)),
                ),
                Span::raw(format!(" {}", format_count(editor.total_engaged_users))),
            ])
        })
        .collect()
}

/// Sparkline text plus first/last labels.
fn series_lines(series: &[SeriesPoint], color: Color) -> Vec<Line<'static>> {
    if series.is_empty() {
        return vec![Line::from(Span::styled(
            "No daily metrics",
            Style::default().fg(DIM),
        ))];
    }
    let values: Vec<u64> = series.iter().map(|p| p.value).collect();
    let first = &series[0].label;
    let last = &series[series.len() - 1].label;
    vec![
        Line::from(Span::styled(spark_text(&values), Style::default().fg(color))),
        Line::from(Span::styled(
            format!("{} … {}", first, last),
            Style::default().fg(DIM),
        )),
    ]
}

/// One block character per value, scaled to the maximum.
fn spark_text(values: &[u64]) -> String {
    let max = values.iter().copied().max().unwrap_or(0);
    values
        .iter()
        .map(|&v| {
            if max == 0 {
                SPARK_LEVELS[0]
            } else {
                let idx = (v * (SPARK_LEVELS.len() as u64 - 1)) / max;
                SPARK_LEVELS[idx as usize]
            }
        })
        .collect()
}

fn bar(count: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = ((count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.clamp(usize::from(count > 0), BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spark_text() {
        assert_eq!(spark_text(&[0, 7, 14]), "▁▄█");
        assert_eq!(spark_text(&[0, 0]), "▁▁");
        assert_eq!(spark_text(&[]), "");
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(0, 0), "");
        assert_eq!(bar(10, 10).chars().filter(|c| *c == '█').count(), BAR_WIDTH);
        // Non-zero counts always show at least one cell
        assert_eq!(bar(1, 1000).chars().filter(|c| *c == '█').count(), 1);
        assert_eq!(bar(0, 10).chars().filter(|c| *c == '█').count(), 0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("vscode", 15), "vscode");
        assert_eq!(truncate("a-very-long-team-name", 8), "a-very-…");
    }

    #[test]
    fn test_missing_user_message() {
        let lines = detail_lines(&DetailView::User {
            user_id: 77,
            detail: None,
        });
        let text: String = lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect();
        assert!(text.contains("not on the seat roster"));
    }
}
