//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a two-row split: the current-data panel on top and a
//!   one-line status bar at the bottom.
//! * Colours and styles are defined inline.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::cache::Config;

/// Width of the label column in the data panel.
const LABEL_WIDTH: usize = 16;

/// Draw the complete UI for one frame.
pub fn draw(app: &App, frame: &mut Frame) {
    let [main_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    draw_current_data(app, frame, main_area);
    draw_status_bar(app, frame, status_area);
}

/// Human-readable last-check time, or `Never`.
pub fn format_last_checked(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%B %-d, %Y, %-I:%M:%S %P").to_string())
        .unwrap_or_else(|| "Never".into())
}

/// How the fallback setting reads to a person.
pub fn describe_fallback(config: &Config) -> String {
    match &config.fallback_text {
        Some(text) => format!("show {text:?}"),
        None => "keep last count".into(),
    }
}

fn row<'a>(label: &'a str, value: Span<'a>) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{label:<LABEL_WIDTH$}"),
            Style::default().fg(Color::DarkGray),
        ),
        value,
    ])
}

/// Render the count, settings and generated API URI.
fn draw_current_data(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Feed count ").borders(Borders::ALL);

    let Some(snapshot) = &app.snapshot else {
        let waiting = Paragraph::new("Waiting for first check…").block(block);
        frame.render_widget(waiting, area);
        return;
    };

    let config = &snapshot.config;
    let lines = vec![
        row(
            "Count",
            Span::styled(
                snapshot.display_value.as_str(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ),
        row(
            "Last checked",
            Span::raw(format_last_checked(snapshot.last_checked_at)),
        ),
        row(
            "Check every",
            Span::raw(config.refresh_interval.as_deref().unwrap_or("(every time)")),
        ),
        row(
            "Average over",
            Span::raw(config.average_window.as_deref().unwrap_or("off")),
        ),
        row("If unavailable", Span::raw(describe_fallback(config))),
        Line::default(),
        row(
            "API URI",
            Span::styled(snapshot.request_uri.as_str(), Style::default().fg(Color::Cyan)),
        ),
    ];

    let panel = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  q: quit  r: update now"),
    ]));
    frame.render_widget(status, area);
}
