//! Layout components (form area, status bar)

use super::forms::{BUTTON_HEIGHT, FIELD_HEIGHT};
use crate::app::App;
use crate::platform::SUBMIT_SHORTCUT;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Split the screen into content and a one-line status bar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    (chunks[0], chunks[1])
}

/// One row per field, then the submit button
pub fn form_rows(area: Rect, field_count: usize) -> Vec<Rect> {
    let mut constraints: Vec<Constraint> = (0..field_count)
        .map(|_| Constraint::Length(FIELD_HEIGHT))
        .collect();
    constraints.push(Constraint::Length(BUTTON_HEIGHT));
    constraints.push(Constraint::Min(0));

    Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area)
        .to_vec()
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];

    let form = &app.form;
    spans.push(if form.is_invalid() {
        Span::styled(" ● invalid ", Style::default().fg(Color::Red))
    } else {
        Span::styled(" ● valid ", Style::default().fg(Color::Green))
    });
    if form.is_dirty() {
        spans.push(Span::styled("modified ", Style::default().fg(Color::Yellow)));
    }

    spans.push(Span::styled(
        format!("Tab:next  {SUBMIT_SHORTCUT}:submit  Esc:quit"),
        Style::default().fg(Color::Gray),
    ));

    if let Some(msg) = &app.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Cyan)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);
}
