//! Field rendering utilities for forms

use form_store::{FieldStore, ValueKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Rows taken by one field: bordered input plus a message line
pub const FIELD_HEIGHT: u16 = 4;

/// Draw a form field with its error and suggestion line
pub fn draw_field(frame: &mut Frame, area: Rect, field: &FieldStore, draft: &str, is_active: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    let style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let border_style = if field.error().is_some() {
        Style::default().fg(Color::LightRed)
    } else {
        style
    };

    let display_value = display_value(field, draft, is_active);
    let cursor = if is_active && field.kind() != ValueKind::Bool {
        "▌"
    } else {
        ""
    };

    let content = Paragraph::new(Line::from(vec![
        Span::styled(display_value, style),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ]));

    let dirty_marker = if field.is_dirty() { "*" } else { "" };
    let block = Block::default()
        .title(format!(" {}{} ", field.name(), dirty_marker))
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(content.wrap(Wrap { trim: false }).block(block), chunks[0]);
    frame.render_widget(Paragraph::new(message_line(field)), chunks[1]);
}

fn display_value(field: &FieldStore, draft: &str, is_active: bool) -> String {
    match field.kind() {
        ValueKind::Bool => {
            let mark = if field.value().coerce_bool() { "x" } else { " " };
            format!("[{mark}]")
        }
        _ if draft.is_empty() && !is_active => "(empty)".to_string(),
        _ if is_active => draft.to_string(),
        _ => field.formatted_value().coerce_string(),
    }
}

/// Error text plus the suggested correction, if any
fn message_line(field: &FieldStore) -> Line<'static> {
    let mut spans = Vec::new();
    if let Some(error) = field.error() {
        spans.push(Span::styled(
            format!(" {error}"),
            Style::default().fg(Color::LightRed),
        ));
    }
    if let Some(closest) = field.closest_valid_value() {
        spans.push(Span::styled(
            format!("  try: {closest} (^F)"),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}
