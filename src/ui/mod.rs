//! UI module for rendering the TUI

mod forms;
mod layout;

use crate::app::App;
use ratatui::{
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let (main_area, status_area) = layout::create_layout(frame.area());

    let block = Block::default()
        .title(" Form ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(main_area);
    frame.render_widget(block, main_area);

    let rows = layout::form_rows(inner, app.form.len());
    for (index, field) in app.form.fields().enumerate() {
        let draft = app.drafts.get(index).map(String::as_str).unwrap_or_default();
        forms::draw_field(frame, rows[index], field, draft, index == app.active_field);
    }

    forms::draw_submit_button(
        frame,
        rows[app.form.len()],
        app.is_submit_active(),
        app.form.is_invalid(),
        app.form.is_submitted(),
    );

    layout::draw_status_bar(frame, status_area, app);
}
