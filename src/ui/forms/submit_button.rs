//! Submit button for the form view

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

/// Render the submit button.
///
/// The label turns red while any field holds an error and green once the
/// form has been submitted.
pub fn draw_submit_button(
    frame: &mut Frame,
    area: Rect,
    is_selected: bool,
    is_invalid: bool,
    is_submitted: bool,
) {
    let (label, color) = if is_invalid {
        ("Submit (fix errors first)", Color::LightRed)
    } else if is_submitted {
        ("Submitted ✓", Color::Green)
    } else {
        ("Submit", Color::White)
    };

    let mut text_style = Style::default().fg(color);
    if is_selected {
        text_style = text_style.add_modifier(Modifier::BOLD);
    }

    let border_style = if is_selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let paragraph = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(text_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        );

    frame.render_widget(paragraph, area);
}
