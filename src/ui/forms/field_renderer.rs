//! Field rendering utilities for the wizard form

use crate::state::{FieldKind, FormField, ValidationState};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows a field occupies: bordered input plus the inline message line
pub const FIELD_HEIGHT: u16 = 4;

/// Draw a form field with its inline error line
pub fn draw_field(frame: &mut Frame, area: Rect, field: &FormField, is_active: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    draw_input(frame, chunks[0], field, is_active);
    draw_message(frame, chunks[1], field);
}

fn draw_input(frame: &mut Frame, area: Rect, field: &FormField, is_active: bool) {
    let border_style = if is_active {
        Style::default().fg(Color::Cyan)
    } else if field.validation == ValidationState::Invalid {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let value = field.display_value();
    let content = if matches!(field.kind, FieldKind::Select { .. }) {
        draw_select_line(value, is_active)
    } else if value.is_empty() && !is_active {
        Line::from(Span::styled(
            field.placeholder,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let style = if is_active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let cursor = if is_active { "▌" } else { "" };
        Line::from(vec![
            Span::styled(value.to_string(), style),
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
        ])
    };

    let block = Block::default()
        .title(format!(" {} ", field.label))
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn draw_select_line(value: &str, is_active: bool) -> Line<'_> {
    let display = if value.is_empty() {
        "Select an option"
    } else {
        value
    };
    let style = if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    if is_active {
        Line::from(vec![
            Span::styled("◂ ", Style::default().fg(Color::Cyan)),
            Span::styled(display, style),
            Span::styled(" ▸", Style::default().fg(Color::Cyan)),
        ])
    } else {
        Line::from(Span::styled(display, style))
    }
}

// One message element per invalid field; it disappears as soon as the
// field turns valid or is cleared.
fn draw_message(frame: &mut Frame, area: Rect, field: &FormField) {
    if let Some(error) = &field.error {
        let message = Paragraph::new(Line::from(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        )));
        frame.render_widget(message, area);
    }
}
