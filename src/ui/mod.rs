//! UI module for rendering the TUI

mod components;
mod forms;
mod model_panel;
mod result;

use crate::app::App;
use crate::state::{NoticeLevel, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    // Draw main content based on current view
    match &app.state.current_view {
        View::Form => forms::draw(frame, chunks[0], app),
        View::Result => result::draw(frame, chunks[0], app),
        View::ModelInfo => model_panel::draw(frame, chunks[0], app),
    }

    draw_status_bar(frame, chunks[1], app);
}

// The status bar is the notification surface: announcements, aggregate
// validation counts and transport errors all land here.
fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let (text, style) = if app.state.is_submitting {
        (
            "Predicting…".to_string(),
            Style::default().fg(Color::Yellow),
        )
    } else if let Some(notice) = &app.state.notice {
        let style = match notice.level {
            NoticeLevel::Info => Style::default().fg(Color::Cyan),
            NoticeLevel::Error => Style::default().fg(Color::Red),
        };
        (notice.text.clone(), style)
    } else if app.state.current_view == View::Form {
        (
            app.state.form.announcement(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (String::new(), Style::default())
    };

    frame.render_widget(Paragraph::new(format!(" {text}")).style(style), area);
}
