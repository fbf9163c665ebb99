//! Wizard form rendering: step indicator, progress, fields and buttons

use super::field_renderer::{draw_field, FIELD_HEIGHT};
use crate::app::App;
use crate::state::StepIndicator;
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Draw the multi-step application form
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.state.form;
    let field_count = form.current_step_def().field_names.len() as u16;

    let block = Block::default()
        .title(" Credit Score Application ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                          // step indicator
            Constraint::Length(1),                          // progress gauge
            Constraint::Length(1),                          // spacer
            Constraint::Length(field_count * FIELD_HEIGHT), // fields
            Constraint::Length(BUTTON_HEIGHT),              // buttons row
            Constraint::Min(0),                             // remaining space
            Constraint::Length(1),                          // help text
        ])
        .split(inner);

    draw_step_indicator(frame, chunks[0], app);
    draw_progress(frame, chunks[1], app);
    draw_fields(frame, chunks[3], app);
    draw_buttons(frame, chunks[4], app);
    draw_help(frame, chunks[6], app);
}

fn draw_step_indicator(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.state.form;
    let mut spans = Vec::new();
    for step in form.steps() {
        let (marker, style) = match form.step_indicator(step.index) {
            StepIndicator::Completed => ("✓", Style::default().fg(Color::Green)),
            StepIndicator::Active => (
                "●",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            StepIndicator::Upcoming => ("○", Style::default().fg(Color::DarkGray)),
        };
        spans.push(Span::styled(format!(" {marker} {} ", step.title), style));
        if step.index < form.step_count() {
            spans.push(Span::styled("─", Style::default().fg(Color::DarkGray)));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_progress(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.state.form;
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .ratio(form.progress())
        .label(format!("Step {} of {}", form.current_step(), form.step_count()));
    frame.render_widget(gauge, area);
}

fn draw_fields(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.state.form;
    let fields = form.step_fields(form.current_step());

    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(FIELD_HEIGHT))
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (position, field) in fields.iter().enumerate() {
        let is_active = !form.on_buttons_row() && form.active_position() == position;
        draw_field(frame, chunks[position], field, is_active);
    }
}

fn draw_buttons(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.state.form;
    let on_buttons = form.on_buttons_row();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Min(0),
        ])
        .split(area);

    render_button(
        frame,
        chunks[0],
        "Back",
        on_buttons && form.selected_button == 0,
        form.current_step() > 1,
        Some(Color::Gray),
    );

    // The last step swaps Next for the submit affordance.
    let submit_label = if app.state.is_submitting {
        "Predicting…"
    } else if form.is_last_step() {
        "Submit"
    } else {
        "Next"
    };
    render_button(
        frame,
        chunks[1],
        submit_label,
        on_buttons && form.selected_button == 1,
        !app.state.is_submitting,
        Some(Color::Green),
    );
}

fn draw_help(frame: &mut Frame, area: Rect, app: &App) {
    let action = if app.state.form.is_last_step() {
        "submit"
    } else {
        "next step"
    };
    let help = Paragraph::new(Line::from(vec![
        Span::styled("Tab", Style::default().fg(Color::Cyan)),
        Span::raw(": next field  "),
        Span::styled("↑/↓", Style::default().fg(Color::Cyan)),
        Span::raw(": choose option  "),
        Span::styled("Enter", Style::default().fg(Color::Cyan)),
        Span::raw(format!(": {action} (on buttons)  ")),
        Span::styled("Ctrl+S", Style::default().fg(Color::Cyan)),
        Span::raw(": save draft  "),
        Span::styled("F1", Style::default().fg(Color::Cyan)),
        Span::raw(": model info"),
    ]))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}
