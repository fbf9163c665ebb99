//! Model info view: read-only metadata about the classifier

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Draw the model metadata panel
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Model ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .margin(1)
        .split(inner);

    let content = match &app.state.model_info {
        Some(info) => {
            let mut lines = vec![
                detail_line("Name", info.name.clone()),
                detail_line("Version", info.version.clone()),
                detail_line("Accuracy", format!("{:.1}%", info.accuracy * 100.0)),
                detail_line("Features", info.feature_count.to_string()),
                detail_line("Classes", info.target_classes.join(", ")),
            ];
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Metadata is informational; it plays no part in form validation.",
                Style::default().fg(Color::DarkGray),
            )));
            lines
        }
        None => vec![Line::from(Span::styled(
            "Model information is not available.",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    frame.render_widget(Paragraph::new(content), chunks[0]);

    let help = Paragraph::new(Line::from(vec![
        Span::styled("Esc", Style::default().fg(Color::Cyan)),
        Span::raw(": back"),
    ]))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[1]);
}

fn detail_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label:>10}: "),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(value),
    ])
}
