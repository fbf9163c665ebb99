//! Result view: classification, probabilities and next actions

use crate::app::App;
use crate::state::CreditScore;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Draw the classification result
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let Some(result) = &app.state.last_result else {
        return;
    };

    let block = Block::default()
        .title(" Prediction Result ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(score_color(result.score)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // headline
            Constraint::Length(1), // timestamp
            Constraint::Length(1), // spacer
            Constraint::Length(1), // probabilities title
            Constraint::Length(1), // Poor
            Constraint::Length(1), // Standard
            Constraint::Length(1), // Good
            Constraint::Min(0),    // remaining space
            Constraint::Length(1), // help text
        ])
        .margin(1)
        .split(inner);

    let headline = Paragraph::new(Line::from(vec![
        Span::raw("Credit Score: "),
        Span::styled(
            result.score.as_str(),
            Style::default()
                .fg(score_color(result.score))
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    frame.render_widget(headline, chunks[0]);

    let timestamp = Paragraph::new(format!(
        "Classified at {}",
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(timestamp, chunks[1]);

    frame.render_widget(Paragraph::new("Class probabilities:"), chunks[3]);
    for (index, score) in [CreditScore::Poor, CreditScore::Standard, CreditScore::Good]
        .into_iter()
        .enumerate()
    {
        draw_probability(
            frame,
            chunks[4 + index],
            score,
            app.state
                .last_result
                .as_ref()
                .map(|r| r.probabilities.get(score))
                .unwrap_or(0.0),
        );
    }

    let help = Paragraph::new(Line::from(vec![
        Span::styled("n", Style::default().fg(Color::Cyan)),
        Span::raw(": new application  "),
        Span::styled("m", Style::default().fg(Color::Cyan)),
        Span::raw(": model info  "),
        Span::styled("q", Style::default().fg(Color::Cyan)),
        Span::raw(": quit"),
    ]))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[8]);
}

fn draw_probability(frame: &mut Frame, area: Rect, score: CreditScore, probability: f64) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(10), Constraint::Min(10)])
        .split(area);

    frame.render_widget(Paragraph::new(score.as_str()), chunks[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(score_color(score)).bg(Color::DarkGray))
        .ratio(probability.clamp(0.0, 1.0))
        .label(format!("{:.1}%", probability * 100.0));
    frame.render_widget(gauge, chunks[1]);
}

fn score_color(score: CreditScore) -> Color {
    match score {
        CreditScore::Poor => Color::Red,
        CreditScore::Standard => Color::Yellow,
        CreditScore::Good => Color::Green,
    }
}
