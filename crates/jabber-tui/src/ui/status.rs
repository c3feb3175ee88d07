//! Status bar
//!
//! Displays the session phase, server and the latest status message.

use jabber_client::Phase;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::App;

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let phase = match app.phase() {
        Phase::Disconnected => Span::styled("Disconnected", Style::default().fg(Color::Red)),
        Phase::Connecting => Span::styled("Connecting...", Style::default().fg(Color::Yellow)),
        Phase::Connected => Span::styled(
            "Connected",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let mut spans = vec![
        Span::raw(" "),
        phase,
        Span::styled(format!(" | {}", app.server_url()), Style::default().fg(Color::Gray)),
    ];
    if let Some(message) = app.status_message() {
        spans.push(Span::raw(format!(" | {message}")));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
