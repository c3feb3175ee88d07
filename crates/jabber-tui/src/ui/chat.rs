//! Message pane
//!
//! Displays the conversation, one message per row, and the typing line
//! beneath it.

use std::ops::Range;

use jabber_client::Message;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::App;

const BORDER_SIZE: u16 = 2;
const READ_MARKER: &str = "✓";

/// Render the message pane and return the ids it shows.
pub fn render(frame: &mut Frame, app: &App, area: Rect) -> Vec<String> {
    let snapshot = app.snapshot();
    let title = if app.scroll() > 0 {
        format!(" Messages (+{} below) ", app.scroll())
    } else {
        " Messages ".to_string()
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if snapshot.messages.is_empty() {
        let hint = if snapshot.is_connected() { "No messages yet" } else { "Not connected" };
        let placeholder =
            ListItem::new(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))));
        frame.render_widget(List::new(vec![placeholder]).block(block), area);
        return Vec::new();
    }

    let rows = usize::from(area.height.saturating_sub(BORDER_SIZE));
    let shown = window(snapshot.messages.len(), app.scroll(), rows);
    let messages = &snapshot.messages[shown];

    let items: Vec<ListItem> = messages
        .iter()
        .map(|message| ListItem::new(message_line(message, snapshot.is_own(message))))
        .collect();
    frame.render_widget(List::new(items).block(block), area);

    messages.iter().map(|message| message.id.clone()).collect()
}

/// Render the aggregate typing line.
pub fn render_typing(frame: &mut Frame, app: &App, area: Rect) {
    let text = app.snapshot().typing_line().unwrap_or_default();
    let paragraph = Paragraph::new(format!(" {text}"))
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC));
    frame.render_widget(paragraph, area);
}

/// Messages that fit in `rows`, ending `scroll` messages above the newest.
fn window(len: usize, scroll: usize, rows: usize) -> Range<usize> {
    let end = len.saturating_sub(scroll);
    end.saturating_sub(rows)..end
}

fn message_line(message: &Message, own: bool) -> Line<'static> {
    let time = Span::styled(format!("[{}] ", message.timestamp), Style::default().fg(Color::DarkGray));

    if message.is_system() {
        return Line::from(vec![
            time,
            Span::styled(
                format!("* {}", message.text),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ]);
    }

    let sender_style = if own { Color::Cyan } else { Color::Green };
    let mut spans = vec![
        time,
        Span::styled(
            format!("{}:", message.sender),
            Style::default().fg(sender_style).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {}", message.text)),
    ];

    if !message.read_by.is_empty() {
        let readers: Vec<&str> = message.read_by.iter().map(String::as_str).collect();
        spans.push(Span::styled(
            format!("  {READ_MARKER} {}", readers.join(", ")),
            Style::default().fg(Color::Blue),
        ));
    }

    Line::from(spans)
}
