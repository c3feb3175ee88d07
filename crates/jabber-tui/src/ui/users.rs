//! Users sidebar
//!
//! Displays who is online, marking the local user.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use crate::App;

const SELF_SUFFIX: &str = " (you)";

/// Render the users sidebar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.snapshot();
    let local = snapshot.local_identity.as_deref();

    let items: Vec<ListItem> = snapshot
        .presence
        .iter()
        .map(|user| {
            let typing = snapshot.typing.iter().any(|peer| peer == user);
            if Some(user.as_str()) == local {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        user.clone(),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(SELF_SUFFIX),
                ]))
            } else if typing {
                ListItem::new(Line::from(vec![
                    Span::raw(user.clone()),
                    Span::styled(" ...", Style::default().fg(Color::DarkGray)),
                ]))
            } else {
                ListItem::new(Line::from(user.clone()))
            }
        })
        .collect();

    let title = format!(" Online ({}) ", snapshot.presence.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(list, area);
}
