//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod chat;
mod input;
mod status;
mod users;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::App;

/// Render the entire UI.
///
/// Returns the ids of the messages left on screen.
pub fn render(frame: &mut Frame, app: &App) -> Vec<String> {
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const TYPING_HEIGHT: u16 = 1;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(TYPING_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, typing_area, input_area, status_area] = chunks.as_ref() else {
        return Vec::new();
    };

    let visible = render_main_area(frame, app, *main_area);
    chat::render_typing(frame, app, *typing_area);
    input::render(frame, app, *input_area);
    status::render(frame, app, *status_area);
    visible
}

/// Render the main area (messages + users sidebar).
fn render_main_area(frame: &mut Frame, app: &App, area: Rect) -> Vec<String> {
    const CHAT_AREA_MIN_WIDTH: u16 = 20;
    const USER_SIDEBAR_WIDTH: u16 = 18;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(CHAT_AREA_MIN_WIDTH), Constraint::Length(USER_SIDEBAR_WIDTH)])
        .split(area);

    let [chat_area, users_area] = chunks.as_ref() else {
        return Vec::new();
    };

    users::render(frame, app, *users_area);
    chat::render(frame, app, *chat_area)
}

#[cfg(test)]
pub(crate) mod testing {
    use ratatui::{Terminal, backend::TestBackend};

    use crate::App;

    /// Draw `app` on a `cols`x`rows` test terminal and return the screen
    /// lines plus the visible ids.
    pub(crate) fn draw(app: &App, cols: u16, rows: u16) -> (Vec<String>, Vec<String>) {
        let mut terminal = Terminal::new(TestBackend::new(cols, rows)).unwrap();
        let mut visible = Vec::new();
        terminal.draw(|frame| visible = super::render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        let lines = buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
            .collect();
        (lines, visible)
    }
}
