//! Key mapping from crossterm to [`KeyInput`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::KeyInput;

/// Convert a terminal key event into an app key.
///
/// Only presses count. Ctrl-C quits like Esc. Keys the app has no use for
/// map to `None`.
pub fn convert(event: KeyEvent) -> Option<KeyInput> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c' | 'd') => Some(KeyInput::Esc),
            _ => None,
        };
    }

    match event.code {
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        KeyCode::Delete => Some(KeyInput::Delete),
        KeyCode::Esc => Some(KeyInput::Esc),
        KeyCode::Left => Some(KeyInput::Left),
        KeyCode::Right => Some(KeyInput::Right),
        KeyCode::Up | KeyCode::PageUp => Some(KeyInput::Up),
        KeyCode::Down | KeyCode::PageDown => Some(KeyInput::Down),
        KeyCode::Home => Some(KeyInput::Home),
        KeyCode::End => Some(KeyInput::End),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn printable_keys_become_chars() {
        assert_eq!(convert(press(KeyCode::Char('é'))), Some(KeyInput::Char('é')));
        assert_eq!(
            convert(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(KeyInput::Char('A'))
        );
    }

    #[test]
    fn editing_and_navigation() {
        assert_eq!(convert(press(KeyCode::Enter)), Some(KeyInput::Enter));
        assert_eq!(convert(press(KeyCode::Backspace)), Some(KeyInput::Backspace));
        assert_eq!(convert(press(KeyCode::PageUp)), Some(KeyInput::Up));
        assert_eq!(convert(press(KeyCode::End)), Some(KeyInput::End));
    }

    #[test]
    fn ctrl_c_quits() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(convert(event), Some(KeyInput::Esc));

        let event = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(convert(event), None);
    }

    #[test]
    fn releases_and_unknown_keys_are_ignored() {
        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert_eq!(convert(release), None);
        assert_eq!(convert(press(KeyCode::F(1))), None);
        assert_eq!(convert(press(KeyCode::Tab)), None);
    }
}
