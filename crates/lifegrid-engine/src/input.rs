//! Keyboard and mouse input for the terminal front end.
//!
//! A background task reads crossterm events and forwards the ones that mean
//! something as [`Command`]s. The task ends when the terminal event stream
//! fails or the session drops its receiver; dropping the last sender is how
//! the session learns input has gone away.

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEventKind,
};
use futures::StreamExt;
use lifegrid_core::control::Command;
use lifegrid_types::PatternName;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::terminal::Layout;

/// Translate one terminal event into a command.
pub fn map_event(event: &Event, layout: Layout) -> Option<Command> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                layout.cell_at(mouse.column, mouse.row).map(Command::Toggle)
            }
            _ => None,
        },
        _ => None,
    }
}

fn map_key(key: &KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(Command::Quit);
    }
    match key.code {
        KeyCode::Char(' ') => Some(Command::ToggleRunning),
        KeyCode::Char('s') => Some(Command::Start { speed: None }),
        KeyCode::Char('p') => Some(Command::Stop),
        KeyCode::Char('n' | '.') => Some(Command::Step),
        KeyCode::Char('r') => Some(Command::Reset),
        KeyCode::Char('+' | '=') => Some(Command::Faster),
        KeyCode::Char('-' | '_') => Some(Command::Slower),
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char(digit) => digit
            .to_digit(10)
            .and_then(|d| usize::try_from(d).ok())
            .and_then(PatternName::from_ordinal)
            .map(Command::SelectPattern),
        _ => None,
    }
}

/// Spawn the input task feeding `commands`.
pub fn spawn(commands: mpsc::Sender<Command>, layout: Layout) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = EventStream::new();
        while let Some(next) = events.next().await {
            let event = match next {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "Terminal input failed");
                    break;
                }
            };
            let Some(command) = map_event(&event, layout) else {
                continue;
            };
            debug!(?command, "Input command");
            if commands.send(command).await.is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use crossterm::event::MouseEvent;
    use lifegrid_types::CellCoord;

    use super::*;
    use crate::terminal::BOARD_TOP;

    fn layout() -> Layout {
        Layout::new(40, 50)
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn keys_map_to_commands() {
        let cases = [
            (KeyCode::Char(' '), Command::ToggleRunning),
            (KeyCode::Char('s'), Command::Start { speed: None }),
            (KeyCode::Char('p'), Command::Stop),
            (KeyCode::Char('n'), Command::Step),
            (KeyCode::Char('.'), Command::Step),
            (KeyCode::Char('r'), Command::Reset),
            (KeyCode::Char('+'), Command::Faster),
            (KeyCode::Char('-'), Command::Slower),
            (KeyCode::Char('q'), Command::Quit),
            (KeyCode::Esc, Command::Quit),
        ];
        for (code, expected) in cases {
            assert_eq!(map_event(&press(code), layout()), Some(expected), "{code:?}");
        }
    }

    #[test]
    fn digits_select_patterns() {
        assert_eq!(
            map_event(&press(KeyCode::Char('1')), layout()),
            Some(Command::SelectPattern(PatternName::Blank))
        );
        assert_eq!(
            map_event(&press(KeyCode::Char('3')), layout()),
            Some(Command::SelectPattern(PatternName::GliderGun))
        );
        assert_eq!(map_event(&press(KeyCode::Char('0')), layout()), None);
        assert_eq!(map_event(&press(KeyCode::Char('5')), layout()), None);
    }

    #[test]
    fn ctrl_c_quits_and_other_chords_are_ignored() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_event(&ctrl_c, layout()), Some(Command::Quit));
        let ctrl_r = Event::Key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert_eq!(map_event(&ctrl_r, layout()), None);
    }

    #[test]
    fn key_release_is_ignored() {
        let mut key = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(map_event(&Event::Key(key), layout()), None);
    }

    #[test]
    fn left_click_toggles_the_cell_under_it() {
        let event = click(MouseEventKind::Down(MouseButton::Left), 9, BOARD_TOP + 2);
        assert_eq!(
            map_event(&event, layout()),
            Some(Command::Toggle(CellCoord::new(2, 4)))
        );
    }

    #[test]
    fn other_mouse_events_are_ignored() {
        let right = click(MouseEventKind::Down(MouseButton::Right), 9, BOARD_TOP);
        assert_eq!(map_event(&right, layout()), None);
        let outside = click(MouseEventKind::Down(MouseButton::Left), 9, 0);
        assert_eq!(map_event(&outside, layout()), None);
        let drag = click(MouseEventKind::Drag(MouseButton::Left), 9, BOARD_TOP);
        assert_eq!(map_event(&drag, layout()), None);
    }
}
