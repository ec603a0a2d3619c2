use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};

use crate::domain::{Message, TVConfig, TVError};
use crate::model::Model;

/// Maps terminal events to messages for the model.
pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &TVConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, TVError> {
        if !event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(None);
        }
        let message = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if model.raw_keyevents() {
                    Some(Message::RawKey(key))
                } else {
                    Self::handle_key(key)
                }
            }
            _ => None,
        };
        Ok(message)
    }

    fn handle_key(key: KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Enter => Some(Message::Enter),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::MoveLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::MoveRight),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::FirstPage),
            KeyCode::End | KeyCode::Char('G') => Some(Message::LastPage),
            KeyCode::PageUp | KeyCode::Char('p') => Some(Message::PrevPage),
            KeyCode::PageDown | KeyCode::Char('n') => Some(Message::NextPage),
            KeyCode::Char(':') => Some(Message::JumpToPage),
            KeyCode::Char('/') => Some(Message::Search),
            KeyCode::Char('s') => Some(Message::SortByColumn),
            KeyCode::Char('S') => Some(Message::ClearSort),
            KeyCode::Char('+') => Some(Message::IncreasePageSize),
            KeyCode::Char('-') => Some(Message::DecreasePageSize),
            KeyCode::Char(' ') => Some(Message::ToggleRow),
            KeyCode::Char('a') => Some(Message::ToggleAll),
            KeyCode::Char('y') => Some(Message::CopySelection),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Option<Message> {
        Controller::handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn maps_table_keys() {
        assert!(matches!(key(KeyCode::Char('q')), Some(Message::Quit)));
        assert!(matches!(key(KeyCode::Char('/')), Some(Message::Search)));
        assert!(matches!(key(KeyCode::Char(':')), Some(Message::JumpToPage)));
        assert!(matches!(key(KeyCode::PageDown), Some(Message::NextPage)));
        assert!(matches!(key(KeyCode::Char(' ')), Some(Message::ToggleRow)));
        assert!(key(KeyCode::Char('z')).is_none());
    }
}
