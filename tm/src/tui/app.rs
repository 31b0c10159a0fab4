//! TUI application - key handling and state management
//!
//! The App struct owns the AppState and handles all keyboard events.
//! It does not do any rendering or sending - rendering is delegated to the
//! views module, and sends are picked up by the runner.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, trace};

use super::state::{AppState, Focus};

/// TUI application
#[derive(Debug)]
pub struct App {
    /// Application state
    state: AppState,
}

impl App {
    /// Create an application around initial state
    pub fn new(state: AppState) -> Self {
        debug!("App::new: called");
        Self { state }
    }

    /// Get reference to state
    pub fn state(&self) -> &AppState {
        trace!("App::state: called");
        &self.state
    }

    /// Get mutable reference to state
    pub fn state_mut(&mut self) -> &mut AppState {
        trace!("App::state_mut: called");
        &mut self.state
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        debug!(?key, "App::handle_key: called");
        // Clear any transient status message on key press
        self.state.clear_status();

        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => {
                debug!("App::handle_key: quit requested");
                self.state.should_quit = true;
                return true;
            }
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
                debug!("App::handle_key: Ctrl+S send");
                self.state.request_send();
                return false;
            }
            (KeyCode::Tab, _) | (KeyCode::BackTab, _) => {
                self.state.focus = self.state.focus.toggle();
                debug!(focus = ?self.state.focus, "App::handle_key: focus changed");
                return false;
            }
            _ => {}
        }

        match self.state.focus {
            Focus::Editor => self.handle_editor_key(key),
            Focus::SendButton => self.handle_button_key(key),
        }
        false
    }

    /// Handle pasted text (inserted into the editor as one edit)
    pub fn handle_paste(&mut self, text: &str) {
        debug!(len = text.len(), "App::handle_paste: called");
        self.state.clear_status();
        self.state.focus = Focus::Editor;
        // Normalize CRLF from terminals that paste Windows line endings
        self.state.insert_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
    }

    /// Handle key while the editor has focus
    fn handle_editor_key(&mut self, key: KeyEvent) {
        trace!(?key, "App::handle_editor_key: called");
        match key.code {
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.state.insert_char(c);
            }
            KeyCode::Enter => self.state.insert_char('\n'),
            KeyCode::Backspace => self.state.backspace(),
            KeyCode::Delete => self.state.delete(),
            KeyCode::Left => self.state.move_left(),
            KeyCode::Right => self.state.move_right(),
            KeyCode::Up => self.state.move_up(),
            KeyCode::Down => self.state.move_down(),
            KeyCode::Home => self.state.move_home(),
            KeyCode::End => self.state.move_end(),
            _ => {
                debug!("App::handle_editor_key: unhandled key");
            }
        }
    }

    /// Handle key while the send button has focus
    fn handle_button_key(&mut self, key: KeyEvent) {
        trace!(?key, "App::handle_button_key: called");
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                debug!("App::handle_button_key: button pressed");
                self.state.request_send();
            }
            _ => {
                debug!("App::handle_button_key: unhandled key");
            }
        }
    }
}
