//! TUI application state
//!
//! Pure data structures for the editor. No rendering logic here.
//!
//! The template text lives in a [`TemplateStore`]. Every edit computes the
//! new text and replaces the stored value wholesale; the cursor is a byte
//! offset into the current text, always on a char boundary.

use tracing::{debug, trace};

use crate::compose::RenderLocation;
use crate::store::TemplateStore;

/// Which control has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// The multi-line template editor
    #[default]
    Editor,
    /// The "Send mail" button
    SendButton,
}

impl Focus {
    /// The other control
    pub fn toggle(self) -> Self {
        match self {
            Self::Editor => Self::SendButton,
            Self::SendButton => Self::Editor,
        }
    }
}

/// Severity of the footer status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Transient message shown in the footer until the next key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

/// Main application state
#[derive(Debug)]
pub struct AppState {
    /// The one current template
    pub store: TemplateStore,
    /// Cursor byte offset into the template
    pub cursor: usize,
    /// Focused control
    pub focus: Focus,
    /// First visible editor line
    pub scroll: u16,
    /// Render location shown in the header
    pub location: RenderLocation,
    /// Endpoint shown in the header
    pub endpoint: String,
    /// Set by a send key; consumed by the runner
    pub pending_send: bool,
    /// Number of sends issued this session
    pub sent_count: usize,
    /// Footer status line
    pub status: Option<StatusMessage>,
    /// Exit requested
    pub should_quit: bool,
}

impl AppState {
    /// Create state with the initial template, cursor at the end
    pub fn new(initial: impl Into<String>, location: RenderLocation, endpoint: impl Into<String>) -> Self {
        let store = TemplateStore::new(initial);
        let cursor = store.current().len();
        debug!(%location, cursor, "AppState::new: called");
        Self {
            store,
            cursor,
            focus: Focus::Editor,
            scroll: 0,
            location,
            endpoint: endpoint.into(),
            pending_send: false,
            sent_count: 0,
            status: None,
            should_quit: false,
        }
    }

    /// Current template text
    pub fn text(&self) -> &str {
        self.store.current()
    }

    /// Show an info message in the footer
    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Info,
            text: text.into(),
        });
    }

    /// Show an error message in the footer
    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Error,
            text: text.into(),
        });
    }

    /// Clear the footer status line
    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Request a send
    pub fn request_send(&mut self) {
        debug!("AppState::request_send: called");
        self.pending_send = true;
    }

    /// Take the pending send flag
    pub fn take_pending_send(&mut self) -> bool {
        std::mem::take(&mut self.pending_send)
    }

    // === Editing ===

    /// Insert a string at the cursor
    pub fn insert_str(&mut self, s: &str) {
        trace!(len = s.len(), cursor = self.cursor, "AppState::insert_str: called");
        let mut next = self.store.snapshot();
        next.insert_str(self.cursor, s);
        self.cursor += s.len();
        self.store.replace(next);
    }

    /// Insert a character at the cursor
    pub fn insert_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.insert_str(c.encode_utf8(&mut buf));
    }

    /// Delete the character before the cursor
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = self.prev_boundary(self.cursor);
        let mut next = self.store.snapshot();
        next.drain(start..self.cursor);
        self.cursor = start;
        self.store.replace(next);
    }

    /// Delete the character at the cursor
    pub fn delete(&mut self) {
        if self.cursor >= self.text().len() {
            return;
        }
        let end = self.next_boundary(self.cursor);
        let mut next = self.store.snapshot();
        next.drain(self.cursor..end);
        self.store.replace(next);
    }

    // === Cursor movement ===

    pub fn move_left(&mut self) {
        self.cursor = self.prev_boundary(self.cursor);
    }

    pub fn move_right(&mut self) {
        self.cursor = self.next_boundary(self.cursor);
    }

    /// Move to the start of the current line
    pub fn move_home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    /// Move to the end of the current line
    pub fn move_end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    /// Move up one line, keeping the column where possible
    pub fn move_up(&mut self) {
        let start = self.line_start(self.cursor);
        if start == 0 {
            self.cursor = 0;
            return;
        }
        let column = self.text()[start..self.cursor].chars().count();
        let prev_start = self.line_start(start - 1);
        self.cursor = self.offset_in_line(prev_start, column);
    }

    /// Move down one line, keeping the column where possible
    pub fn move_down(&mut self) {
        let end = self.line_end(self.cursor);
        if end >= self.text().len() {
            self.cursor = end;
            return;
        }
        let column = self.text()[self.line_start(self.cursor)..self.cursor].chars().count();
        self.cursor = self.offset_in_line(end + 1, column);
    }

    /// Zero-based (line, column) of the cursor, column counted in chars
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before = &self.text()[..self.cursor];
        let line = before.matches('\n').count();
        let column = before[self.line_start(self.cursor)..].chars().count();
        (line, column)
    }

    fn line_start(&self, pos: usize) -> usize {
        self.text()[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.text()[pos..].find('\n').map(|i| pos + i).unwrap_or(self.text().len())
    }

    /// Byte offset of `column` chars into the line starting at `start`, clamped to the line end
    fn offset_in_line(&self, start: usize, column: usize) -> usize {
        let end = self.line_end(start);
        self.text()[start..end]
            .char_indices()
            .nth(column)
            .map(|(i, _)| start + i)
            .unwrap_or(end)
    }

    fn prev_boundary(&self, pos: usize) -> usize {
        let text = self.text();
        let mut new_pos = pos.saturating_sub(1);
        while new_pos > 0 && !text.is_char_boundary(new_pos) {
            new_pos -= 1;
        }
        new_pos
    }

    fn next_boundary(&self, pos: usize) -> usize {
        let text = self.text();
        let mut new_pos = pos + 1;
        while new_pos < text.len() && !text.is_char_boundary(new_pos) {
            new_pos += 1;
        }
        new_pos.min(text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(text: &str) -> AppState {
        AppState::new(text, RenderLocation::Server, "http://localhost:8192/")
    }

    #[test]
    fn test_new_places_cursor_at_end() {
        let s = state("abc");
        assert_eq!(s.cursor, 3);
        assert_eq!(s.focus, Focus::Editor);
        assert!(!s.pending_send);
    }

    #[test]
    fn test_insert_replaces_store_value() {
        let mut s = state("<h1></h1>");
        s.cursor = 4;
        s.insert_str("Hi");
        assert_eq!(s.text(), "<h1>Hi</h1>");
        assert_eq!(s.cursor, 6);
    }

    #[test]
    fn test_backspace_and_delete_multibyte() {
        let mut s = state("aé b");
        s.cursor = 3; // after 'é'
        s.backspace();
        assert_eq!(s.text(), "a b");
        assert_eq!(s.cursor, 1);

        s.delete();
        assert_eq!(s.text(), "ab");
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut s = state("x");
        s.cursor = 0;
        s.backspace();
        assert_eq!(s.text(), "x");
    }

    #[test]
    fn test_vertical_movement_keeps_column() {
        let mut s = state("abcd\nx\nwxyz");
        s.cursor = 3; // line 0, column 3
        s.move_down();
        assert_eq!(s.cursor_line_col(), (1, 1)); // clamped to short line
        s.move_down();
        assert_eq!(s.cursor_line_col(), (2, 1));
        s.move_up();
        s.move_up();
        assert_eq!(s.cursor_line_col(), (0, 1));
        s.move_up();
        assert_eq!(s.cursor, 0);
    }

    #[test]
    fn test_home_end() {
        let mut s = state("one\ntwo");
        s.cursor = 5;
        s.move_home();
        assert_eq!(s.cursor, 4);
        s.move_end();
        assert_eq!(s.cursor, 7);
    }

    #[test]
    fn test_take_pending_send() {
        let mut s = state("");
        s.request_send();
        assert!(s.take_pending_send());
        assert!(!s.take_pending_send());
    }

    #[test]
    fn test_focus_toggle() {
        assert_eq!(Focus::Editor.toggle(), Focus::SendButton);
        assert_eq!(Focus::SendButton.toggle(), Focus::Editor);
    }
}
