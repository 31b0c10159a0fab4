//! TUI views and rendering
//!
//! All rendering logic is contained here. Views draw from AppState and only
//! touch it to keep the editor scrolled to the cursor.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use tracing::trace;

use super::state::{AppState, Focus, StatusKind};

mod colors {
    use ratatui::style::Color;

    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const FOCUS: Color = Color::Rgb(0, 255, 127); // Spring green
    pub const ERROR: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const DIM: Color = Color::DarkGray;
}

/// Main render function
pub fn render(state: &mut AppState, frame: &mut Frame) {
    trace!("render: called");
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(3),    // Editor
            Constraint::Length(3), // Send button
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(state, frame, chunks[0]);
    render_editor(state, frame, chunks[1]);
    render_send_button(state, frame, chunks[2]);
    render_footer(state, frame, chunks[3]);
}

fn render_header(state: &AppState, frame: &mut Frame, area: Rect) {
    let spans = vec![
        Span::styled(
            " templatemail ",
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" render: "),
        Span::styled(state.location.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  endpoint: "),
        Span::styled(state.endpoint.clone(), Style::default().fg(colors::DIM)),
        Span::raw("  sent: "),
        Span::raw(state.sent_count.to_string()),
    ];

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

/// Keep the cursor line inside the visible editor rows
fn adjust_scroll(scroll: u16, cursor_line: u16, visible_rows: u16) -> u16 {
    if visible_rows == 0 {
        return scroll;
    }
    if cursor_line < scroll {
        cursor_line
    } else if cursor_line >= scroll.saturating_add(visible_rows) {
        cursor_line.saturating_sub(visible_rows - 1)
    } else {
        scroll
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(colors::FOCUS)
    } else {
        Style::default().fg(colors::DIM)
    }
}

fn render_editor(state: &mut AppState, frame: &mut Frame, area: Rect) {
    let focused = state.focus == Focus::Editor;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Template ")
        .border_style(border_style(focused));
    let inner = block.inner(area);

    let (line, column) = state.cursor_line_col();
    let line = u16::try_from(line).unwrap_or(u16::MAX);
    let column = u16::try_from(column).unwrap_or(u16::MAX);
    state.scroll = adjust_scroll(state.scroll, line, inner.height);

    let lines: Vec<Line> = state.text().split('\n').map(|l| Line::raw(l.to_string())).collect();
    let editor = Paragraph::new(lines).block(block).scroll((state.scroll, 0));
    frame.render_widget(editor, area);

    if focused {
        let x = inner.x.saturating_add(column).min(inner.right().saturating_sub(1));
        let y = inner.y.saturating_add(line.saturating_sub(state.scroll));
        frame.set_cursor_position(Position::new(x, y));
    }
}

fn render_send_button(state: &AppState, frame: &mut Frame, area: Rect) {
    let focused = state.focus == Focus::SendButton;
    let label_style = if focused {
        Style::default().fg(Color::Black).bg(colors::FOCUS).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let button_area = Rect {
        width: area.width.min(17),
        ..area
    };
    let button = Paragraph::new(Line::from(Span::styled(" Send mail ", label_style)))
        .centered()
        .block(Block::default().borders(Borders::ALL).border_style(border_style(focused)));
    frame.render_widget(button, button_area);
}

fn render_footer(state: &AppState, frame: &mut Frame, area: Rect) {
    let line = match &state.status {
        Some(status) => {
            let color = match status.kind {
                StatusKind::Info => colors::FOCUS,
                StatusKind::Error => colors::ERROR,
            };
            Line::from(Span::styled(status.text.clone(), Style::default().fg(color)))
        }
        None => {
            let keybind = Style::default().fg(colors::KEYBIND);
            Line::from(vec![
                Span::styled("<ctrl+s>", keybind),
                Span::raw(" send  "),
                Span::styled("<tab>", keybind),
                Span::raw(" focus  "),
                Span::styled("<esc>", keybind),
                Span::raw(" quit"),
            ])
        }
    };

    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::RenderLocation;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_adjust_scroll() {
        assert_eq!(adjust_scroll(0, 0, 10), 0);
        assert_eq!(adjust_scroll(0, 12, 10), 3);
        assert_eq!(adjust_scroll(5, 2, 10), 2);
        assert_eq!(adjust_scroll(5, 9, 10), 5);
        assert_eq!(adjust_scroll(4, 7, 0), 4);
        assert_eq!(adjust_scroll(0, u16::MAX, 10), u16::MAX - 9);
        assert_eq!(adjust_scroll(u16::MAX - 3, u16::MAX, 1), u16::MAX);
    }

    #[test]
    fn test_render_shows_template_and_button() {
        let mut state = AppState::new(
            "<h1>Hello, {{ clientValue.toUpperCase() }}!</h1>",
            RenderLocation::Client,
            "http://localhost:8192/",
        );
        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal.draw(|frame| render(&mut state, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(content.contains("{{ clientValue.toUpperCase() }}"));
        assert!(content.contains("Send mail"));
        assert!(content.contains("render: client"));
    }

    #[test]
    fn test_render_scrolls_to_cursor() {
        let text = (0..30).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let mut state = AppState::new(text, RenderLocation::Server, "http://localhost:8192/");
        let mut terminal = Terminal::new(TestBackend::new(40, 16)).unwrap();
        terminal.draw(|frame| render(&mut state, frame)).unwrap();
        assert!(state.scroll > 0);
    }
}
