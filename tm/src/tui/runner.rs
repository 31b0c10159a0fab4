//! TUI Runner - main loop that owns the terminal and the composer
//!
//! The TuiRunner is responsible for:
//! - Dispatching terminal events to App for handling, one at a time
//! - Rendering after every event
//! - Handing the current template to the Composer when a send is requested
//! - Flushing in-flight sends on exit

use std::time::Duration;

use eyre::Result;
use tracing::{debug, info, warn};

use crate::compose::Composer;

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::state::AppState;
use super::views;

/// How often the event thread emits a tick when idle
const TICK_RATE: Duration = Duration::from_millis(250);

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    /// Application state
    app: App,
    /// Terminal handle
    terminal: Tui,
    /// Event handler
    event_handler: EventHandler,
    /// Prepares and dispatches payloads
    composer: Composer,
    /// Upper bound on waiting for sends at exit
    flush_timeout: Duration,
}

impl TuiRunner {
    /// Create a runner editing `initial`
    pub fn new(terminal: Tui, composer: Composer, initial: String, flush_timeout: Duration) -> Self {
        debug!(?flush_timeout, "TuiRunner::new: called");
        let state = AppState::new(initial, composer.location(), composer.dispatcher().endpoint());
        Self {
            app: App::new(state),
            terminal,
            event_handler: EventHandler::new(TICK_RATE),
            composer,
            flush_timeout,
        }
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        debug!("TuiRunner::run: entering main loop");
        loop {
            self.terminal.draw(|frame| views::render(self.app.state_mut(), frame))?;

            match self.event_handler.next().await? {
                Event::Key(key) => {
                    if self.app.handle_key(key) {
                        break;
                    }
                }
                Event::Paste(text) => self.app.handle_paste(&text),
                Event::Resize(width, height) => debug!(width, height, "TuiRunner::run: resize"),
                Event::Tick => {}
            }

            if self.app.state_mut().take_pending_send() {
                send_current(&self.composer, self.app.state_mut());
            }

            if self.app.state().should_quit {
                debug!("TuiRunner::run: should_quit is true, breaking");
                break;
            }
        }

        let abandoned = self.composer.dispatcher().flush(self.flush_timeout).await;
        info!(
            "Editor closed after {} send(s), {} abandoned",
            self.app.state().sent_count,
            abandoned
        );
        Ok(())
    }
}

/// Hand the current template to the composer and record the outcome
///
/// Only render failures are shown; transport outcomes are never observed.
fn send_current(composer: &Composer, state: &mut AppState) {
    debug!("send_current: called");
    match composer.send(state.text()) {
        Ok(()) => {
            state.sent_count += 1;
            let message = format!("sent ({})", state.sent_count);
            state.set_info(message);
        }
        Err(e) if e.is_syntax() => {
            warn!(error = %e, "send_current: malformed placeholder, nothing sent");
            state.set_error(format!("not sent, fix the template: {}", e));
        }
        Err(e) => {
            warn!(error = %e, "send_current: template did not render, nothing sent");
            state.set_error(format!("not sent: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{self, RenderLocation};
    use crate::dispatch::Dispatcher;
    use crate::dispatch::mock::RecordingTransport;
    use crate::tui::state::StatusKind;
    use std::sync::Arc;

    fn composer(location: RenderLocation) -> (Composer, Arc<RecordingTransport>) {
        let (transport, _rx) = RecordingTransport::new();
        let transport = Arc::new(transport);
        let composer = Composer::new(
            location,
            compose::default_context(),
            Dispatcher::new(transport.clone()),
        );
        (composer, transport)
    }

    #[tokio::test]
    async fn test_send_current_uses_then_current_template() {
        let (composer, transport) = composer(RenderLocation::Client);
        let mut state = AppState::new(compose::CLIENT_DEFAULT_TEMPLATE, RenderLocation::Client, "mock://");

        state.insert_str(" <p>{{ clientValue }}</p>");
        send_current(&composer, &mut state);
        composer.dispatcher().flush(Duration::from_secs(5)).await;

        assert_eq!(
            transport.bodies(),
            vec!["<h1>Hello, SOME CLIENT VALUE!</h1> <p>some client value</p>".to_string()]
        );
        assert_eq!(state.sent_count, 1);
        assert_eq!(state.status.as_ref().map(|s| s.kind), Some(StatusKind::Info));
    }

    #[tokio::test]
    async fn test_send_current_server_sends_raw() {
        let (composer, transport) = composer(RenderLocation::Server);
        let mut state = AppState::new(compose::SERVER_DEFAULT_TEMPLATE, RenderLocation::Server, "mock://");

        send_current(&composer, &mut state);
        send_current(&composer, &mut state);
        composer.dispatcher().flush(Duration::from_secs(5)).await;

        assert_eq!(transport.bodies().len(), 2);
        assert!(transport.bodies().iter().all(|b| b == compose::SERVER_DEFAULT_TEMPLATE));
        assert_eq!(state.sent_count, 2);
    }

    #[tokio::test]
    async fn test_send_current_render_error_sends_nothing() {
        let (composer, transport) = composer(RenderLocation::Client);
        let mut state = AppState::new(compose::SERVER_DEFAULT_TEMPLATE, RenderLocation::Client, "mock://");

        send_current(&composer, &mut state);
        composer.dispatcher().flush(Duration::from_secs(5)).await;

        assert!(transport.bodies().is_empty());
        assert_eq!(state.sent_count, 0);
        let status = state.status.unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("serverValue"));
    }

    #[tokio::test]
    async fn test_send_current_malformed_placeholder() {
        let (composer, transport) = composer(RenderLocation::Client);
        let mut state = AppState::new("{{ clientValue.constructor() }}", RenderLocation::Client, "mock://");

        send_current(&composer, &mut state);
        composer.dispatcher().flush(Duration::from_secs(5)).await;

        assert!(transport.bodies().is_empty());
        let status = state.status.unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.starts_with("not sent, fix the template"));
        assert!(status.text.contains("constructor"));
    }
}
