//! Dispatch error types

use thiserror::Error;

/// Errors produced by a [`Transport`](super::Transport)
///
/// The dispatcher logs these and drops them; callers of
/// [`Dispatcher::dispatch`](super::Dispatcher::dispatch) never see them.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Endpoint responded with status {0}")]
    Status(u16),
}
