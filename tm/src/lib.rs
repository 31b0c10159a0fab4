//! templatemail - edit an HTML mail template and send it
//!
//! A terminal editor pre-filled with a mail template and a "Send mail" button.
//! Sending POSTs the template to a local mail endpoint. Placeholders such as
//! `{{ clientValue.toUpperCase() }}` are substituted either by the receiving
//! server (the raw template is sent) or locally before sending.
//!
//! # Modules
//!
//! - [`template`] - Placeholder parsing and rendering with a whitelisted grammar
//! - [`store`] - The single current template of an editing session
//! - [`dispatch`] - Fire-and-forget HTTP POST
//! - [`compose`] - Render location and the send flow
//! - [`tui`] - Terminal editor
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod compose;
pub mod config;
pub mod dispatch;
pub mod store;
pub mod template;
pub mod tui;

// Re-export commonly used types
pub use compose::{Composer, RenderLocation};
pub use config::Config;
pub use dispatch::{DispatchError, Dispatcher, HttpTransport, Transport};
pub use store::TemplateStore;
pub use template::{Operation, RenderContext, RenderError, Template, references, render};
