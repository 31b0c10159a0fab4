//! Template rendering
//!
//! Substitutes `{{ identifier }}` and `{{ identifier.op() }}` placeholders
//! with values from a [`RenderContext`]. The expression grammar is a fixed
//! whitelist (see [`Operation`]); there is no evaluation engine behind it.
//!
//! An identifier missing from the context is an error. Rendering never
//! substitutes a blank and never returns partial output.

mod error;
mod parser;
mod render;

pub use error::RenderError;
pub use parser::{CLOSE, Expr, OPEN, Operation, Segment, parse};
pub use render::{RenderContext, Template, references, render};
