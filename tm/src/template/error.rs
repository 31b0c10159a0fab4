//! Template rendering errors

use thiserror::Error;

/// Errors that can occur while parsing or rendering a template
///
/// Every variant carries the byte offset of the placeholder's opening `{{`
/// in the source template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("{ident} is not defined (placeholder at byte {offset})")]
    UnresolvedReference { ident: String, offset: usize },

    #[error("Unsupported operation {op}() (placeholder at byte {offset})")]
    UnknownOperation { op: String, offset: usize },

    #[error("Invalid placeholder expression '{expr}' at byte {offset}")]
    InvalidExpression { expr: String, offset: usize },
}

impl RenderError {
    /// Byte offset of the placeholder that failed
    pub fn offset(&self) -> usize {
        match self {
            RenderError::UnresolvedReference { offset, .. }
            | RenderError::UnknownOperation { offset, .. }
            | RenderError::InvalidExpression { offset, .. } => *offset,
        }
    }

    /// Check if this error is a reference to an identifier missing from the context
    pub fn is_unresolved_reference(&self) -> bool {
        matches!(self, RenderError::UnresolvedReference { .. })
    }

    /// Check if the template itself is malformed (independent of any context)
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            RenderError::UnknownOperation { .. } | RenderError::InvalidExpression { .. }
        )
    }
}
