//! Placeholder parser
//!
//! Splits a template into literal text and `{{ ... }}` placeholders. The
//! expression inside a placeholder is an identifier followed by zero or more
//! calls to whitelisted, argument-free operations:
//!
//! ```text
//! {{ clientValue }}
//! {{ clientValue.toUpperCase() }}
//! {{ clientValue.trim().toLowerCase() }}
//! ```
//!
//! Anything else is rejected. Nothing inside a placeholder is ever evaluated.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use super::error::RenderError;

/// Placeholder opening marker
pub const OPEN: &str = "{{";

/// Placeholder closing marker
pub const CLOSE: &str = "}}";

/// Whole-expression grammar: identifier, then `.op()` calls
static EXPR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*([A-Za-z_$][A-Za-z0-9_$]*)((?:\s*\.\s*[A-Za-z_$][A-Za-z0-9_$]*\s*\(\s*\))*)\s*$",
    )
    .expect("expression pattern is valid")
});

/// A single `.op()` call inside the chain captured by `EXPR_RE`
static CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*\(\s*\)").expect("call pattern is valid")
});

/// Whitelisted string operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `toUpperCase()`
    ToUpperCase,
    /// `toLowerCase()`
    ToLowerCase,
    /// `trim()`
    Trim,
}

impl Operation {
    /// Look up an operation by the name used in templates
    pub fn from_name(name: &str) -> Option<Self> {
        debug!(%name, "Operation::from_name: called");
        match name {
            "toUpperCase" => Some(Self::ToUpperCase),
            "toLowerCase" => Some(Self::ToLowerCase),
            "trim" => Some(Self::Trim),
            _ => {
                debug!(%name, "Operation::from_name: not whitelisted");
                None
            }
        }
    }

    /// Name of the operation as written in templates
    pub fn name(&self) -> &'static str {
        match self {
            Self::ToUpperCase => "toUpperCase",
            Self::ToLowerCase => "toLowerCase",
            Self::Trim => "trim",
        }
    }

    /// Apply the operation to a resolved value
    pub fn apply(&self, value: &str) -> String {
        trace!(?self, value_len = value.len(), "Operation::apply: called");
        match self {
            Self::ToUpperCase => value.to_uppercase(),
            Self::ToLowerCase => value.to_lowercase(),
            Self::Trim => value.trim().to_string(),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}()", self.name())
    }
}

/// A parsed placeholder expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    /// Identifier looked up in the render context
    pub ident: String,
    /// Operations applied left to right to the resolved value
    pub ops: Vec<Operation>,
}

impl Expr {
    /// Parse the text between `{{` and `}}`
    ///
    /// `offset` is the byte position of the placeholder in the template and is
    /// only used for error reporting.
    pub fn parse(source: &str, offset: usize) -> Result<Self, RenderError> {
        debug!(%source, %offset, "Expr::parse: called");
        let caps = EXPR_RE.captures(source).ok_or_else(|| {
            debug!(%source, "Expr::parse: does not match grammar");
            RenderError::InvalidExpression {
                expr: source.trim().to_string(),
                offset,
            }
        })?;

        let ident = caps[1].to_string();
        let chain = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

        let mut ops = Vec::new();
        for call in CALL_RE.captures_iter(chain) {
            let name = &call[1];
            let op = Operation::from_name(name).ok_or_else(|| RenderError::UnknownOperation {
                op: name.to_string(),
                offset,
            })?;
            ops.push(op);
        }

        debug!(%ident, ?ops, "Expr::parse: parsed");
        Ok(Self { ident, ops })
    }

    /// Apply the operation chain to a resolved value
    pub fn apply(&self, value: &str) -> String {
        self.ops.iter().fold(value.to_string(), |acc, op| op.apply(&acc))
    }
}

/// A piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text copied to the output unchanged
    Text(String),
    /// A placeholder to be resolved against the render context
    Placeholder {
        expr: Expr,
        /// Byte offset of the opening `{{`
        offset: usize,
    },
}

/// Split a template into segments
///
/// Only a `{{ ... }}` pair forms a placeholder. A `{{` with no `}}` after it
/// and a stray `}}` outside a placeholder are literal text.
pub fn parse(template: &str) -> Result<Vec<Segment>, RenderError> {
    debug!(template_len = template.len(), "parse: called");
    let mut segments = Vec::new();
    let mut pos = 0;

    while let Some(rel_open) = template[pos..].find(OPEN) {
        let open = pos + rel_open;
        let body_start = open + OPEN.len();
        let Some(rel_close) = template[body_start..].find(CLOSE) else {
            debug!(%open, "parse: unclosed marker, rest is text");
            break;
        };
        if open > pos {
            segments.push(Segment::Text(template[pos..open].to_string()));
        }

        let body_end = body_start + rel_close;

        let expr = Expr::parse(&template[body_start..body_end], open)?;
        segments.push(Segment::Placeholder { expr, offset: open });
        pos = body_end + CLOSE.len();
    }

    if pos < template.len() {
        segments.push(Segment::Text(template[pos..].to_string()));
    }

    debug!(segment_count = segments.len(), "parse: done");
    Ok(segments)
}
