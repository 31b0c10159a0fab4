//! Rendering parsed templates against a context

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::error::RenderError;
use super::parser::{self, Segment};

/// Named string values available to placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    values: BTreeMap<String, String>,
}

impl RenderContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, ident: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(ident, value);
        self
    }

    /// Bind an identifier, replacing any previous value
    pub fn insert(&mut self, ident: impl Into<String>, value: impl Into<String>) {
        self.values.insert(ident.into(), value.into());
    }

    /// Look up an identifier
    pub fn get(&self, ident: &str) -> Option<&str> {
        self.values.get(ident).map(String::as_str)
    }

    /// Check if an identifier is bound
    pub fn contains(&self, ident: &str) -> bool {
        self.values.contains_key(ident)
    }

    /// Number of bound identifiers
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no identifiers are bound
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate bindings in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for RenderContext {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RenderContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A template parsed once and renderable against any context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template, rejecting malformed placeholders
    pub fn parse(source: &str) -> Result<Self, RenderError> {
        debug!(source_len = source.len(), "Template::parse: called");
        Ok(Self {
            segments: parser::parse(source)?,
        })
    }

    /// Distinct identifiers referenced, in order of first appearance
    pub fn references(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder { expr, .. } = segment
                && !seen.contains(&expr.ident.as_str())
            {
                seen.push(expr.ident.as_str());
            }
        }
        seen
    }

    /// Render against a context
    ///
    /// Fails on the first placeholder whose identifier is not bound. On
    /// failure no output is produced.
    pub fn render(&self, context: &RenderContext) -> Result<String, RenderError> {
        debug!(segment_count = self.segments.len(), context_len = context.len(), "Template::render: called");
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder { expr, offset } => {
                    let value = context.get(&expr.ident).ok_or_else(|| {
                        debug!(ident = %expr.ident, %offset, "Template::render: unresolved reference");
                        RenderError::UnresolvedReference {
                            ident: expr.ident.clone(),
                            offset: *offset,
                        }
                    })?;
                    out.push_str(&expr.apply(value));
                }
            }
        }
        Ok(out)
    }
}

/// Parse and render a template in one step
pub fn render(template: &str, context: &RenderContext) -> Result<String, RenderError> {
    let rendered = Template::parse(template)?.render(context)?;
    info!("Rendered template ({} bytes -> {} bytes)", template.len(), rendered.len());
    Ok(rendered)
}

/// Distinct identifiers referenced by a template, in order of first appearance
pub fn references(template: &str) -> Result<Vec<String>, RenderError> {
    let parsed = Template::parse(template)?;
    Ok(parsed.references().into_iter().map(String::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn client_context() -> RenderContext {
        RenderContext::new().with("clientValue", "some client value")
    }

    #[test]
    fn test_client_default_template() {
        let rendered = render("<h1>Hello, {{ clientValue.toUpperCase() }}!</h1>", &client_context()).unwrap();
        assert_eq!(rendered, "<h1>Hello, SOME CLIENT VALUE!</h1>");
    }

    #[test]
    fn test_bare_identifier_substitutes_exactly() {
        let rendered = render("[{{clientValue}}]", &client_context()).unwrap();
        assert_eq!(rendered, "[some client value]");
    }

    #[test]
    fn test_value_is_not_reinterpreted() {
        let context = RenderContext::new().with("x", "{{ y }}");
        assert_eq!(render("{{ x }}", &context).unwrap(), "{{ y }}");
    }

    #[test]
    fn test_unresolved_reference_fails() {
        let err = render("<h1>Hello, {{ serverValue.toUpperCase() }}!</h1>", &client_context()).unwrap_err();
        assert_eq!(
            err,
            RenderError::UnresolvedReference {
                ident: "serverValue".to_string(),
                offset: 11
            }
        );
    }

    #[test]
    fn test_unresolved_after_resolved_still_fails() {
        let err = render("{{ clientValue }} {{ missing }}", &client_context()).unwrap_err();
        assert!(err.is_unresolved_reference());
        assert_eq!(err.offset(), 18);
    }

    #[test]
    fn test_unclosed_marker_renders_unchanged() {
        let rendered = render("price: {{ not closed", &RenderContext::new()).unwrap();
        assert_eq!(rendered, "price: {{ not closed");

        let rendered = render("{ a } {{ clientValue }} }} {{", &client_context()).unwrap();
        assert_eq!(rendered, "{ a } some client value }} {{");
    }

    #[test]
    fn test_empty_value_is_not_an_error() {
        let context = RenderContext::new().with("blank", "");
        assert_eq!(render("a{{ blank }}b", &context).unwrap(), "ab");
    }

    #[test]
    fn test_references_in_order_without_duplicates() {
        let refs = references("{{ b }} {{ a.trim() }} {{ b.toUpperCase() }}").unwrap();
        assert_eq!(refs, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_template_reuse() {
        let template = Template::parse("Hi {{ name }}").unwrap();
        assert_eq!(
            template.render(&RenderContext::new().with("name", "Ann")).unwrap(),
            "Hi Ann"
        );
        assert_eq!(
            template.render(&RenderContext::new().with("name", "Bo")).unwrap(),
            "Hi Bo"
        );
    }

    #[test]
    fn test_context_from_iter() {
        let context: RenderContext = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(context.len(), 2);
        assert!(!context.is_empty());
        assert_eq!(context.get("b"), Some("2"));
        assert_eq!(context.iter().collect::<Vec<_>>(), vec![("a", "1"), ("b", "2")]);
        assert!(!context.contains("c"));
    }

    proptest! {
        #[test]
        fn prop_text_without_close_marker_is_unchanged(text in "[^}]*") {
            prop_assert_eq!(render(&text, &RenderContext::new()).unwrap(), text);
        }

        #[test]
        fn prop_text_without_open_marker_is_unchanged(text in "([^{]|\\{[^{])*") {
            prop_assert_eq!(render(&text, &RenderContext::new()).unwrap(), text);
        }

        #[test]
        fn prop_identifier_substitutes_value(value in "\\PC*") {
            let context = RenderContext::new().with("x", value.clone());
            prop_assert_eq!(render("<p>{{ x }}</p>", &context).unwrap(), format!("<p>{}</p>", value));
        }

        #[test]
        fn prop_uppercase_matches_str_uppercase(value in "\\PC*") {
            let context = RenderContext::new().with("x", value.clone());
            prop_assert_eq!(render("{{ x.toUpperCase() }}", &context).unwrap(), value.to_uppercase());
        }

        #[test]
        fn prop_unbound_identifier_always_fails(ident in "[a-z][a-zA-Z0-9]{0,8}") {
            let template = format!("head {{{{ {} }}}} tail", ident);
            let err = render(&template, &RenderContext::new()).unwrap_err();
            prop_assert!(err.is_unresolved_reference());
        }
    }
}
