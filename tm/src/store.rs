//! Template store
//!
//! Holds the one current template string of an editing session. The value is
//! replaced wholesale on every edit and read at send time. It is owned by the
//! UI state and mutated only from the event loop; there is no history.

use tracing::{debug, trace};

/// The current editable template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateStore {
    current: String,
}

impl TemplateStore {
    /// Create a store holding the initial template
    pub fn new(initial: impl Into<String>) -> Self {
        let current = initial.into();
        debug!(len = current.len(), "TemplateStore::new: called");
        Self { current }
    }

    /// The current template
    pub fn current(&self) -> &str {
        trace!("TemplateStore::current: called");
        &self.current
    }

    /// Replace the template with a new value
    pub fn replace(&mut self, template: impl Into<String>) {
        self.current = template.into();
        trace!(len = self.current.len(), "TemplateStore::replace: called");
    }

    /// Owned copy of the current template, for handing off to a send
    pub fn snapshot(&self) -> String {
        self.current.clone()
    }
}
