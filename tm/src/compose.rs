//! Send flow: render placement plus dispatch
//!
//! The render location decides whether placeholders are substituted here,
//! before the payload leaves, or by the receiving server.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dispatch::Dispatcher;
use crate::template::{self, RenderContext, RenderError};

/// Default template when the server renders
pub const SERVER_DEFAULT_TEMPLATE: &str = "<h1>Hello, {{ serverValue.toUpperCase() }}!</h1>";

/// Default template when the client renders
pub const CLIENT_DEFAULT_TEMPLATE: &str = "<h1>Hello, {{ clientValue.toUpperCase() }}!</h1>";

/// Identifier bound in the default client-side context
pub const CLIENT_VALUE_IDENT: &str = "clientValue";

/// Value bound to [`CLIENT_VALUE_IDENT`] in the default client-side context
pub const CLIENT_VALUE: &str = "some client value";

/// Where template substitution happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum RenderLocation {
    /// Send the raw template; the receiver renders it
    #[default]
    Server,
    /// Render locally, send the result
    Client,
}

impl RenderLocation {
    /// The template an editing session starts with
    pub fn default_template(&self) -> &'static str {
        match self {
            Self::Server => SERVER_DEFAULT_TEMPLATE,
            Self::Client => CLIENT_DEFAULT_TEMPLATE,
        }
    }
}

impl fmt::Display for RenderLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::Client => write!(f, "client"),
        }
    }
}

impl FromStr for RenderLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "RenderLocation::from_str: called");
        match s.to_lowercase().as_str() {
            "server" => Ok(Self::Server),
            "client" => Ok(Self::Client),
            _ => Err(format!("Unknown render location: {}. Use: server or client", s)),
        }
    }
}

impl TryFrom<String> for RenderLocation {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// The default client-side render context
pub fn default_context() -> RenderContext {
    RenderContext::new().with(CLIENT_VALUE_IDENT, CLIENT_VALUE)
}

/// Prepares payloads and hands them to the dispatcher
pub struct Composer {
    location: RenderLocation,
    context: RenderContext,
    dispatcher: Dispatcher,
}

impl Composer {
    /// Create a composer
    pub fn new(location: RenderLocation, context: RenderContext, dispatcher: Dispatcher) -> Self {
        debug!(%location, context_len = context.len(), "Composer::new: called");
        Self {
            location,
            context,
            dispatcher,
        }
    }

    /// Configured render location
    pub fn location(&self) -> RenderLocation {
        self.location
    }

    /// Context used for client-side rendering
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Underlying dispatcher
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The body that would be sent for this template
    pub fn payload(&self, template: &str) -> Result<String, RenderError> {
        debug!(location = %self.location, template_len = template.len(), "Composer::payload: called");
        match self.location {
            RenderLocation::Server => Ok(template.to_string()),
            RenderLocation::Client => template::render(template, &self.context),
        }
    }

    /// Prepare the payload and dispatch it
    ///
    /// Exactly one request is issued on success. A render failure issues none.
    pub fn send(&self, template: &str) -> Result<(), RenderError> {
        let payload = self.payload(template)?;
        info!("Sending mail ({} bytes, rendered by {})", payload.len(), self.location);
        self.dispatcher.dispatch(payload);
        Ok(())
    }
}
