//! templatemail configuration types and loading

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compose::{self, RenderLocation};
use crate::template::RenderContext;

/// Main templatemail configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR); CLI `--log-level` wins
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Where template substitution happens
    #[serde(rename = "render-location")]
    pub render_location: RenderLocation,

    /// Outbound request configuration
    pub dispatch: DispatchConfig,

    /// Template defaults and render context
    pub template: TemplateConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .templatemail.yml
        let local_config = PathBuf::from(".templatemail.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/templatemail/templatemail.yml
        if let Some(user_config) = user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are ignored here; the full load reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".templatemail.yml")];
                paths.extend(user_config_path());
                paths
            }
        };

        candidates
            .into_iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// The template an editing session starts with
    pub fn initial_template(&self) -> String {
        self.template
            .default
            .clone()
            .unwrap_or_else(|| self.render_location.default_template().to_string())
    }

    /// Render context built from the configured bindings
    pub fn render_context(&self) -> RenderContext {
        RenderContext::from(self.template.context.clone())
    }
}

fn user_config_path() -> Option<PathBuf> {
    let path = dirs::config_dir().map(|d| d.join("templatemail").join("templatemail.yml"));
    debug!(?path, "user_config_path: called");
    path
}

/// Outbound request configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// URL the template is POSTed to
    pub endpoint: String,

    /// How long to wait for in-flight sends at exit, in milliseconds
    #[serde(rename = "flush-timeout-ms")]
    pub flush_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8192/".to_string(),
            flush_timeout_ms: 2_000,
        }
    }
}

/// Template defaults and render context
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Override for the initial template (otherwise chosen by render location)
    pub default: Option<String>,

    /// Identifier bindings for client-side rendering
    pub context: BTreeMap<String, String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        let mut context = BTreeMap::new();
        context.insert(compose::CLIENT_VALUE_IDENT.to_string(), compose::CLIENT_VALUE.to_string());
        Self { default: None, context }
    }
}
