//! Configuration management for dotfig.
//!
//! Parses `dotfig.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`]. Every diagram
//! option is optional: an absent key keeps the built-in default, so layering
//! file and CLI values never erases a default.
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `renderer.dot_path`
//! - `renderer.kroki_url`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "dotfig.toml";

/// Default Graphviz executable.
const DEFAULT_DOT_PATH: &str = "dot";

/// Default Kroki request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub optimize: Option<bool>,
    pub wrapper_tag: Option<String>,
    pub wrapper_class: Option<String>,
    pub first_comment_is_caption: Option<bool>,
    pub generate_aria_description: Option<bool>,
    pub concurrent: Option<bool>,
    pub backend: Option<RendererBackend>,
    pub dot_path: Option<String>,
    pub kroki_url: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diagram output options.
    pub graphviz: GraphvizConfig,
    /// Renderer configuration (raw, as parsed from TOML).
    renderer: RendererConfigRaw,

    /// Resolved renderer configuration (set after loading).
    #[serde(skip)]
    pub renderer_resolved: RendererConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Diagram output options from the `[graphviz]` section.
///
/// `None` means "use the built-in default".
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GraphvizConfig {
    pub optimize: Option<bool>,
    pub wrapper_tag: Option<String>,
    pub wrapper_class: Option<String>,
    pub figure_class: Option<String>,
    pub figcaption_class: Option<String>,
    pub first_comment_is_caption: Option<bool>,
    pub generate_aria_description: Option<bool>,
    /// Process blocks concurrently (default) or one at a time.
    pub concurrent: Option<bool>,
    /// Optimizer plugin overrides by plugin name.
    #[serde(alias = "svgo_plugins")]
    pub optimizer_plugins: Option<BTreeMap<String, bool>>,
}

/// Rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererBackend {
    /// Local Graphviz executable.
    #[default]
    Command,
    /// Kroki HTTP service.
    Kroki,
}

/// Raw renderer configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RendererConfigRaw {
    backend: Option<RendererBackend>,
    dot_path: Option<String>,
    kroki_url: Option<String>,
    timeout_secs: Option<u64>,
}

/// Resolved renderer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    pub backend: RendererBackend,
    /// Graphviz executable for the command backend.
    pub dot_path: String,
    /// Kroki server URL, required for the kroki backend.
    pub kroki_url: Option<String>,
    /// HTTP timeout for the kroki backend.
    pub timeout: Duration,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: RendererBackend::Command,
            dot_path: DEFAULT_DOT_PATH.to_owned(),
            kroki_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`renderer.kroki_url`").
        field: String,
        /// Error message (e.g., "${`KROKI_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `dotfig.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values. The result is validated again.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from a TOML string (no file, no CLI settings).
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config = Self::parse(content)?;
        config.validate()?;
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve_renderer();
        Ok(config)
    }

    /// Whether blocks should be processed concurrently.
    #[must_use]
    pub fn concurrent(&self) -> bool {
        self.graphviz.concurrent.unwrap_or(true)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let graphviz = &mut self.graphviz;
        graphviz.optimize = settings.optimize.or(graphviz.optimize);
        graphviz.first_comment_is_caption = settings
            .first_comment_is_caption
            .or(graphviz.first_comment_is_caption);
        graphviz.generate_aria_description = settings
            .generate_aria_description
            .or(graphviz.generate_aria_description);
        graphviz.concurrent = settings.concurrent.or(graphviz.concurrent);
        if let Some(wrapper_tag) = &settings.wrapper_tag {
            graphviz.wrapper_tag = Some(wrapper_tag.clone());
        }
        if let Some(wrapper_class) = &settings.wrapper_class {
            graphviz.wrapper_class = Some(wrapper_class.clone());
        }

        if let Some(backend) = settings.backend {
            self.renderer_resolved.backend = backend;
        }
        if let Some(dot_path) = &settings.dot_path {
            self.renderer_resolved.dot_path.clone_from(dot_path);
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.renderer_resolved.kroki_url = Some(kroki_url.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_graphviz()?;
        self.validate_renderer()?;
        Ok(())
    }

    fn validate_graphviz(&self) -> Result<(), ConfigError> {
        if let Some(tag) = &self.graphviz.wrapper_tag {
            require_non_empty(tag, "graphviz.wrapper_tag")?;
            if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(ConfigError::Validation(format!(
                    "graphviz.wrapper_tag '{tag}' is not a valid element name"
                )));
            }
        }
        Ok(())
    }

    fn validate_renderer(&self) -> Result<(), ConfigError> {
        let renderer = &self.renderer_resolved;
        match renderer.backend {
            RendererBackend::Command => {
                require_non_empty(&renderer.dot_path, "renderer.dot_path")?;
            }
            RendererBackend::Kroki => {
                let kroki_url = renderer.kroki_url.as_deref().ok_or_else(|| {
                    ConfigError::Validation(
                        "renderer.kroki_url is required for the kroki backend".to_owned(),
                    )
                })?;
                require_non_empty(kroki_url, "renderer.kroki_url")?;
                require_http_url(kroki_url, "renderer.kroki_url")?;
            }
        }

        if renderer.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "renderer.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dot_path) = self.renderer.dot_path {
            self.renderer.dot_path = Some(expand::expand_env(dot_path, "renderer.dot_path")?);
        }
        if let Some(ref kroki_url) = self.renderer.kroki_url {
            self.renderer.kroki_url = Some(expand::expand_env(kroki_url, "renderer.kroki_url")?);
        }
        Ok(())
    }

    /// Resolve raw renderer values against defaults.
    fn resolve_renderer(&mut self) {
        let raw = &self.renderer;
        self.renderer_resolved = RendererConfig {
            backend: raw.backend.unwrap_or_default(),
            dot_path: raw
                .dot_path
                .clone()
                .unwrap_or_else(|| DEFAULT_DOT_PATH.to_owned()),
            kroki_url: raw.kroki_url.clone(),
            timeout: Duration::from_secs(raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        };
    }
}
