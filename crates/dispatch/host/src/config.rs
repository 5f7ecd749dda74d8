//! Configuration for the dispatch host

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to initialise tracing: {0}")]
    Tracing(String),
}

/// Host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Maximum nesting depth of call frames
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,

    /// How read-only frames treat writes
    #[serde(default)]
    pub view_enforcement: ViewEnforcement,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_call_depth: default_max_call_depth(),
            view_enforcement: ViewEnforcement::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Enforcement of the no-mutation guarantee for read-only frames.
///
/// Both modes guarantee that nothing a read-only frame does is observable
/// after it returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewEnforcement {
    /// Writes and events are allowed while the frame runs and are
    /// unconditionally rolled back when it returns.
    #[default]
    Rollback,
    /// Any write or event fails the frame with HS01.
    Strict,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_max_call_depth() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl HostConfig {
    /// Load configuration from defaults, an optional file and `DISPATCH_*`
    /// environment variables, in that order of precedence.
    ///
    /// Nested keys use a double underscore: `DISPATCH_LOGGING__LEVEL=debug`.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&HostConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("DISPATCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: HostConfig = builder.build()?.try_deserialize()?;
        loaded.validate()
    }

    /// Parse an inline TOML document; missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let parsed: HostConfig = toml::from_str(source)?;
        parsed.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.max_call_depth == 0 {
            return Err(ConfigError::Invalid("max_call_depth must be at least 1".to_string()));
        }
        Ok(self)
    }
}
