//! Service configuration.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults, plus the plain `PORT`, `ENV` and `JWT_SECRET` variables
//! 2. An optional TOML file (path given by `WAQT_CONFIG`)
//! 3. `WAQT__`-prefixed environment variables, `__` separating sections
//!    (e.g. `WAQT__AUTH__JWT_SECRET`, `WAQT__AUTH__EXCLUDED_PATHS=/login,/signup`)

use std::fmt;
use std::path::Path;
use std::time::Duration;

use ::config::builder::{ConfigBuilder, DefaultState};
use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use validator::Validate;

/// Prefix of environment variables read as configuration.
pub const ENV_PREFIX: &str = "WAQT";

/// Unprefixed variables honoured as defaults, with the key each one fills.
const PLAIN_ENV_DEFAULTS: [(&str, &str); 3] = [
    ("PORT", "server.port"),
    ("ENV", "server.env"),
    ("JWT_SECRET", "auth.jwt_secret"),
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Source(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AppConfig {
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,

    #[serde(default)]
    #[validate(nested)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    #[serde(default = "default_env")]
    pub env: String,

    #[serde(default = "default_request_timeout_secs")]
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_bytes")]
    #[validate(range(min = 1))]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_env() -> String {
    "development".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            env: default_env(),
            request_timeout_secs: default_request_timeout_secs(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Clone, Deserialize, Validate)]
pub struct AuthConfig {
    #[serde(default)]
    #[validate(length(min = 1, message = "auth.jwt_secret must be set"))]
    pub jwt_secret: String,

    /// Clock skew tolerated on `exp` / `nbf`, in seconds.
    #[serde(default)]
    pub leeway_secs: u64,

    /// Path prefixes under `/api/v1/auth` that need no bearer token.
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
}

fn default_excluded_paths() -> Vec<String> {
    ["/signup", "/login", "/google/login", "/google/callback"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            leeway_secs: 0,
            excluded_paths: default_excluded_paths(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("leeway_secs", &self.leeway_secs)
            .field("excluded_paths", &self.excluded_paths)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load from the optional file and the environment, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let mut builder = with_plain_env(Config::builder(), |name| std::env::var(name).ok())?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        Self::finish(builder)
    }

    /// Load from TOML text layered under the prefixed environment.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigLoadError> {
        Self::finish(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigLoadError> {
        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("auth.excluded_paths"),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

fn with_plain_env(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigLoadError> {
    for (name, key) in PLAIN_ENV_DEFAULTS {
        if let Some(value) = lookup(name) {
            builder = builder.set_default(key, value)?;
        }
    }
    Ok(builder)
}
