//! Startup configuration: TOML file plus `LURKER_*` environment
//! overrides, validated once before the run.
//!
//! Precedence: CLI flag > environment variable > file > default. A
//! missing required value is startup-fatal; nothing in the engine ever
//! re-reads ambient state.

use std::path::Path;

use lurker::Credentials;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_LIKE_PROBABILITY: f64 = 0.02;
pub const DEFAULT_MAX_TOPICS: usize = 10;
const DEFAULT_HOME_URL: &str = "https://linux.do/";
const DEFAULT_CONNECT_URL: &str = "https://connect.linux.do/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    #[error("like_probability must be within [0, 1], got {0}")]
    Probability(f64),

    #[error("max_topics must be greater than zero")]
    MaxTopics,

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Raw `lurker.toml` shape. Every section is optional; validation happens
/// after env overrides are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub credentials: CredentialsSection,
    pub settings: SettingsSection,
    pub urls: UrlsSection,
    pub push: PushSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsSection {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettingsSection {
    pub like_probability: f64,
    pub max_topics: usize,
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            like_probability: DEFAULT_LIKE_PROBABILITY,
            max_topics: DEFAULT_MAX_TOPICS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UrlsSection {
    pub home_url: String,
    pub connect_url: String,
}

impl Default for UrlsSection {
    fn default() -> Self {
        Self {
            home_url: DEFAULT_HOME_URL.to_string(),
            connect_url: DEFAULT_CONNECT_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PushSection {
    pub use_push: bool,
    pub app_token: Option<String>,
    pub topic_id: Option<String>,
}

impl FileConfig {
    /// Reads the file when present; an absent file is an empty config
    /// (everything can still come from the environment).
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(target = "lurker.config", path = %path.display(), "no config file, using env and defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Environment overrides, captured once so the merge logic stays a pure
/// function of its inputs.
#[derive(Debug, Default)]
pub struct EnvOverrides {
    pub username: Option<String>,
    pub password: Option<String>,
    pub like_probability: Option<String>,
    pub max_topics: Option<String>,
    pub use_push: Option<String>,
    pub app_token: Option<String>,
    pub topic_id: Option<String>,
}

impl EnvOverrides {
    pub fn capture() -> Self {
        fn get(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.is_empty())
        }
        Self {
            username: get("LURKER_USERNAME"),
            password: get("LURKER_PASSWORD"),
            like_probability: get("LURKER_LIKE_PROBABILITY"),
            max_topics: get("LURKER_MAX_TOPICS"),
            use_push: get("LURKER_USE_PUSH"),
            app_token: get("LURKER_APP_TOKEN"),
            topic_id: get("LURKER_TOPIC_ID"),
        }
    }
}

/// Push channel settings, present only when the channel is enabled.
#[derive(Debug, Clone)]
pub struct PushConfig {
    pub app_token: String,
    pub topic_id: String,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub like_probability: f64,
    pub max_topics: usize,
    pub home_url: String,
    pub connect_url: String,
    pub push: Option<PushConfig>,
}

impl Config {
    /// Loads the file (when present), applies environment overrides, and
    /// validates.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_sources(FileConfig::read(path)?, EnvOverrides::capture())
    }

    pub fn from_sources(file: FileConfig, env: EnvOverrides) -> Result<Self, ConfigError> {
        let username = env
            .username
            .or(file.credentials.username)
            .ok_or(ConfigError::Missing("username"))?;
        let password = env
            .password
            .or(file.credentials.password)
            .ok_or(ConfigError::Missing("password"))?;

        let like_probability = match env.like_probability {
            Some(raw) => raw.parse::<f64>().map_err(|_| ConfigError::Invalid {
                name: "LURKER_LIKE_PROBABILITY",
                value: raw,
            })?,
            None => file.settings.like_probability,
        };
        let max_topics = match env.max_topics {
            Some(raw) => raw.parse::<usize>().map_err(|_| ConfigError::Invalid {
                name: "LURKER_MAX_TOPICS",
                value: raw,
            })?,
            None => file.settings.max_topics,
        };

        let use_push = match env.use_push {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                name: "LURKER_USE_PUSH",
                value: raw,
            })?,
            None => file.push.use_push,
        };
        let push = if use_push {
            Some(PushConfig {
                app_token: env
                    .app_token
                    .or(file.push.app_token)
                    .ok_or(ConfigError::Missing("app_token"))?,
                topic_id: env
                    .topic_id
                    .or(file.push.topic_id)
                    .ok_or(ConfigError::Missing("topic_id"))?,
            })
        } else {
            None
        };

        let config = Self {
            credentials: Credentials { username, password },
            like_probability,
            max_topics,
            home_url: file.urls.home_url,
            connect_url: file.urls.connect_url,
            push,
        };
        config.validate()?;
        Ok(config)
    }

    /// Applies CLI-level overrides, revalidating the result.
    pub fn with_overrides(
        mut self,
        max_topics: Option<usize>,
        like_probability: Option<f64>,
    ) -> Result<Self, ConfigError> {
        if let Some(max_topics) = max_topics {
            self.max_topics = max_topics;
        }
        if let Some(like_probability) = like_probability {
            self.like_probability = like_probability;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.like_probability) {
            return Err(ConfigError::Probability(self.like_probability));
        }
        if self.max_topics == 0 {
            return Err(ConfigError::MaxTopics);
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        _ if raw.eq_ignore_ascii_case("true") || raw == "1" => Some(true),
        _ if raw.eq_ignore_ascii_case("false") || raw == "0" => Some(false),
        _ => None,
    }
}
