//! Connection configuration.
//!
//! [`ConnectionConfig`] carries the settings one [`TagWatch`](crate::TagWatch)
//! is bound to for its whole lifetime. [`Config`] wraps it together with the
//! network settings and can be loaded from YAML, layered over defaults and
//! environment variables.

use crate::client::ClientConfig;
use crate::error::{Result, TagWatchError};
use config::{Config as ConfigRs, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;


/// Prefix for environment variable overrides, e.g. `TAGWATCH_REGISTRY__BASE_URL`.
const ENV_PREFIX: &str = "TAGWATCH";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub registry: ConnectionConfig,
    #[serde(default)]
    pub network: Network,
}

impl Config {
    /// Parses a `Config` from a YAML string.
    ///
    /// The registry settings are validated before returning.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = ConfigRs::builder()
            .add_source(ConfigRs::try_from(&Config::default()).map_err(|e| {
                TagWatchError::config_with_source("Failed to build default configuration", e)
            })?)
            .add_source(File::from_str(s, FileFormat::Yaml));

        Self::from_builder(builder)
    }

    /// Loads a `Config` from a YAML file, then applies `TAGWATCH_*`
    /// environment overrides (nested keys separated by `__`).
    pub fn load(path: &Path) -> Result<Self> {
        let builder = ConfigRs::builder()
            .add_source(ConfigRs::try_from(&Config::default()).map_err(|e| {
                TagWatchError::config_with_source("Failed to build default configuration", e)
            })?)
            .add_source(File::from(path).format(FileFormat::Yaml).required(true))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        Self::from_builder(builder)
    }

    /// Returns the HTTP client settings derived from the network section.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_timeout(self.network.timeout)
            .with_max_idle_per_host(self.network.max_idle_per_host)
    }

    fn from_builder(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let config: Self = builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                TagWatchError::config_with_source("Failed to deserialize configuration", e)
            })?;

        config.registry.validate()?;
        Ok(config)
    }
}

/// Settings for a single registry connection.
///
/// # Examples
///
/// ```
/// use libtagwatch::config::ConnectionConfig;
///
/// let config = ConnectionConfig::new("https://reg.example.com")
///     .with_namespace("team")
///     .with_credentials("robot", "s3cret");
///
/// assert_eq!(config.qualified_repository("svc"), "team/svc");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ConnectionConfig {
    /// Absolute registry URL, e.g. `https://reg.example.com`
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Prefix prepended to every repository name
    #[serde(default)]
    pub namespace: Option<String>,
}

impl ConnectionConfig {
    /// Creates an anonymous configuration for `base_url` without a namespace.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the basic credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the namespace prefix.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Checks that the base URL is absolute and that credentials are coherent.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagwatch::config::ConnectionConfig;
    ///
    /// assert!(ConnectionConfig::new("https://reg.example.com").validate().is_ok());
    /// assert!(ConnectionConfig::new("reg.example.com").validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(TagWatchError::config("Registry base URL cannot be empty"));
        }

        let parsed = url::Url::parse(base_url).map_err(|e| {
            TagWatchError::config_with_source(format!("Invalid registry base URL: {}", base_url), e)
        })?;

        if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
            return Err(TagWatchError::config(format!(
                "Registry base URL must be an absolute http(s) URL: {}",
                base_url
            )));
        }

        if self.password.is_some() && self.username.is_none() {
            return Err(TagWatchError::config(
                "A registry password was configured without a username",
            ));
        }

        Ok(())
    }

    /// Returns the base URL without trailing slashes.
    pub fn registry_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// Applies the namespace prefix, if any, to a repository name.
    pub fn qualified_repository(&self, repository: &str) -> String {
        match self.namespace.as_deref() {
            Some(namespace) if !namespace.is_empty() => format!("{}/{}", namespace, repository),
            _ => repository.to_string(),
        }
    }
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Request timeout in seconds
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,

    #[serde(default = "default_max_idle_per_host")]
    pub max_idle_per_host: usize,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
            max_idle_per_host: default_max_idle_per_host(),
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}

fn default_max_idle_per_host() -> usize {
    10
}
