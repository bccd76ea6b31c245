//! High-level API for the tagwatch library.
//!
//! [`TagWatch`] is a caller-owned service bound to one
//! [`ConnectionConfig`]. It fans tag listings out across branches, resolves
//! single tags to digests and formats full image references.
//!
//! # Examples
//!
//! ```no_run
//! use libtagwatch::{ConnectionConfig, TagWatch};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConnectionConfig::new("https://reg.example.com").with_namespace("team");
//!     let tagwatch = TagWatch::new(config)?;
//!
//!     for record in tagwatch.fetch("svc", ["main", "release"]).await? {
//!         println!("{} ({}) {}", record.tag, record.branch, record.revision);
//!     }
//!
//!     let digest = tagwatch.tag_digest("svc", "latest").await?;
//!     println!("{} -> {}", tagwatch.full_reference("svc", "latest"), digest);
//!     Ok(())
//! }
//! ```

use crate::artifact::{ArtifactRecord, parse_tag, sort_by_recency};
use crate::client::ClientConfig;
use crate::config::{Config, ConnectionConfig};
use crate::digest::Digest;
use crate::error::{Result, TagWatchError};
use crate::fanout::fan_out;
use crate::repository::resolve;
use std::sync::Arc;
use tracing::debug;

/// Image-catalog service for one registry connection.
///
/// Nothing is cached between calls: every branch of [`TagWatch::fetch`] and
/// every [`TagWatch::tag_digest`] probes the registry and negotiates
/// authentication from scratch.
#[derive(Debug, Clone)]
pub struct TagWatch {
    config: Arc<ConnectionConfig>,
    client_config: ClientConfig,
}

impl TagWatch {
    /// Creates a service with default HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the connection settings are invalid.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        Self::with_client_config(config, ClientConfig::default())
    }

    /// Creates a service with custom HTTP settings.
    pub fn with_client_config(config: ConnectionConfig, client_config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            client_config,
        })
    }

    /// Create a builder for advanced configuration.
    pub fn builder() -> TagWatchBuilder {
        TagWatchBuilder::new()
    }

    /// Returns the connection settings this service is bound to.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Fetches the tags of `repository` once per branch and returns the
    /// merged records, most recent first.
    ///
    /// Branches are fetched concurrently. A failed branch only turns into an
    /// error when no branch produced any record.
    pub async fn fetch<I, S>(&self, repository: &str, branches: I) -> Result<Vec<ArtifactRecord>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut records = fan_out(branches, |branch| {
            let config = Arc::clone(&self.config);
            let client_config = self.client_config.clone();
            let repository = repository.to_string();
            async move { fetch_branch(&config, &client_config, &repository, &branch).await }
        })
        .await?;

        sort_by_recency(&mut records);
        Ok(records)
    }

    /// Resolves `tag` of `repository` to its manifest digest.
    ///
    /// # Errors
    ///
    /// Propagates the first failure: `Config`, `AuthDiscovery`,
    /// `Authentication`, or `Transport` (including an unknown tag).
    pub async fn tag_digest(&self, repository: &str, tag: &str) -> Result<Digest> {
        let handle = resolve(&self.config, &self.client_config, repository).await?;
        handle.tag_digest(tag).await
    }

    /// Formats `base_url/[namespace/]repository:tag` without network access.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagwatch::{ConnectionConfig, TagWatch};
    ///
    /// let config = ConnectionConfig::new("https://reg.example.com").with_namespace("team");
    /// let tagwatch = TagWatch::new(config).unwrap();
    /// assert_eq!(
    ///     tagwatch.full_reference("svc", "v1"),
    ///     "https://reg.example.com/team/svc:v1"
    /// );
    /// ```
    pub fn full_reference(&self, repository: &str, tag: &str) -> String {
        format!(
            "{}/{}:{}",
            self.config.registry_url(),
            self.config.qualified_repository(repository),
            tag
        )
    }
}

/// Resolve, list and parse for a single branch.
async fn fetch_branch(
    config: &ConnectionConfig,
    client_config: &ClientConfig,
    repository: &str,
    branch: &str,
) -> Result<Vec<ArtifactRecord>> {
    let handle = resolve(config, client_config, repository).await?;
    let tags = handle.list_tags().await?;
    debug!(repository, branch, tags = tags.len(), "listed tags");

    Ok(tags.iter().filter_map(|tag| parse_tag(branch, tag)).collect())
}

/// Builder for creating a configured [`TagWatch`] instance.
///
/// # Examples
///
/// ```
/// use libtagwatch::TagWatch;
///
/// let tagwatch = TagWatch::builder()
///     .registry_url("https://reg.example.com")
///     .with_namespace("team")
///     .with_credentials("robot", "s3cret")
///     .build()
///     .unwrap();
/// assert_eq!(tagwatch.config().namespace.as_deref(), Some("team"));
/// ```
#[derive(Debug, Default)]
pub struct TagWatchBuilder {
    connection: ConnectionConfig,
    client_config: ClientConfig,
}

impl TagWatchBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the registry base URL (required).
    pub fn registry_url(mut self, url: &str) -> Self {
        self.connection.base_url = url.to_string();
        self
    }

    /// Set basic credentials used for token exchange or basic auth.
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.connection = self.connection.with_credentials(username, password);
        self
    }

    /// Set the namespace prefixed to every repository name.
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.connection = self.connection.with_namespace(namespace);
        self
    }

    /// Set HTTP client settings.
    pub fn with_client_config(mut self, client_config: ClientConfig) -> Self {
        self.client_config = client_config;
        self
    }

    /// Use a loaded configuration for both connection and network settings.
    pub fn with_config(mut self, config: Config) -> Self {
        self.client_config = config.client_config();
        self.connection = config.registry;
        self
    }

    /// Build the service.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if no registry URL was set or it is invalid.
    pub fn build(self) -> Result<TagWatch> {
        if self.connection.base_url.is_empty() {
            return Err(TagWatchError::config("Registry URL is required"));
        }
        TagWatch::with_client_config(self.connection, self.client_config)
    }
}
