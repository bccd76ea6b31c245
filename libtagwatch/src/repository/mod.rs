//! Repository resolution.
//!
//! [`resolve`] turns a repository name into an authenticated [`Repository`]
//! handle: it applies the namespace, validates the name, probes the registry
//! for its challenges and binds an [`Authorizer`] scoped to pulling that
//! repository. Each call builds its own HTTP client and probes again.

use crate::auth::{Authorizer, CredentialStore, StaticCredentials};
use crate::client::{Client, ClientConfig};
use crate::config::ConnectionConfig;
use crate::digest::Digest;
use crate::error::Result;
use crate::reference::RepositoryName;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;


/// Authenticated handle to one repository.
#[derive(Debug, Clone)]
pub struct Repository {
    client: Client,
    name: RepositoryName,
    authorizer: Authorizer,
}

impl Repository {
    /// Returns the qualified repository name.
    pub fn name(&self) -> &RepositoryName {
        &self.name
    }

    /// Returns the authorizer negotiated for this repository.
    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }

    /// Lists every tag of the repository.
    pub async fn list_tags(&self) -> Result<Vec<String>> {
        self.client
            .fetch_tags(self.name.as_str(), &self.authorizer)
            .await
    }

    /// Resolves `tag` to its manifest digest.
    pub async fn tag_digest(&self, tag: &str) -> Result<Digest> {
        self.client
            .fetch_tag_digest(self.name.as_str(), tag, &self.authorizer)
            .await
    }
}

/// Resolves `repository` against the registry described by `config`.
///
/// # Errors
///
/// - `Config` if the namespaced name is not a valid repository name
/// - `AuthDiscovery` if the `/v2/` probe fails or its challenge is malformed
pub async fn resolve(
    config: &ConnectionConfig,
    client_config: &ClientConfig,
    repository: &str,
) -> Result<Repository> {
    let name = RepositoryName::from_str(&config.qualified_repository(repository))?;
    let client = Client::with_config(config.registry_url(), client_config)?;

    let challenges = client.probe().await?;
    debug!(
        repository = %name,
        anonymous = challenges.is_empty(),
        "negotiated registry challenges"
    );

    let store: Arc<dyn CredentialStore> = Arc::new(StaticCredentials::new(
        config.username.clone(),
        config.password.clone(),
    ));
    let authorizer = Authorizer::new(
        client.http_client().clone(),
        client.base_url()?,
        challenges,
        store,
        name.pull_scope(),
    );

    Ok(Repository {
        client,
        name,
        authorizer,
    })
}
