//! Per-request authorization built from a probe's challenges.

use super::{AuthScheme, ChallengeSet, CredentialStore, token};
use crate::error::{Result, TagWatchError};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client as ReqwestClient, RequestBuilder};
use std::sync::Arc;
use url::Url;

/// Decorates registry requests with the credentials a registry asked for.
///
/// A Bearer challenge wins over a Basic one. Nothing is cached: every call to
/// [`Authorizer::authorize`] performs a fresh token exchange.
#[derive(Clone)]
pub struct Authorizer {
    http_client: ReqwestClient,
    registry_url: Url,
    challenges: ChallengeSet,
    store: Arc<dyn CredentialStore>,
    scope: String,
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("registry_url", &self.registry_url.as_str())
            .field("challenges", &self.challenges)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl Authorizer {
    /// Creates an authorizer for requests scoped to `scope`.
    pub fn new(
        http_client: ReqwestClient,
        registry_url: Url,
        challenges: ChallengeSet,
        store: Arc<dyn CredentialStore>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            registry_url,
            challenges,
            store,
            scope: scope.into(),
        }
    }

    /// Returns the challenges this authorizer answers.
    pub fn challenges(&self) -> &ChallengeSet {
        &self.challenges
    }

    /// Computes the `Authorization` header value for the next request.
    ///
    /// Returns `None` when the registry advertised no supported challenge.
    pub async fn header_value(&self) -> Result<Option<String>> {
        if let Some(challenge) = self.challenges.find(&AuthScheme::Bearer) {
            let token =
                token::fetch_token(&self.http_client, challenge, &self.scope, self.store.as_ref())
                    .await?;
            return Ok(Some(format!("Bearer {}", token)));
        }

        if self.challenges.find(&AuthScheme::Basic).is_some() {
            let header = self
                .store
                .basic(&self.registry_url)
                .map(|c| c.to_header_value())
                .ok_or_else(|| {
                    TagWatchError::authentication(
                        "Registry requires basic authentication but no credentials are configured",
                        Some(401),
                    )
                })?;
            return Ok(Some(header));
        }

        Ok(None)
    }

    /// Adds the negotiated `Authorization` header to `request`.
    pub async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.header_value().await? {
            Some(header) => request.header(AUTHORIZATION, header),
            None => request,
        })
    }
}
