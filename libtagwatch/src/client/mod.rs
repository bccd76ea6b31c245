//! HTTP client for OCI registry communication.
//!
//! A thin layer over reqwest implementing the three Distribution API calls
//! tagwatch needs: the `/v2/` challenge probe, tag enumeration and
//! tag-to-digest resolution. Every authenticated call goes through an
//! [`Authorizer`].

use crate::auth::{Authorizer, ChallengeSet};
use crate::digest::Digest;
use crate::error::{Result, TagWatchError};
use reqwest::header::{ACCEPT, HeaderMap, LINK};
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use serde::Deserialize;
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use url::Url;


/// Manifest media types accepted when resolving a tag.
const MANIFEST_ACCEPT: &str = "application/vnd.oci.image.manifest.v1+json, \
     application/vnd.oci.image.index.v1+json, \
     application/vnd.docker.distribution.manifest.v2+json, \
     application/vnd.docker.distribution.manifest.list.v2+json";

const CONTENT_DIGEST: &str = "Docker-Content-Digest";

/// Response from the tags list API endpoint.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    /// List of tag names; registries send `null` for an empty repository
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use libtagwatch::client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_timeout(60)
///     .with_max_idle_per_host(20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Maximum idle connections per host (default: 10)
    pub max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_idle_per_host: 10,
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the maximum idle connections per host.
    pub fn with_max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }
}

/// HTTP client for one registry.
#[derive(Debug, Clone)]
pub struct Client {
    /// The underlying HTTP client
    http_client: ReqwestClient,
    /// Base registry URL without trailing slash (e.g., "https://registry.example.com")
    registry_url: String,
}

impl Client {
    /// Creates a client for `registry_url`.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagwatch::client::{Client, ClientConfig};
    ///
    /// let config = ClientConfig::default();
    /// let client = Client::with_config("http://localhost:5000/", &config).unwrap();
    /// assert_eq!(client.registry_url(), "http://localhost:5000");
    /// ```
    pub fn with_config(registry_url: &str, config: &ClientConfig) -> Result<Self> {
        let registry_url = registry_url.trim().trim_end_matches('/');
        if registry_url.is_empty() {
            return Err(TagWatchError::config("Registry URL cannot be empty"));
        }

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| TagWatchError::config_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            registry_url: registry_url.to_string(),
        })
    }

    /// Returns the base registry URL.
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// Returns the underlying reqwest client, shared with token exchanges.
    pub fn http_client(&self) -> &ReqwestClient {
        &self.http_client
    }

    /// Parses the base registry URL.
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.registry_url).map_err(|e| {
            TagWatchError::config_with_source(
                format!("Invalid registry URL: {}", self.registry_url),
                e,
            )
        })
    }

    /// Builds the absolute URL of an API `path` below the base URL.
    fn endpoint(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}{}", self.registry_url, path)).map_err(|e| {
            TagWatchError::config_with_source(
                format!("Invalid registry URL: {}", self.registry_url),
                e,
            )
        })
    }

    /// Sends an unauthenticated `GET /v2/` and collects the advertised challenges.
    ///
    /// # Errors
    ///
    /// Returns an `AuthDiscovery` error if the registry is unreachable or
    /// answers `401` with a missing or malformed challenge.
    pub async fn probe(&self) -> Result<ChallengeSet> {
        let url = format!("{}/v2/", self.registry_url);

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            TagWatchError::auth_discovery_with_source(
                format!("Failed to probe registry at {}", url),
                e,
            )
        })?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "registry probe answered");

        let challenges = ChallengeSet::from_response(status, response.headers())?;
        for challenge in challenges.iter() {
            debug!(scheme = ?challenge.scheme, service = ?challenge.service, "challenge advertised");
        }
        Ok(challenges)
    }

    /// Fetches every tag of `repository`, following `Link` pagination.
    ///
    /// Relative `Link` targets are resolved against the page that returned
    /// them. Pagination stops when a link points at a page already fetched.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is unreachable, the authorization
    /// exchange fails, the repository does not exist or a page cannot be
    /// decoded.
    pub async fn fetch_tags(
        &self,
        repository: &str,
        authorizer: &Authorizer,
    ) -> Result<Vec<String>> {
        let mut all_tags = Vec::new();
        let mut url = self.endpoint(&format!("/v2/{}/tags/list", repository))?;
        let mut visited = HashSet::new();

        loop {
            debug!(url = %url, "fetching tag page");
            visited.insert(url.clone());
            let request = authorizer.authorize(self.http_client.get(url.clone())).await?;
            let response = request
                .send()
                .await
                .map_err(|e| Self::translate_reqwest_error(e, &self.registry_url))?;

            // Extract Link header before consuming the response
            let next = Self::extract_next_link(response.headers());

            let response = Self::check_response_status(response).await?;

            let page: TagsResponse = response.json().await.map_err(|e| {
                TagWatchError::transport_with_source("Failed to parse tags response", e)
            })?;

            all_tags.extend(page.tags.unwrap_or_default());

            let Some(next) = next else { break };
            let next = url.join(&next).map_err(|e| {
                TagWatchError::transport_with_source(
                    format!("Invalid pagination link from {}: {}", url, next),
                    e,
                )
            })?;
            if visited.contains(&next) {
                debug!(url = %next, "pagination link points at a fetched page");
                break;
            }
            url = next;
        }

        Ok(all_tags)
    }

    /// Resolves `tag` to its manifest digest with a `HEAD` request.
    ///
    /// # Errors
    ///
    /// Returns a `Transport` error if the tag does not exist or the registry
    /// answers without a valid `Docker-Content-Digest` header.
    pub async fn fetch_tag_digest(
        &self,
        repository: &str,
        tag: &str,
        authorizer: &Authorizer,
    ) -> Result<Digest> {
        let url = self.endpoint(&format!("/v2/{}/manifests/{}", repository, tag))?;

        let request = authorizer
            .authorize(self.http_client.head(url).header(ACCEPT, MANIFEST_ACCEPT))
            .await?;
        let response = request
            .send()
            .await
            .map_err(|e| Self::translate_reqwest_error(e, &self.registry_url))?;

        let response = Self::check_response_status(response).await?;

        let digest = response
            .headers()
            .get(CONTENT_DIGEST)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                TagWatchError::transport(
                    format!("Response for {}:{} missing {} header", repository, tag, CONTENT_DIGEST),
                    Some(response.status().as_u16()),
                )
            })?;

        Digest::from_str(digest)
    }

    /// Extracts the next page URL from the Link header.
    ///
    /// Format: `</v2/svc/tags/list?n=100&last=v99>; rel="next"`
    fn extract_next_link(headers: &HeaderMap) -> Option<String> {
        let link_str = headers.get(LINK)?.to_str().ok()?;

        for link_part in link_str.split(',') {
            let link_part = link_part.trim();

            if link_part.contains("rel=\"next\"") || link_part.contains("rel='next'") {
                if let Some(start) = link_part.find('<')
                    && let Some(end) = link_part.find('>')
                    && start < end
                {
                    return Some(link_part[start + 1..end].to_string());
                }
            }
        }

        None
    }

    /// Translates a reqwest error into a transport error.
    fn translate_reqwest_error(error: reqwest::Error, registry_url: &str) -> TagWatchError {
        if error.is_timeout() {
            TagWatchError::transport_with_source(
                format!("Request to {} timed out", registry_url),
                error,
            )
        } else if error.is_connect() {
            TagWatchError::transport_with_source(
                format!("Failed to connect to registry at {}", registry_url),
                error,
            )
        } else {
            TagWatchError::transport_with_source(
                format!("Network error communicating with {}", registry_url),
                error,
            )
        }
    }

    /// Checks the HTTP response status and translates failures.
    async fn check_response_status(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("(unable to read response body)"));

        match status {
            StatusCode::UNAUTHORIZED => Err(TagWatchError::authentication(
                format!("Authentication required for {}: {}", url, error_body),
                Some(401),
            )),
            StatusCode::FORBIDDEN => Err(TagWatchError::authentication(
                format!("Access forbidden for {}: {}", url, error_body),
                Some(403),
            )),
            StatusCode::NOT_FOUND => Err(TagWatchError::transport(
                format!("Not found: {}", url),
                Some(404),
            )),
            _ => Err(TagWatchError::transport(
                format!("HTTP {} from {}: {}", status.as_u16(), url, error_body),
                Some(status.as_u16()),
            )),
        }
    }
}
