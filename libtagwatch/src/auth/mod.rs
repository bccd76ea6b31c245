//! Authentication handling for OCI registries.
//!
//! Registries advertise how they want to be authenticated by answering an
//! unauthenticated `GET /v2/` with `401 Unauthorized` and one or more
//! `WWW-Authenticate` challenges. This module parses those challenges into a
//! [`ChallengeSet`] and turns them, together with a [`CredentialStore`], into
//! an [`Authorizer`] that decorates every registry request.

use crate::error::{Result, TagWatchError};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, WWW_AUTHENTICATE};
use url::Url;

mod authorizer;
mod token;


pub use authorizer::Authorizer;
pub use token::TokenResponse;

/// Username and password presented to Basic challenges and token realms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Creates Basic authentication credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagwatch::auth::Credentials;
    ///
    /// let creds = Credentials::basic("username", "password");
    /// assert!(creds.to_header_value().starts_with("Basic "));
    /// ```
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the `Authorization` header value for these credentials.
    pub fn to_header_value(&self) -> String {
        use base64::{Engine as _, engine::general_purpose};
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", general_purpose::STANDARD.encode(credentials))
    }
}

/// Source of credentials consulted during challenge negotiation.
///
/// The refresh-token slot lets a store keep OAuth refresh tokens between
/// exchanges; [`StaticCredentials`] never keeps one.
pub trait CredentialStore: Send + Sync {
    /// Returns the Basic credentials to present to `url`, if any.
    fn basic(&self, url: &Url) -> Option<Credentials>;

    /// Returns a refresh token previously stored for `realm` and `service`.
    fn refresh_token(&self, realm: &Url, service: &str) -> Option<String>;

    /// Offers a refresh token issued by `realm` for `service`.
    fn set_refresh_token(&self, realm: &Url, service: &str, token: &str);
}

/// Fixed username/password pair that never stores refresh tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCredentials {
    username: Option<String>,
    password: Option<String>,
}

impl StaticCredentials {
    /// Creates a store from optional configuration values.
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        Self { username, password }
    }
}

impl CredentialStore for StaticCredentials {
    fn basic(&self, _url: &Url) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), password) if !username.is_empty() => Some(Credentials::basic(
                username.clone(),
                password.clone().unwrap_or_default(),
            )),
            _ => None,
        }
    }

    fn refresh_token(&self, _realm: &Url, _service: &str) -> Option<String> {
        None
    }

    fn set_refresh_token(&self, _realm: &Url, _service: &str, _token: &str) {}
}

/// Authentication scheme named by a challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
    Bearer,
    /// Any scheme this crate cannot answer; kept for diagnostics
    Other(String),
}

impl AuthScheme {
    fn parse(scheme: &str) -> Self {
        if scheme.eq_ignore_ascii_case("basic") {
            Self::Basic
        } else if scheme.eq_ignore_ascii_case("bearer") {
            Self::Bearer
        } else {
            Self::Other(scheme.to_string())
        }
    }
}

/// Information parsed from a WWW-Authenticate header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    /// The authentication scheme
    pub scheme: AuthScheme,

    /// The authentication realm (token endpoint URL for Bearer)
    pub realm: Option<String>,

    /// The service identifier
    pub service: Option<String>,

    /// The scope being requested
    pub scope: Option<String>,
}

impl AuthChallenge {
    /// Parses a single WWW-Authenticate header value.
    ///
    /// Example header: `Bearer realm="https://auth.example.com/token",service="registry.example.com"`
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagwatch::auth::{AuthChallenge, AuthScheme};
    ///
    /// let header = r#"Bearer realm="https://auth.example.com/token",service="registry""#;
    /// let challenge = AuthChallenge::parse(header).unwrap();
    /// assert_eq!(challenge.scheme, AuthScheme::Bearer);
    /// ```
    pub fn parse(header: &str) -> Result<Self> {
        let header = header.trim();
        if header.is_empty() {
            return Err(TagWatchError::auth_discovery(
                "Empty WWW-Authenticate header",
            ));
        }

        let (scheme, params) = header.split_once(' ').unwrap_or((header, ""));
        let scheme = AuthScheme::parse(scheme);

        let mut realm = None;
        let mut service = None;
        let mut scope = None;

        for (key, value) in split_params(params)? {
            match key.to_ascii_lowercase().as_str() {
                "realm" => realm = Some(value),
                "service" => service = Some(value),
                "scope" => scope = Some(value),
                _ => {}
            }
        }

        if scheme == AuthScheme::Bearer && realm.is_none() {
            return Err(TagWatchError::auth_discovery(
                "Bearer challenge missing required 'realm' parameter",
            ));
        }

        Ok(Self {
            scheme,
            realm,
            service,
            scope,
        })
    }
}

/// Splits `key="value", key=value` pairs, honoring commas inside quotes.
fn split_params(params: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    let mut rest = params.trim();

    while !rest.is_empty() {
        let (key, after_key) = rest.split_once('=').ok_or_else(|| {
            TagWatchError::auth_discovery(format!(
                "Malformed WWW-Authenticate parameter: {}",
                rest
            ))
        })?;
        let after_key = after_key.trim_start();

        let (value, remainder) = if let Some(quoted) = after_key.strip_prefix('"') {
            let end = quoted.find('"').ok_or_else(|| {
                TagWatchError::auth_discovery("Unterminated quoted value in WWW-Authenticate")
            })?;
            (&quoted[..end], &quoted[end + 1..])
        } else {
            let end = after_key.find(',').unwrap_or(after_key.len());
            (after_key[..end].trim(), &after_key[end..])
        };

        pairs.push((key.trim().to_string(), value.to_string()));
        rest = remainder.trim_start().trim_start_matches(',').trim_start();
    }

    Ok(pairs)
}

/// Challenges advertised by one registry probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChallengeSet {
    challenges: Vec<AuthChallenge>,
}

impl ChallengeSet {
    /// Builds the set from a `/v2/` probe response.
    ///
    /// Only a `401` carries challenges; any other status means the registry
    /// accepts anonymous requests.
    pub fn from_response(status: StatusCode, headers: &HeaderMap) -> Result<Self> {
        if status != StatusCode::UNAUTHORIZED {
            return Ok(Self::default());
        }

        let mut challenges = Vec::new();
        for value in headers.get_all(WWW_AUTHENTICATE) {
            let value = value.to_str().map_err(|e| {
                TagWatchError::auth_discovery_with_source("Non-ASCII WWW-Authenticate header", e)
            })?;
            challenges.push(AuthChallenge::parse(value)?);
        }

        if challenges.is_empty() {
            return Err(TagWatchError::auth_discovery(
                "Registry answered 401 without a WWW-Authenticate challenge",
            ));
        }

        Ok(Self { challenges })
    }

    /// Creates a set from already parsed challenges.
    pub fn from_challenges(challenges: Vec<AuthChallenge>) -> Self {
        Self { challenges }
    }

    /// Returns the first challenge of the given scheme.
    pub fn find(&self, scheme: &AuthScheme) -> Option<&AuthChallenge> {
        self.challenges.iter().find(|c| &c.scheme == scheme)
    }

    /// Returns true when the registry did not ask for authentication.
    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuthChallenge> {
        self.challenges.iter()
    }
}
