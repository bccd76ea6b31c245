//! Bearer token exchange against a challenge realm.

use super::{AuthChallenge, CredentialStore};
use crate::error::{Result, TagWatchError};
use reqwest::Client as ReqwestClient;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Client identifier sent with OAuth refresh-token grants.
const CLIENT_ID: &str = "tagwatch";

/// Body returned by a registry token service.
///
/// Docker-style services answer with `token`, OAuth2-style ones with
/// `access_token`; some send both.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    /// Returns the token to present as `Bearer`, preferring `token`.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.access_token.as_deref().filter(|t| !t.is_empty()))
    }
}

/// Trades credentials for a token scoped to `scope`.
pub(super) async fn fetch_token(
    http_client: &ReqwestClient,
    challenge: &AuthChallenge,
    scope: &str,
    store: &dyn CredentialStore,
) -> Result<String> {
    let realm = challenge.realm.as_deref().ok_or_else(|| {
        TagWatchError::authentication("Bearer challenge has no realm", None)
    })?;
    let realm = Url::parse(realm).map_err(|e| {
        TagWatchError::authentication(format!("Invalid token realm '{}': {}", realm, e), None)
    })?;
    let service = challenge.service.clone().unwrap_or_default();

    let request = match store.refresh_token(&realm, &service) {
        Some(refresh_token) => {
            debug!(realm = %realm, service = %service, "exchanging refresh token");
            let body = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("grant_type", "refresh_token")
                .append_pair("refresh_token", &refresh_token)
                .append_pair("service", &service)
                .append_pair("scope", scope)
                .append_pair("client_id", CLIENT_ID)
                .finish();
            http_client
                .post(realm.clone())
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body)
        }
        None => {
            let mut token_url = realm.clone();
            {
                let mut query = token_url.query_pairs_mut();
                if !service.is_empty() {
                    query.append_pair("service", &service);
                }
                query.append_pair("scope", scope);
            }
            debug!(realm = %realm, service = %service, scope, "requesting bearer token");

            let mut request = http_client.get(token_url);
            if let Some(header) = store.basic(&realm).map(|c| c.to_header_value()) {
                request = request.header(AUTHORIZATION, header);
            }
            request
        }
    };

    let response = request.send().await.map_err(|e| {
        TagWatchError::authentication(format!("Token request to {} failed: {}", realm, e), None)
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TagWatchError::authentication(
            format!("Token service {} rejected the request: {}", realm, body),
            Some(status.as_u16()),
        ));
    }

    let token_response: TokenResponse = response.json().await.map_err(|e| {
        TagWatchError::authentication(format!("Failed to parse token response: {}", e), None)
    })?;

    if let Some(refresh_token) = token_response.refresh_token.as_deref() {
        store.set_refresh_token(&realm, &service, refresh_token);
    }

    token_response
        .bearer_token()
        .map(str::to_string)
        .ok_or_else(|| {
            TagWatchError::authentication("Token response did not contain a token", None)
        })
}
