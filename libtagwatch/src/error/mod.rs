//! Error types for tagwatch
//!
//! Every fallible operation in the crate returns [`TagWatchError`]. The
//! variants map onto the stages of a fetch: configuration and name
//! validation, challenge discovery, credential exchange, and the registry
//! calls themselves.

use thiserror::Error;

#[cfg(test)]
mod tests;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for tagwatch operations
#[derive(Error, Debug)]
pub enum TagWatchError {
    /// Configuration errors (malformed repository name, invalid base URL)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The `/v2/` probe failed or advertised an unusable challenge
    #[error("Authentication discovery error: {message}")]
    AuthDiscovery {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Credential exchange failed (token endpoint, 401, 403)
    #[error("Authentication error (status: {status_code:?}): {message}")]
    Authentication {
        message: String,
        status_code: Option<u16>,
    },

    /// Tag listing or digest lookup failed
    #[error("Transport error (status: {status_code:?}): {message}")]
    Transport {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<BoxedSource>,
    },
}

/// Result type alias for tagwatch operations
pub type Result<T> = std::result::Result<T, TagWatchError>;

impl TagWatchError {
    /// Creates a new configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagwatch::error::TagWatchError;
    ///
    /// let err = TagWatchError::config("invalid repository name");
    /// assert!(matches!(err, TagWatchError::Config { .. }));
    /// ```
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    pub fn config_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new authentication discovery error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagwatch::error::TagWatchError;
    ///
    /// let err = TagWatchError::auth_discovery("missing WWW-Authenticate header");
    /// assert!(matches!(err, TagWatchError::AuthDiscovery { .. }));
    /// ```
    pub fn auth_discovery<S: Into<String>>(message: S) -> Self {
        Self::AuthDiscovery {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new authentication discovery error with a source error.
    pub fn auth_discovery_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::AuthDiscovery {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new authentication error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagwatch::error::TagWatchError;
    ///
    /// let err = TagWatchError::authentication("invalid credentials", Some(401));
    /// assert!(matches!(err, TagWatchError::Authentication { .. }));
    /// ```
    pub fn authentication<S: Into<String>>(message: S, status_code: Option<u16>) -> Self {
        Self::Authentication {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new transport error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagwatch::error::TagWatchError;
    ///
    /// let err = TagWatchError::transport("manifest unknown", Some(404));
    /// assert!(matches!(err, TagWatchError::Transport { .. }));
    /// ```
    pub fn transport<S: Into<String>>(message: S, status_code: Option<u16>) -> Self {
        Self::Transport {
            message: message.into(),
            status_code,
            source: None,
        }
    }

    /// Creates a new transport error with a source error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagwatch::error::TagWatchError;
    /// use std::io;
    ///
    /// let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
    /// let err = TagWatchError::transport_with_source("failed to connect", io_err);
    /// assert!(matches!(err, TagWatchError::Transport { .. }));
    /// ```
    pub fn transport_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: message.into(),
            status_code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Returns the HTTP status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { status_code, .. } | Self::Transport { status_code, .. } => {
                *status_code
            }
            Self::Config { .. } | Self::AuthDiscovery { .. } => None,
        }
    }
}
