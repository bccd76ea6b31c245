//! Content digest validation.
//!
//! Wraps `oci_spec::image::Digest` so digests returned by the registry are
//! checked before they reach the caller.

use crate::error::{Result, TagWatchError};
use oci_spec::image::Digest as OciDigest;
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
mod tests;

/// A manifest content digest, e.g. `sha256:7173b8...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(OciDigest);

impl FromStr for Digest {
    type Err = TagWatchError;

    fn from_str(s: &str) -> Result<Self> {
        let oci_digest = OciDigest::from_str(s).map_err(|e| TagWatchError::Transport {
            message: format!("Invalid digest returned by registry: {}", e),
            status_code: None,
            source: Some(Box::new(e)),
        })?;
        Ok(Digest(oci_digest))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Digest {
    /// Returns the algorithm part, e.g. `sha256`.
    pub fn algorithm(&self) -> String {
        self.0.algorithm().to_string()
    }

    /// Returns the hex-encoded hash part.
    pub fn hex(&self) -> &str {
        self.0.digest()
    }
}
