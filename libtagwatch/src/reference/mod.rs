//! Repository name validation.
//!
//! Repository names are checked against the OCI reference grammar through
//! `oci_spec::distribution::Reference`: lowercase alphanumerics separated by
//! `.`, `_`, `-` and `/`, optionally preceded by a registry host.

use crate::error::{Result, TagWatchError};
use oci_spec::distribution::Reference as OciReference;
use std::fmt;
use std::str::FromStr;


/// A validated repository name, kept exactly as the caller spelled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl FromStr for RepositoryName {
    type Err = TagWatchError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(TagWatchError::config("Repository name cannot be empty"));
        }

        // A tag or digest suffix is a reference, not a repository name
        let last_component = s.rsplit('/').next().unwrap_or(s);
        if s.contains('@') || last_component.contains(':') {
            return Err(TagWatchError::config(format!(
                "Invalid repository name '{}': tag or digest suffix not allowed",
                s
            )));
        }

        OciReference::from_str(s).map_err(|e| {
            TagWatchError::config_with_source(format!("Invalid repository name '{}'", s), e)
        })?;

        Ok(RepositoryName(s.to_string()))
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl RepositoryName {
    /// Returns the name as used in registry URL paths.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the token scope granting pull access to this repository.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagwatch::reference::RepositoryName;
    ///
    /// let name: RepositoryName = "team/svc".parse().unwrap();
    /// assert_eq!(name.pull_scope(), "repository:team/svc:pull");
    /// ```
    pub fn pull_scope(&self) -> String {
        format!("repository:{}:pull", self.0)
    }
}
