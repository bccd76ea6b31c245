//! tagwatch - Image catalog fetching for OCI registries
//!
//! tagwatch lists the tags of a repository on an OCI-compliant registry,
//! parses the `<unix-seconds>-<revision>` tag convention into
//! [`ArtifactRecord`]s and returns them newest first. Listings for several
//! caller-defined branches are fetched concurrently and merged on a
//! best-effort basis.
//!
//! # Quick Start
//!
//! ```no_run
//! use libtagwatch::{ConnectionConfig, TagWatch};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tagwatch = TagWatch::new(ConnectionConfig::new("http://localhost:5000"))?;
//!
//!     let records = tagwatch.fetch("svc", ["main", "develop"]).await?;
//!     for record in records {
//!         println!("{} {:?}", record.tag, record.last_modified());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Main Types
//!
//! - [`TagWatch`] - Entry point bound to one registry connection
//! - [`ConnectionConfig`] - Base URL, namespace and credentials
//! - [`ArtifactRecord`] - One parsed tag
//! - [`Digest`] - Manifest digest returned by tag lookups
//! - [`TagWatchError`] - Error type shared by every operation

#![warn(clippy::all)]

/// Returns the libtagwatch crate version.
///
/// # Examples
///
/// ```
/// let version = libtagwatch::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// High-level public API (main entry point)
mod tagwatch;
pub use tagwatch::{TagWatch, TagWatchBuilder};

// Re-export commonly used types for convenience
pub use artifact::ArtifactRecord;
pub use auth::{CredentialStore, Credentials};
pub use client::ClientConfig;
pub use config::{Config, ConnectionConfig};
pub use digest::Digest;
pub use error::{Result, TagWatchError};

// Low-level implementation modules (hidden from docs but still public)
pub mod artifact;
#[doc(hidden)]
pub mod auth;
#[doc(hidden)]
pub mod client;
pub mod config;
#[doc(hidden)]
pub mod digest;
pub mod error;
#[doc(hidden)]
pub mod fanout;
#[doc(hidden)]
pub mod reference;
#[doc(hidden)]
pub mod repository;
