//! Artifact records and the tag naming convention.
//!
//! Tags that follow `<unix-seconds>-<revision>` carry build metadata. Tags
//! without a `-` are kept as bare records; tags whose part before the last
//! `-` is not an integer are dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;


/// One tag of a repository, labelled with the branch it was fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Raw tag as returned by the registry
    pub tag: String,
    /// Branch label of the fetch that produced this record
    pub branch: String,
    /// Revision parsed from the tag, empty when the tag carries no metadata
    pub revision: String,
    /// Build time parsed from the tag as Unix seconds, `None` when the tag
    /// carries no metadata
    pub last_modified_secs: Option<i64>,
}

impl ArtifactRecord {
    /// Returns the build time as a UTC date.
    ///
    /// `None` when the tag carries no metadata or its seconds fall outside the
    /// range chrono can represent. Such records still sort by their raw value.
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified_secs.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Parses a raw tag into a record for `branch`.
///
/// Returns `None` when the tag must be skipped: an empty tag, or a tag whose
/// text before the last `-` is not a Unix timestamp.
///
/// # Examples
///
/// ```
/// use libtagwatch::artifact::parse_tag;
///
/// let record = parse_tag("main", "1700000000-3f2a9c1").unwrap();
/// assert_eq!(record.revision, "3f2a9c1");
/// assert_eq!(record.last_modified_secs, Some(1_700_000_000));
///
/// let bare = parse_tag("main", "latest").unwrap();
/// assert!(bare.revision.is_empty() && bare.last_modified_secs.is_none());
///
/// assert!(parse_tag("main", "release-3f2a9c1").is_none());
/// ```
pub fn parse_tag(branch: &str, raw_tag: &str) -> Option<ArtifactRecord> {
    if raw_tag.is_empty() {
        return None;
    }

    let mut record = ArtifactRecord {
        tag: raw_tag.to_string(),
        branch: branch.to_string(),
        revision: String::new(),
        last_modified_secs: None,
    };

    if let Some((timestamp, revision)) = raw_tag.rsplit_once('-') {
        let Ok(secs) = timestamp.parse::<i64>() else {
            debug!(tag = raw_tag, branch, "skipping tag without a unix timestamp prefix");
            return None;
        };
        record.revision = revision.to_string();
        record.last_modified_secs = Some(secs);
    }

    Some(record)
}

/// Sorts records most recent first.
///
/// The sort is stable. Records without a timestamp sort after every
/// timestamped record and keep their relative order.
pub fn sort_by_recency(records: &mut [ArtifactRecord]) {
    records.sort_by(|a, b| b.last_modified_secs.cmp(&a.last_modified_secs));
}
