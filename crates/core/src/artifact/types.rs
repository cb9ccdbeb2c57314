//! Artifact types.

use std::cmp::Ordering;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

static STAMP_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})(?:-(\d{2})\.(\d{2}))?").ok());

/// A backup file produced by an external system.
///
/// Identified by its file name. The name usually carries a timestamp such as
/// `bckfdb-2024-01-02-03.30.7z`, which drives newest-first ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// File name, used as the tracking identifier.
    pub id: String,
    /// Full path of the artifact.
    pub path: PathBuf,
    /// Filesystem modification time.
    pub modified: DateTime<Utc>,
    /// Timestamp encoded in the file name, if any.
    pub stamp: Option<NaiveDateTime>,
}

impl Artifact {
    pub fn new(path: PathBuf, modified: DateTime<Utc>) -> Self {
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stamp = parse_name_stamp(&id);
        Self {
            id,
            path,
            modified,
            stamp,
        }
    }

    /// Ordering used to pick the newest artifact.
    ///
    /// Name timestamp first, then modification time, then name. Artifacts without
    /// a name timestamp sort older than any artifact with one.
    pub fn recency_cmp(&self, other: &Self) -> Ordering {
        self.stamp
            .cmp(&other.stamp)
            .then_with(|| self.modified.cmp(&other.modified))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Sorts artifacts newest first.
pub fn sort_newest_first(artifacts: &mut [Artifact]) {
    artifacts.sort_by(|a, b| b.recency_cmp(a));
}

/// Extracts a `YYYY-MM-DD[-HH.MM]` timestamp from a file name.
pub fn parse_name_stamp(name: &str) -> Option<NaiveDateTime> {
    let re = STAMP_RE.as_ref()?;
    let caps = re.captures(name)?;
    let date = NaiveDate::parse_from_str(caps.get(1)?.as_str(), "%Y-%m-%d").ok()?;
    let hour = caps
        .get(2)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0);
    let minute = caps
        .get(3)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0);
    // An impossible time still leaves a usable date.
    date.and_hms_opt(hour, minute, 0)
        .or_else(|| date.and_hms_opt(0, 0, 0))
}
