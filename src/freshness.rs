//! Freshness checking of an index file against its navtree sources.

use std::path::Path;

use crate::hasher;
use crate::indexfile::SourceRecord;

/// Result of checking a single recorded source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    /// The digest matches the file on disk.
    Fresh,
    /// The file is gone or unreadable.
    Missing,
    /// The file changed since the index was built.
    Stale,
}

impl CheckResult {
    /// Fixed-width label for text output.
    pub const fn label(self) -> &'static str {
        return match self {
            CheckResult::Fresh => "FRESH  ",
            CheckResult::Missing => "MISSING",
            CheckResult::Stale => "STALE  ",
        };
    }
}

/// Re-hash one recorded source and compare.
pub fn compare_source_against_disk(root: &Path, record: &SourceRecord) -> CheckResult {
    let Ok(content) = std::fs::read_to_string(root.join(&record.path)) else {
        return CheckResult::Missing;
    };
    if hasher::digest(&content) == record.digest {
        return CheckResult::Fresh;
    }
    return CheckResult::Stale;
}

/// Check every recorded source, preserving record order.
pub fn check_all<'a>(root: &Path, records: &'a [SourceRecord]) -> Vec<(&'a SourceRecord, CheckResult)> {
    return records
        .iter()
        .map(|record| return (record, compare_source_against_disk(root, record)))
        .collect();
}
