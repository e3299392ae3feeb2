use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Error;
use crate::hasher;
use crate::index::{IndexBuilder, SymbolIndex};
use crate::indexfile::SourceRecord;
use crate::navtree;

/// A navtree file ready to load.
#[derive(Debug, Clone)]
pub struct NavtreeSource {
    /// Raw file content.
    pub content: String,
    /// Path relative to the project root.
    pub path: PathBuf,
}

/// Collect every navtree named by the config's `sources`.
///
/// A source that is a file is taken as-is and must be a navtree. A source
/// that is a directory is walked for `.js` files; those are filtered by the
/// config's include/exclude prefixes and silently skipped when they are not
/// navtrees (search data, jQuery, and the like). Results are sorted by path.
///
/// # Errors
///
/// Returns `Error::FileNotFound` for a configured source that does not exist,
/// or `Error::Io` if a file cannot be read.
pub fn discover(root: &Path, config: &Config) -> Result<Vec<NavtreeSource>, Error> {
    let mut found: Vec<NavtreeSource> = Vec::new();

    for source in &config.sources {
        let source_path = root.join(source);
        if source_path.is_file() {
            let content = std::fs::read_to_string(&source_path)?;
            found.push(NavtreeSource {
                content,
                path: normalize_path(Path::new(source)),
            });
        } else if source_path.is_dir() {
            discover_in_directory(root, &source_path, config, &mut found)?;
        } else {
            return Err(Error::FileNotFound { path: source_path });
        }
    }

    found.sort_by(|a, b| return a.path.cmp(&b.path));
    found.dedup_by(|a, b| return a.path == b.path);
    return Ok(found);
}

/// Walk one source directory for navtree scripts.
///
/// # Errors
///
/// Returns `Error::Io` if a candidate file cannot be read.
fn discover_in_directory(
    root: &Path,
    dir: &Path,
    config: &Config,
    found: &mut Vec<NavtreeSource>,
) -> Result<(), Error> {
    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file())
        .filter(|e| return e.path().extension().is_some_and(|ext| return ext == "js"))
    {
        let js_path = entry.path();
        let relative = normalize_path(js_path.strip_prefix(root).unwrap_or(js_path));
        if !config.should_scan(&relative.to_string_lossy()) {
            continue;
        }

        let content = std::fs::read_to_string(js_path)?;
        if !navtree::looks_like_navtree(&content) {
            tracing::debug!(path = %relative.display(), "not a navtree, skipping");
            continue;
        }
        found.push(NavtreeSource { content, path: relative });
    }
    return Ok(());
}

/// Load every source into one index, recording each file's digest.
///
/// # Errors
///
/// Returns `Error::NavtreeMalformed` or builder errors from loading.
pub fn build_index(sources: &[NavtreeSource]) -> Result<(SymbolIndex, Vec<SourceRecord>), Error> {
    let mut builder = IndexBuilder::new();
    let mut records = Vec::with_capacity(sources.len());

    for source in sources {
        let summary = navtree::load(&mut builder, &source.path, &source.content)?;
        if summary.skipped_duplicates > 0 {
            tracing::info!(
                path = %source.path.display(),
                skipped = summary.skipped_duplicates,
                "merged entries already indexed from another navtree"
            );
        }
        records.push(SourceRecord {
            digest: hasher::digest(&source.content),
            path: source.path.clone(),
        });
    }

    return Ok((builder.build(), records));
}

/// Collapse `.` and `..` components in a path without touching the filesystem.
/// Preserves leading `..` when there is nothing left to pop.
fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<std::path::Component<'_>> = Vec::new();
    for component in path.components() {
        push_normalized_component(&mut components, component);
    }
    return components.iter().collect();
}

/// Handle a single path component during normalization.
/// Pops the last component for `..` when possible, preserves it otherwise.
fn push_normalized_component<'a>(
    components: &mut Vec<std::path::Component<'a>>,
    component: std::path::Component<'a>,
) {
    match component {
        std::path::Component::CurDir => {},
        std::path::Component::ParentDir => {
            let can_pop = matches!(
                components.last(),
                Some(c) if !matches!(c, std::path::Component::ParentDir)
            );
            if can_pop { components.pop(); } else { components.push(component); }
        },
        other => components.push(other),
    }
}
