//! Index file persistence: parsing, serialization, and invariant enforcement.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::index::{IndexBuilder, SymbolIndex};
use crate::types::{Scope, SourceDigest, SymbolEntry};

/// Format version written by this build. Files with any other version are rejected.
pub const FORMAT_VERSION: u32 = 1;

/// A navtree file the index was built from, with its digest at build time.
#[allow(clippy::arbitrary_source_item_ordering, reason = "field order drives Ord")]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceRecord {
    /// Path relative to the project root. Declared first so `Ord` sorts by path.
    pub path: PathBuf,
    /// Digest of the file content when the index was built.
    pub digest: SourceDigest,
}

/// A scope and its members, in registration order.
#[allow(clippy::arbitrary_source_item_ordering, reason = "field order is the on-disk key order")]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopeRecord {
    /// Scope display name.
    pub name: String,
    /// Page holding the scope's documentation.
    pub document: String,
    /// Members in registration order.
    #[serde(default)]
    pub entries: Vec<SymbolEntry>,
}

/// The index file as a whole. Scopes and entries keep registration order;
/// sources are sorted by path. Constructed via `IndexFile::from_index()` or
/// `IndexFile::parse()`, the latter of which re-validates every invariant.
#[allow(clippy::arbitrary_source_item_ordering, reason = "field order is the on-disk key order")]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexFile {
    /// File format version.
    pub version: u32,
    /// Navtree files the index was built from.
    #[serde(default)]
    pub sources: Vec<SourceRecord>,
    /// Scopes in registration order.
    #[serde(default)]
    pub scopes: Vec<ScopeRecord>,
}

impl IndexFile {
    /// Snapshot a built index together with the sources it came from.
    pub fn from_index(index: &SymbolIndex, mut sources: Vec<SourceRecord>) -> Self {
        sources.sort();
        sources.dedup_by(|a, b| return a.path == b.path);
        let scopes = index
            .scopes()
            .map(|scope| {
                return ScopeRecord {
                    document: scope.document.clone(),
                    entries: index.entries_for(&scope.name).cloned().collect(),
                    name: scope.name.clone(),
                };
            })
            .collect();
        return Self {
            scopes,
            sources,
            version: FORMAT_VERSION,
        };
    }

    /// Rebuild the in-memory index.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexCorrupt` if the records violate an index
    /// invariant (duplicate anchors, conflicting scopes).
    pub fn to_index(&self) -> Result<SymbolIndex, Error> {
        let mut builder = IndexBuilder::new();
        for record in &self.scopes {
            builder
                .add_scope(Scope::new(record.name.as_str(), record.document.as_str()))
                .map_err(corrupt)?;
            for entry in &record.entries {
                builder
                    .add_entry(&record.name, &entry.name, entry.anchor.clone())
                    .map_err(corrupt)?;
            }
        }
        return Ok(builder.build());
    }

    /// Parse an index file from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the content is not valid TOML,
    /// or `Error::IndexCorrupt` if the version is unknown or invariants fail.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let file: Self = toml::from_str(content)?;
        file.validate()?;
        return Ok(file);
    }

    /// Parse an index file from its JSON export.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the content is not valid JSON,
    /// or `Error::IndexCorrupt` if the version is unknown or invariants fail.
    pub fn from_json(content: &str) -> Result<Self, Error> {
        let file: Self = serde_json::from_str(content)?;
        file.validate()?;
        return Ok(file);
    }

    /// Read and parse an index file from disk. A `.json` path is read as
    /// JSON, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures,
    /// `Error::TomlDe` or `Error::Json` if the content does not parse,
    /// or `Error::IndexCorrupt` if invariants fail.
    pub fn read(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::IndexNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        if is_json_path(path) {
            return Self::from_json(&content);
        }
        return Self::parse(&content);
    }

    /// Serialize to TOML.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlSer` if serialization fails.
    pub fn serialize(&self) -> Result<String, Error> {
        return Ok(toml::to_string_pretty(self)?);
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        return Ok(serde_json::to_string_pretty(self)?);
    }

    /// Write the index file to disk, creating parent directories. The
    /// format follows the extension the same way [`IndexFile::read`] does.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlSer` or `Error::Json` if serialization fails,
    /// or `Error::Io` if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let content = if is_json_path(path) { self.to_json()? } else { self.serialize()? };
        if let Some(parent) = path.parent().filter(|p| return !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        return Ok(());
    }

    /// Total number of entries across all scopes.
    pub fn entry_count(&self) -> usize {
        return self.scopes.iter().map(|s| return s.entries.len()).sum();
    }

    /// Check version, source ordering, and index invariants.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexCorrupt` describing the first problem found.
    fn validate(&self) -> Result<(), Error> {
        if self.version != FORMAT_VERSION {
            return Err(Error::IndexCorrupt {
                reason: format!(
                    "unsupported version {} (expected {FORMAT_VERSION})",
                    self.version
                ),
            });
        }
        enforce_source_ordering(&self.sources)?;
        self.to_index()?;
        return Ok(());
    }
}

/// True when `path` names a JSON index file.
fn is_json_path(path: &Path) -> bool {
    return path.extension().is_some_and(|ext| return ext.eq_ignore_ascii_case("json"));
}

/// Wrap a builder error found while reloading a file.
fn corrupt(e: Error) -> Error {
    return Error::IndexCorrupt { reason: e.to_string() };
}

/// Validate that source records are strictly sorted by path.
///
/// # Errors
///
/// Returns `Error::IndexCorrupt` if any adjacent pair is out of order.
fn enforce_source_ordering(sources: &[SourceRecord]) -> Result<(), Error> {
    for window in sources.windows(2) {
        let [first, second] = window else {
            continue;
        };
        if first.path >= second.path {
            return Err(Error::IndexCorrupt {
                reason: format!(
                    "sources not sorted: {} >= {}",
                    first.path.display(),
                    second.path.display(),
                ),
            });
        }
    }
    return Ok(());
}
