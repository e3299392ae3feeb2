/// Crate-level error types for navdex diagnostics.
use std::path::PathBuf;

/// All errors in navdex carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, scope, or reason for failure.
/// A lookup that finds nothing is not an error and has no variant here.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A config file was named explicitly but does not exist.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// Two anchors collided while building an index.
    #[error("duplicate anchor `{anchor}` (already used by `{existing}`, now `{scope}::{name}`)")]
    DuplicateAnchor {
        /// The anchor href registered twice.
        anchor: String,
        /// Qualified name of the entry that already owns the anchor.
        existing: String,
        /// Member name of the rejected entry.
        name: String,
        /// Scope of the rejected entry.
        scope: String,
    },

    /// A scope name was registered twice with different documents.
    #[error("scope `{name}` registered for both {existing} and {document}")]
    DuplicateScope {
        /// Document of the rejected registration.
        document: String,
        /// Document of the first registration.
        existing: String,
        /// Scope display name.
        name: String,
    },

    /// A configured navtree source does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Index file exists but cannot be trusted.
    #[error("index corrupt: {reason}")]
    IndexCorrupt {
        /// Description of the corruption.
        reason: String,
    },

    /// Expected index file does not exist on disk.
    #[error("index not found: {}", path.display())]
    IndexNotFound {
        /// Path to the missing index file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON (de)serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A navtree file does not have the `var NAME = [...];` shape.
    #[error("malformed navtree: {}: {reason}", file.display())]
    NavtreeMalformed {
        /// File that failed to load.
        file: PathBuf,
        /// What was wrong and where in the tree.
        reason: String,
    },

    /// `.navdex.toml` exists but cannot be edited.
    #[error("config parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// Config file that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The source path is already listed in the config.
    #[error("source already configured: `{path}`")]
    SourceAlreadyConfigured {
        /// Source path as written in the config.
        path: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// TOML serialization failed.
    #[error("toml serialize: {0}")]
    TomlSer(
        /// The wrapped TOML serialization error.
        #[from]
        toml::ser::Error,
    ),

    /// An entry named a scope that was never registered.
    #[error("unknown scope `{scope}` for entry `{name}`")]
    UnknownScope {
        /// Member name of the rejected entry.
        name: String,
        /// Scope name the entry referred to.
        scope: String,
    },

    /// The source path is not listed in the config.
    #[error("unknown source: `{path}`")]
    UnknownSource {
        /// Source path that was not found.
        path: String,
    },

    /// `export --format` named something other than toml or json.
    #[error("unsupported export format: {format}")]
    UnsupportedFormat {
        /// The requested format.
        format: String,
    },

    /// The filesystem watcher could not be set up.
    #[error("watch failed: {reason}")]
    WatchFailed {
        /// Description of the watcher failure.
        reason: String,
    },
}
