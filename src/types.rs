/// Core domain types for navdex scopes, entries, anchors, and digests.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque location inside a documentation page, stored verbatim as the
/// generator's href (`document.html#fragment`). Unique across an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Anchor(
    /// The href exactly as the navtree recorded it.
    pub String,
);

impl Anchor {
    /// The href string.
    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

/// A named grouping of documented members, usually a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Page holding the scope's documentation, e.g. `class_tg_bot_1_1_api.html`.
    pub document: String,
    /// Display name, possibly namespace-qualified (`TgBot::Api`).
    pub name: String,
}

impl Scope {
    /// Create a scope from its display name and document page.
    pub fn new(name: impl Into<String>, document: impl Into<String>) -> Self {
        return Self {
            document: document.into(),
            name: name.into(),
        };
    }

    /// Last `::` segment of the display name: `TgBot::Api` -> `Api`.
    pub fn short_name(&self) -> &str {
        return match self.name.rsplit_once("::") {
            Some((_, short)) => short,
            None => &self.name,
        };
    }
}

/// One documented member of a scope. Overloads share `name` but never `anchor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    /// Method, field, or constructor name.
    pub name: String,
    /// Where the member is documented.
    pub anchor: Anchor,
}

/// SHA-256 of a navtree source file: 64 lowercase hex chars.
/// Newtype prevents mixing with arbitrary strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceDigest(
    /// The hex-encoded SHA-256 digest string.
    pub String,
);
