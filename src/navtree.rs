//! Loader for Doxygen navtree tables (`var NAME = [ ... ];`).
//!
//! Each node is `[name, link | null, children | null]`. Nodes with children
//! become scopes, leaves become entries of the nearest enclosing scope.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::Error;
use crate::index::IndexBuilder;
use crate::types::{Anchor, Scope};

/// Matches the assignment header, after any leading comments, and captures
/// the variable name.
#[allow(clippy::expect_used, reason = "literal pattern")]
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^(?:\s*(?:/\*(?s:.*?)\*/|//[^\n]*))*\s*var\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*")
        .expect("valid header regex");
});

/// Matches the opening of a navtree body: an empty array, or a first node
/// whose name is a double-quoted string. Search data uses single quotes.
#[allow(clippy::expect_used, reason = "literal pattern")]
static BODY: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r#"^\s*\[\s*(?:\]|\[\s*")"#).expect("valid body regex"));

/// What a node's third element holds.
enum Children<'v> {
    /// A file name; the generator loads these children on demand.
    Deferred(&'v str),
    /// Child nodes written out in place.
    Inline(&'v [Value]),
    /// A leaf.
    None,
}

/// Counts of what a single navtree contributed to the builder.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// Entries appended.
    pub entries: usize,
    /// Scopes registered for the first time.
    pub scopes: usize,
    /// Leaves skipped because the same scope and member already own the anchor.
    pub skipped_duplicates: usize,
}

/// Walk state: the file being loaded and what has been added so far.
struct Loader<'a> {
    /// Builder receiving scopes and entries.
    builder: &'a mut IndexBuilder,
    /// Source file, for error messages.
    file: &'a Path,
    /// Name of the navtree variable; doubles as the root scope name.
    root: String,
    /// Running totals.
    summary: LoadSummary,
}

/// Cheap check used by directory discovery to skip unrelated scripts.
pub fn looks_like_navtree(content: &str) -> bool {
    return HEADER
        .find(content)
        .is_some_and(|m| return BODY.is_match(&content[m.end()..]));
}

/// Parse `content` and append its scopes and entries to `builder`.
///
/// Only the first array literal is read. It may be followed by `;`,
/// comments, and further `var` statements, which are ignored.
///
/// # Errors
///
/// Returns `Error::NavtreeMalformed` if the header or any node has the
/// wrong shape, and builder errors (`DuplicateScope`, `DuplicateAnchor`)
/// on conflicts with previously loaded navtrees.
pub fn load(builder: &mut IndexBuilder, file: &Path, content: &str) -> Result<LoadSummary, Error> {
    let malformed = |reason: String| {
        return Error::NavtreeMalformed {
            file: file.to_path_buf(),
            reason,
        };
    };

    let (root, body) = match HEADER.captures(content) {
        Some(caps) => {
            let name = caps.get(1).map_or("", |m| return m.as_str()).to_string();
            let end = caps.get(0).map_or(0, |m| return m.end());
            (name, &content[end..])
        },
        None => return Err(malformed("missing `var NAME =` header".to_string())),
    };

    let mut stream = serde_json::Deserializer::from_str(body).into_iter::<Value>();
    let tree = match stream.next() {
        Some(Ok(tree)) => tree,
        Some(Err(e)) => return Err(malformed(format!("array literal: {e}"))),
        None => return Err(malformed("missing array literal".to_string())),
    };
    let rest = body.get(stream.byte_offset()..).unwrap_or_default();
    if !is_statement_boundary(rest) {
        return Err(malformed("unexpected text after the array literal".to_string()));
    }
    let Value::Array(nodes) = tree else {
        return Err(malformed("top level is not an array".to_string()));
    };

    let mut loader = Loader {
        builder,
        file,
        root,
        summary: LoadSummary::default(),
    };
    let root_scope = loader.root.clone();
    loader.walk_children(&nodes, &root_scope, &format!("{root_scope}[]"), true)?;

    tracing::debug!(
        file = %file.display(),
        scopes = loader.summary.scopes,
        entries = loader.summary.entries,
        skipped = loader.summary.skipped_duplicates,
        "loaded navtree"
    );
    return Ok(loader.summary);
}

/// True if `rest` holds nothing but an optional `;`, comments, or the
/// start of another `var` statement.
fn is_statement_boundary(rest: &str) -> bool {
    let rest = rest.trim_start();
    let rest = rest.strip_prefix(';').unwrap_or(rest).trim_start();
    return rest.is_empty()
        || rest.starts_with("//")
        || rest.starts_with("/*")
        || rest.strip_prefix("var").is_some_and(|r| return r.starts_with(char::is_whitespace));
}

impl Loader<'_> {
    /// Visit `nodes` whose leaves belong to `scope`. `at_root` marks the
    /// top level, where the root scope is registered lazily.
    fn walk_children(&mut self, nodes: &[Value], scope: &str, path: &str, at_root: bool) -> Result<(), Error> {
        for (i, node) in nodes.iter().enumerate() {
            let node_path = format!("{path}[{i}]");
            let (name, link, children) = self.split_node(node, &node_path)?;

            match (children, link) {
                (Children::Deferred(file), _) => {
                    tracing::debug!(file = %self.file.display(), node = name, deferred = file, "skipping node with deferred children");
                },
                (Children::Inline(children), Some(link)) => {
                    let document = link.split_once('#').map_or(link, |(doc, _)| return doc);
                    self.register_scope(Scope::new(name, document))?;
                    self.walk_children(children, name, &node_path, false)?;
                },
                (Children::Inline(children), None) => {
                    self.walk_children(children, scope, &node_path, at_root)?;
                },
                (Children::None, Some(link)) => {
                    if at_root {
                        let target = self.root_scope()?;
                        self.add_leaf(&target, name, link)?;
                    } else {
                        self.add_leaf(scope, name, link)?;
                    }
                },
                (Children::None, None) => {
                    tracing::debug!(file = %self.file.display(), node = name, "skipping leaf without link");
                },
            }
        }
        return Ok(());
    }

    /// Destructure `[name, link, children]`.
    fn split_node<'v>(
        &self,
        node: &'v Value,
        path: &str,
    ) -> Result<(&'v str, Option<&'v str>, Children<'v>), Error> {
        let malformed = |reason: &str| {
            return Error::NavtreeMalformed {
                file: self.file.to_path_buf(),
                reason: format!("{path}: {reason}"),
            };
        };

        let Some(parts) = node.as_array() else {
            return Err(malformed("node is not an array"));
        };
        let [name, link, rest @ ..] = parts.as_slice() else {
            return Err(malformed("node needs at least a name and a link"));
        };
        let Some(name) = name.as_str() else {
            return Err(malformed("name is not a string"));
        };
        let link = match link {
            Value::String(s) => Some(s.as_str()),
            Value::Null => None,
            _ => return Err(malformed("link is neither a string nor null")),
        };
        let children = match rest.first() {
            None | Some(Value::Null) => Children::None,
            Some(Value::Array(children)) => Children::Inline(children.as_slice()),
            Some(Value::String(file)) => Children::Deferred(file.as_str()),
            Some(_) => return Err(malformed("children are neither an array, a file name, nor null")),
        };
        return Ok((name, link, children));
    }

    /// Register a scope, counting it only the first time.
    fn register_scope(&mut self, scope: Scope) -> Result<(), Error> {
        let fresh = !self.builder.contains_scope(&scope.name);
        self.builder.add_scope(scope)?;
        if fresh {
            self.summary.scopes = self.summary.scopes.saturating_add(1);
        }
        return Ok(());
    }

    /// Scope for top-level leaves: `NAME` with document `NAME.html`, or the
    /// named scope that already documents `NAME.html`.
    fn root_scope(&mut self) -> Result<String, Error> {
        let fresh = !self.builder.contains_scope(&self.root);
        let scope = Scope::new(self.root.as_str(), format!("{}.html", self.root));
        let target = self.builder.add_root_scope(scope)?;
        if fresh && target == self.root {
            self.summary.scopes = self.summary.scopes.saturating_add(1);
        }
        return Ok(target);
    }

    /// Append one entry. A leaf whose anchor the same scope and member
    /// already own is skipped; any other owner is a `DuplicateAnchor`.
    fn add_leaf(&mut self, scope: &str, name: &str, link: &str) -> Result<(), Error> {
        let anchor = Anchor(link.to_string());
        if self.builder.owner(&anchor) == Some((scope, name)) {
            tracing::debug!(file = %self.file.display(), scope, member = name, anchor = link, "anchor already indexed");
            self.summary.skipped_duplicates = self.summary.skipped_duplicates.saturating_add(1);
            return Ok(());
        }
        self.builder.add_entry(scope, name, anchor)?;
        self.summary.entries = self.summary.entries.saturating_add(1);
        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERAL: &str = r#"var group__general =
[
    [ "TgBot::Bot", "class_tg_bot_1_1_bot.html", [
      [ "Bot", "class_tg_bot_1_1_bot.html#aad9ae2e4f1117361c928b1d5ea69b51e", null ],
      [ "getApi", "class_tg_bot_1_1_bot.html#a2432163a22e5a95197785afd5518a8f0", null ]
    ] ],
    [ "TgBot::TgException", "class_tg_bot_1_1_tg_exception.html", [
      [ "TgException", "class_tg_bot_1_1_tg_exception.html#a372244063ddbde6a604bd785c966f11b", null ]
    ] ]
];
"#;

    #[test]
    fn loads_scopes_and_entries_in_order() {
        let mut builder = IndexBuilder::new();
        let summary = load(&mut builder, Path::new("group__general.js"), GENERAL).unwrap();
        assert_eq!(summary, LoadSummary { entries: 3, scopes: 2, skipped_duplicates: 0 });

        let index = builder.build();
        let scopes: Vec<&str> = index.scopes().map(|s| s.name.as_str()).collect();
        assert_eq!(scopes, vec!["TgBot::Bot", "TgBot::TgException"]);
        assert_eq!(
            index.scope("Bot").map(|s| s.document.as_str()),
            Some("class_tg_bot_1_1_bot.html")
        );
        let names: Vec<&str> = index.entries_for("Bot").map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Bot", "getApi"]);
    }

    #[test]
    fn loading_the_same_navtree_twice_merges() {
        let mut builder = IndexBuilder::new();
        load(&mut builder, Path::new("a.js"), GENERAL).unwrap();
        let second = load(&mut builder, Path::new("b.js"), GENERAL).unwrap();
        assert_eq!(second, LoadSummary { entries: 0, scopes: 0, skipped_duplicates: 3 });
        assert_eq!(builder.build().len(), 3);
    }

    #[test]
    fn top_level_leaves_go_to_the_root_scope() {
        let content = r#"var group__tools =
[
    [ "read", "group__tools.html#ga1", null ],
    [ "Helpers", null, [
      [ "write", "group__tools.html#ga2", null ]
    ] ],
    [ "dangling", null, null ]
];"#;
        let mut builder = IndexBuilder::new();
        load(&mut builder, Path::new("group__tools.js"), content).unwrap();
        let index = builder.build();

        assert_eq!(index.scope("group__tools").map(|s| s.document.as_str()), Some("group__tools.html"));
        let names: Vec<&str> = index.entries_for("group__tools").map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["read", "write"]);
    }

    #[test]
    fn deferred_children_are_skipped() {
        let content = r#"var NAVTREE =
[
  [ "tgbot-cpp", "index.html", [
    [ "Classes", "annotated.html", [
      [ "Class List", "annotated.html", "annotated_dup" ]
    ] ]
  ] ]
];"#;
        let mut builder = IndexBuilder::new();
        let summary = load(&mut builder, Path::new("navtreedata.js"), content).unwrap();
        assert_eq!(summary, LoadSummary { entries: 0, scopes: 2, skipped_duplicates: 0 });
    }

    const NAVTREEDATA: &str = r#"/*
 @licstart  The following is the entire license notice for the JavaScript code in this file.
 @licend  The above is the entire license notice for the JavaScript code in this file
*/
var NAVTREE =
[
  [ "tgbot-cpp", "index.html", [
    [ "README", "md__r_e_a_d_m_e.html", null ],
    [ "Classes", "annotated.html", [
      [ "Class List", "annotated.html", "annotated_dup" ]
    ] ]
  ] ]
];

var NAVTREEINDEX =
[
"annotated.html"
];

var SYNCONMSG = 'click to disable panel synchronisation';
var SYNCOFFMSG = 'click to enable panel synchronisation';
"#;

    const API_GROUP: &str = r#"var group__general =
[
    [ "TgBot::Api", "class_tg_bot_1_1_api.html", [
      [ "Api", "class_tg_bot_1_1_api.html#aa79", null ],
      [ "close", "class_tg_bot_1_1_api.html#aeb3", null ]
    ] ]
];"#;

    const API_CLASS: &str = r#"var class_tg_bot_1_1_api =
[
    [ "Api", "class_tg_bot_1_1_api.html#aa79", null ],
    [ "close", "class_tg_bot_1_1_api.html#aeb3", null ]
];"#;

    fn api_anchors(index: &crate::index::SymbolIndex, scope: &str) -> Vec<String> {
        index.lookup(scope, "close").into_iter().map(|a| a.0.clone()).collect()
    }

    #[test]
    fn reads_only_the_first_statement_of_navtreedata() {
        assert!(looks_like_navtree(NAVTREEDATA));
        let mut builder = IndexBuilder::new();
        let summary = load(&mut builder, Path::new("html/navtreedata.js"), NAVTREEDATA).unwrap();
        assert_eq!(summary, LoadSummary { entries: 1, scopes: 2, skipped_duplicates: 0 });

        let index = builder.build();
        let names: Vec<&str> = index.entries_for("tgbot-cpp").map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["README"]);
    }

    #[test]
    fn rejects_text_after_the_array_that_is_not_a_statement() {
        let mut builder = IndexBuilder::new();
        let err = load(&mut builder, Path::new("x.js"), "var x = [ [ \"a\", \"a.html#1\", null ] ] ]").unwrap_err();
        let Error::NavtreeMalformed { reason, .. } = err else {
            panic!("expected NavtreeMalformed");
        };
        assert!(reason.contains("after the array"), "reason was: {reason}");
    }

    #[test]
    fn class_navtree_loaded_first_is_adopted_by_its_named_scope() {
        let mut builder = IndexBuilder::new();
        load(&mut builder, Path::new("html/class_tg_bot_1_1_api.js"), API_CLASS).unwrap();
        let group = load(&mut builder, Path::new("html/group__general.js"), API_GROUP).unwrap();
        assert_eq!(group.skipped_duplicates, 2);

        let index = builder.build();
        let scopes: Vec<&str> = index.scopes().map(|s| s.name.as_str()).collect();
        assert_eq!(scopes, vec!["TgBot::Api"]);
        assert_eq!(api_anchors(&index, "Api"), vec!["class_tg_bot_1_1_api.html#aeb3"]);
        assert_eq!(api_anchors(&index, "TgBot::Api"), vec!["class_tg_bot_1_1_api.html#aeb3"]);
    }

    #[test]
    fn class_navtree_loaded_last_folds_into_its_named_scope() {
        let mut builder = IndexBuilder::new();
        load(&mut builder, Path::new("html/group__general.js"), API_GROUP).unwrap();
        let class = load(&mut builder, Path::new("html/class_tg_bot_1_1_api.js"), API_CLASS).unwrap();
        assert_eq!(class, LoadSummary { entries: 0, scopes: 0, skipped_duplicates: 2 });

        let index = builder.build();
        assert_eq!(index.scope_count(), 1);
        assert_eq!(api_anchors(&index, "TgBot::Api"), vec!["class_tg_bot_1_1_api.html#aeb3"]);
    }

    #[test]
    fn anchor_claimed_by_another_member_is_rejected() {
        let other = r#"var group__other =
[
    [ "TgBot::Bot", "class_tg_bot_1_1_bot.html", [
      [ "getApi", "class_tg_bot_1_1_api.html#aeb3", null ]
    ] ]
];"#;
        let mut builder = IndexBuilder::new();
        load(&mut builder, Path::new("group__general.js"), API_GROUP).unwrap();
        let err = load(&mut builder, Path::new("group__other.js"), other).unwrap_err();
        let Error::DuplicateAnchor { existing, scope, .. } = err else {
            panic!("expected DuplicateAnchor");
        };
        assert_eq!(existing, "TgBot::Api::close");
        assert_eq!(scope, "TgBot::Bot");
    }

    #[test]
    fn rejects_files_without_header() {
        let mut builder = IndexBuilder::new();
        let err = load(&mut builder, Path::new("x.js"), "[ [\"a\", \"b\", null] ]").unwrap_err();
        assert!(matches!(err, Error::NavtreeMalformed { .. }));
    }

    #[test]
    fn rejects_bad_nodes_with_their_path() {
        let mut builder = IndexBuilder::new();
        let err = load(&mut builder, Path::new("x.js"), "var x = [ [ \"a\", 3, null ] ];").unwrap_err();
        let Error::NavtreeMalformed { reason, .. } = err else {
            panic!("expected NavtreeMalformed");
        };
        assert!(reason.contains("x[][0]"), "reason was: {reason}");
    }

    #[test]
    fn detects_navtree_scripts() {
        assert!(looks_like_navtree(GENERAL));
        assert!(!looks_like_navtree("/*! jQuery v3.6.0 */ !function(e,t){}"));
        assert!(!looks_like_navtree("var searchData = {};"));
        assert!(!looks_like_navtree("var searchData=\n[\n  ['api',['Api',['../a.html#1',1,'Api']]]\n];"));
        assert!(looks_like_navtree("var group__empty =\n[\n];"));
    }
}
