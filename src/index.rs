//! The symbol index: scopes and their members in registration order, with
//! multi-valued name lookup so overloads are never collapsed.

use std::collections::HashMap;

use crate::error::Error;
use crate::types::{Anchor, Scope, SymbolEntry};

/// One registered scope and its members.
#[derive(Debug, Clone)]
struct ScopeTable {
    /// Entry positions keyed by member name. Values are in registration order.
    by_name: HashMap<String, Vec<usize>>,
    /// Members in registration order.
    entries: Vec<SymbolEntry>,
    /// The scope itself.
    scope: Scope,
}

/// Read-only table of (scope, name, anchor) triples.
///
/// Built once through [`IndexBuilder`] and never mutated afterwards, so a
/// shared reference can be handed to any number of readers.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    /// Scope positions keyed by full display name.
    by_full_name: HashMap<String, usize>,
    /// Scope positions keyed by short name. Values are in registration order.
    by_short_name: HashMap<String, Vec<usize>>,
    /// Scopes in registration order.
    tables: Vec<ScopeTable>,
}

impl SymbolIndex {
    /// All anchors documented as `name` inside `scope`.
    ///
    /// `scope` matches a full display name first; failing that, every scope
    /// whose short name equals it. An empty result means "not documented".
    pub fn lookup(&self, scope: &str, name: &str) -> Vec<&Anchor> {
        let mut anchors = Vec::new();
        for table in self.matching_tables(scope) {
            let Some(positions) = table.by_name.get(name) else {
                continue;
            };
            anchors.extend(
                positions
                    .iter()
                    .filter_map(|&pos| return table.entries.get(pos))
                    .map(|entry| return &entry.anchor),
            );
        }
        return anchors;
    }

    /// Scopes in registration order. Calling again restarts the sequence.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> + Clone + '_ {
        return self.tables.iter().map(|table| return &table.scope);
    }

    /// Members of `scope` in registration order; empty for an unknown scope.
    pub fn entries_for(&self, scope: &str) -> std::slice::Iter<'_, SymbolEntry> {
        let entries: &[SymbolEntry] = match self.matching_tables(scope).into_iter().next() {
            Some(table) => &table.entries,
            None => &[],
        };
        return entries.iter();
    }

    /// Every entry named `name`, across all scopes, in registration order.
    pub fn find(&self, name: &str) -> Vec<(&Scope, &SymbolEntry)> {
        let mut found = Vec::new();
        for table in &self.tables {
            let Some(positions) = table.by_name.get(name) else {
                continue;
            };
            for &pos in positions {
                if let Some(entry) = table.entries.get(pos) {
                    found.push((&table.scope, entry));
                }
            }
        }
        return found;
    }

    /// Resolve a scope by full name, falling back to the first short-name match.
    pub fn scope(&self, name: &str) -> Option<&Scope> {
        return self.matching_tables(name).into_iter().next().map(|table| return &table.scope);
    }

    /// Member names in `scope` equal to `name` ignoring ASCII case, or
    /// starting with it. Used for "did you mean" hints.
    pub fn suggest(&self, scope: &str, name: &str) -> Vec<String> {
        let needle = name.to_ascii_lowercase();
        let mut names: Vec<String> = Vec::new();
        for table in self.matching_tables(scope) {
            for entry in &table.entries {
                let candidate = entry.name.to_ascii_lowercase();
                let close = candidate == needle || (!needle.is_empty() && candidate.starts_with(&needle));
                if close && entry.name != name && !names.contains(&entry.name) {
                    names.push(entry.name.clone());
                }
            }
        }
        return names;
    }

    /// Total number of entries across all scopes.
    pub fn len(&self) -> usize {
        return self.tables.iter().map(|table| return table.entries.len()).sum();
    }

    /// True when no entries are registered.
    pub fn is_empty(&self) -> bool {
        return self.tables.iter().all(|table| return table.entries.is_empty());
    }

    /// Number of registered scopes.
    pub fn scope_count(&self) -> usize {
        return self.tables.len();
    }

    /// Scope tables matching `scope`: the exact full-name match alone, or
    /// every short-name match in registration order.
    fn matching_tables(&self, scope: &str) -> Vec<&ScopeTable> {
        if let Some(table) = self.by_full_name.get(scope).and_then(|&pos| return self.tables.get(pos)) {
            return vec![table];
        }
        return self
            .by_short_name
            .get(scope)
            .map(|positions| {
                return positions.iter().filter_map(|&pos| return self.tables.get(pos)).collect();
            })
            .unwrap_or_default();
    }
}

/// Accumulates scopes and entries, enforcing the index invariants, then
/// freezes them into a [`SymbolIndex`].
///
/// Scopes named after a navtree variable (see [`IndexBuilder::add_root_scope`])
/// are provisional: a named scope registered later for the same document
/// adopts them, entries included.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    /// Owner of every anchor seen so far: table position and member name.
    anchors: HashMap<Anchor, (usize, String)>,
    /// First table registered for each document.
    by_document: HashMap<String, usize>,
    /// The index under construction.
    index: SymbolIndex,
    /// Provisional root scopes keyed by document.
    provisional: HashMap<String, usize>,
}

impl IndexBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Register a scope. Registering an identical scope again is a no-op,
    /// and a provisional root scope with the same document is renamed to
    /// this one.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateScope` if the name is already registered
    /// with a different document.
    pub fn add_scope(&mut self, scope: Scope) -> Result<(), Error> {
        if let Some(existing) = self
            .index
            .by_full_name
            .get(&scope.name)
            .and_then(|&pos| return self.index.tables.get(pos))
        {
            if existing.scope.document == scope.document {
                return Ok(());
            }
            return Err(Error::DuplicateScope {
                document: scope.document,
                existing: existing.scope.document.clone(),
                name: scope.name,
            });
        }

        if let Some(pos) = self.provisional.remove(&scope.document) {
            self.adopt(pos, scope);
            return Ok(());
        }

        let pos = self.index.tables.len();
        self.index.by_full_name.insert(scope.name.clone(), pos);
        self.index
            .by_short_name
            .entry(scope.short_name().to_string())
            .or_default()
            .push(pos);
        self.by_document.entry(scope.document.clone()).or_insert(pos);
        self.index.tables.push(ScopeTable {
            by_name: HashMap::new(),
            entries: Vec::new(),
            scope,
        });
        return Ok(());
    }

    /// Resolve the scope that a navtree's top-level leaves belong to.
    ///
    /// If any scope already documents `scope.document`, its current name is
    /// returned and nothing is registered. Otherwise `scope` is registered
    /// as provisional.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateScope` if the name is taken by a scope with
    /// a different document.
    pub fn add_root_scope(&mut self, scope: Scope) -> Result<String, Error> {
        if let Some(table) = self
            .by_document
            .get(&scope.document)
            .and_then(|&pos| return self.index.tables.get(pos))
        {
            return Ok(table.scope.name.clone());
        }

        let name = scope.name.clone();
        let document = scope.document.clone();
        self.add_scope(scope)?;
        if let Some(&pos) = self.index.by_full_name.get(&name) {
            self.provisional.insert(document, pos);
        }
        return Ok(name);
    }

    /// Append a member to an already-registered scope.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownScope` if `scope` was never registered (full
    /// name required), or `Error::DuplicateAnchor` if the anchor is taken.
    pub fn add_entry(&mut self, scope: &str, name: &str, anchor: Anchor) -> Result<(), Error> {
        let Some(&pos) = self.index.by_full_name.get(scope) else {
            return Err(Error::UnknownScope {
                name: name.to_string(),
                scope: scope.to_string(),
            });
        };

        if let Some((owner_scope, owner_name)) = self.owner(&anchor) {
            return Err(Error::DuplicateAnchor {
                anchor: anchor.0,
                existing: format!("{owner_scope}::{owner_name}"),
                name: name.to_string(),
                scope: scope.to_string(),
            });
        }

        let Some(table) = self.index.tables.get_mut(pos) else {
            return Err(Error::UnknownScope {
                name: name.to_string(),
                scope: scope.to_string(),
            });
        };
        let entry_pos = table.entries.len();
        table.by_name.entry(name.to_string()).or_default().push(entry_pos);
        table.entries.push(SymbolEntry {
            anchor: anchor.clone(),
            name: name.to_string(),
        });
        self.anchors.insert(anchor, (pos, name.to_string()));
        return Ok(());
    }

    /// Current scope name and member name of the entry owning `anchor`.
    pub fn owner(&self, anchor: &Anchor) -> Option<(&str, &str)> {
        let (pos, name) = self.anchors.get(anchor)?;
        let table = self.index.tables.get(*pos)?;
        return Some((table.scope.name.as_str(), name.as_str()));
    }

    /// True if a scope with this full name is registered.
    pub fn contains_scope(&self, name: &str) -> bool {
        return self.index.by_full_name.contains_key(name);
    }

    /// Freeze the accumulated table.
    pub fn build(self) -> SymbolIndex {
        return self.index;
    }

    /// Rename the provisional table at `pos` to `scope`, keeping its entries.
    fn adopt(&mut self, pos: usize, scope: Scope) {
        let Some(table) = self.index.tables.get_mut(pos) else {
            return;
        };
        let old = std::mem::replace(&mut table.scope, scope);
        let new_name = table.scope.name.clone();
        let new_short = table.scope.short_name().to_string();

        self.index.by_full_name.remove(&old.name);
        self.index.by_full_name.insert(new_name.clone(), pos);

        if let Some(positions) = self.index.by_short_name.get_mut(old.short_name()) {
            positions.retain(|&p| return p != pos);
            if positions.is_empty() {
                self.index.by_short_name.remove(old.short_name());
            }
        }
        let positions = self.index.by_short_name.entry(new_short).or_default();
        let at = positions.partition_point(|&p| return p < pos);
        positions.insert(at, pos);

        tracing::debug!(from = %old.name, to = %new_name, "named scope adopted root scope");
    }
}
