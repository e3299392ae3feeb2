//! Core CLI commands for navdex: build, check, status, and the index queries.

use std::path::PathBuf;
use std::process::ExitCode;

use serde::Serialize;

use crate::config::Config;
use crate::diagnostics;
use crate::error;
use crate::freshness::{self, CheckResult};
use crate::index::SymbolIndex;
use crate::indexfile::IndexFile;
use crate::scanner;

/// Project root plus the config that applies to it.
pub struct Context {
    /// Loaded configuration.
    pub config: Config,
    /// The config file `source` subcommands edit.
    pub config_path: PathBuf,
    /// Directory every configured path is relative to.
    pub root: PathBuf,
}

impl Context {
    /// Absolute-or-relative path of the index file.
    pub fn index_path(&self) -> PathBuf {
        return self.root.join(&self.config.index);
    }

    /// Read the index file and rebuild the in-memory index.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexNotFound` or parse/validation errors.
    fn load_index(&self) -> Result<SymbolIndex, error::Error> {
        return IndexFile::read(&self.index_path())?.to_index();
    }
}

// ── Build and freshness ───────────────────────────────────────────────

/// Discover navtrees, load them into one index, write the index file.
///
/// # Errors
///
/// Returns errors from discovery, navtree loading, or writing.
pub fn build(ctx: &Context) -> Result<(), error::Error> {
    let sources = scanner::discover(&ctx.root, &ctx.config)?;
    if sources.is_empty() {
        eprintln!("warning: no navtree files found in {}", ctx.config.sources.join(", "));
    }

    let (index, records) = scanner::build_index(&sources)?;
    if !sources.is_empty() && index.is_empty() {
        eprintln!("warning: the navtrees contain no linked members");
    }
    let file = IndexFile::from_index(&index, records);
    let index_path = ctx.index_path();
    file.write(&index_path)?;

    tracing::info!(path = %index_path.display(), sources = sources.len(), "index written");
    eprintln!(
        "Wrote {} entries in {} scopes from {} navtrees to {}",
        index.len(),
        index.scope_count(),
        sources.len(),
        ctx.config.index.display(),
    );
    return Ok(());
}

/// Re-hash every recorded source and compare against the index file.
///
/// # Errors
///
/// Returns errors from reading the index file.
pub fn check(ctx: &Context) -> Result<ExitCode, error::Error> {
    let file = IndexFile::read(&ctx.index_path())?;
    let mut stale_count = 0_u32;
    let mut missing_count = 0_u32;

    for (record, result) in freshness::check_all(&ctx.root, &file.sources) {
        match result {
            CheckResult::Fresh => {},
            CheckResult::Missing => {
                missing_count = missing_count.saturating_add(1);
                println!("{}  {}", result.label(), record.path.display());
            },
            CheckResult::Stale => {
                stale_count = stale_count.saturating_add(1);
                println!("{}  {}", result.label(), record.path.display());
            },
        }
    }

    // Exit code priority: missing (2) > stale (1) > fresh (0).
    if missing_count > 0 {
        println!();
        println!("{missing_count} missing, {stale_count} stale");
        return Ok(ExitCode::from(2));
    } else if stale_count > 0 {
        println!();
        println!("{stale_count} stale");
        println!("Run `navdex build` to refresh the index.");
        return Ok(ExitCode::from(1));
    } else {
        let total = file.sources.len();
        println!("All {total} sources fresh");
        return Ok(ExitCode::SUCCESS);
    }
}

#[derive(Serialize)]
struct StatusJson {
    entries: usize,
    scopes: usize,
    sources: Vec<SourceStatusJson>,
}

#[derive(Serialize)]
struct SourceStatusJson {
    path: PathBuf,
    status: &'static str,
}

/// Show the freshness of every source plus index totals.
///
/// # Errors
///
/// Returns errors from reading the index file, or JSON serialization.
pub fn status(ctx: &Context, json: bool) -> Result<(), error::Error> {
    let file = IndexFile::read(&ctx.index_path())?;
    let results = freshness::check_all(&ctx.root, &file.sources);

    if json {
        let out = StatusJson {
            entries: file.entry_count(),
            scopes: file.scopes.len(),
            sources: results
                .iter()
                .map(|(record, result)| {
                    return SourceStatusJson {
                        path: record.path.clone(),
                        status: result.label().trim_end(),
                    };
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (record, result) in &results {
        println!("{}  {}", result.label(), record.path.display());
    }
    println!();
    println!("{} entries in {} scopes", file.entry_count(), file.scopes.len());
    return Ok(());
}

// ── Queries ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct LookupJson<'a> {
    anchors: Vec<&'a str>,
    name: &'a str,
    scope: &'a str,
}

/// Print every anchor for `name` in `scope`, one per line.
///
/// A miss prints nothing on stdout and still succeeds; hints go to stderr.
///
/// # Errors
///
/// Returns errors from reading the index file, or JSON serialization.
pub fn lookup(ctx: &Context, scope: &str, name: &str, json: bool) -> Result<(), error::Error> {
    let index = ctx.load_index()?;
    let anchors = index.lookup(scope, name);

    if json {
        let out = LookupJson {
            anchors: anchors.iter().map(|a| return a.as_str()).collect(),
            name,
            scope,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for anchor in &anchors {
            println!("{anchor}");
        }
    }

    if anchors.is_empty() {
        let known_scope = index.scope(scope).is_some();
        diagnostics::print_lookup_miss(scope, name, known_scope, &index.suggest(scope, name));
    }
    return Ok(());
}

#[derive(Serialize)]
struct FoundJson<'a> {
    anchor: &'a str,
    scope: &'a str,
}

/// Print `scope  anchor` for every scope documenting `name`.
///
/// # Errors
///
/// Returns errors from reading the index file, or JSON serialization.
pub fn find(ctx: &Context, name: &str, json: bool) -> Result<(), error::Error> {
    let index = ctx.load_index()?;
    let found = index.find(name);

    if json {
        let out: Vec<FoundJson<'_>> = found
            .iter()
            .map(|(scope, entry)| {
                return FoundJson {
                    anchor: entry.anchor.as_str(),
                    scope: &scope.name,
                };
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let width = found.iter().map(|(scope, _)| return scope.name.len()).max().unwrap_or(0);
    for (scope, entry) in &found {
        println!("{:<width$}  {}", scope.name, entry.anchor);
    }
    return Ok(());
}

#[derive(Serialize)]
struct ScopeJson<'a> {
    document: &'a str,
    entries: usize,
    name: &'a str,
}

/// List scopes in registration order with their entry counts.
///
/// # Errors
///
/// Returns errors from reading the index file, or JSON serialization.
pub fn scopes(ctx: &Context, json: bool) -> Result<(), error::Error> {
    let index = ctx.load_index()?;
    let rows: Vec<ScopeJson<'_>> = index
        .scopes()
        .map(|scope| {
            return ScopeJson {
                document: &scope.document,
                entries: index.entries_for(&scope.name).len(),
                name: &scope.name,
            };
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let width = rows.iter().map(|r| return r.name.len()).max().unwrap_or(0);
    for row in &rows {
        println!("{:<width$}  {:>4}  {}", row.name, row.entries, row.document);
    }
    return Ok(());
}

#[derive(Serialize)]
struct EntryJson<'a> {
    anchor: &'a str,
    name: &'a str,
}

/// List the members of one scope in registration order.
///
/// An unknown scope prints nothing on stdout and still succeeds.
///
/// # Errors
///
/// Returns errors from reading the index file, or JSON serialization.
pub fn entries(ctx: &Context, scope: &str, json: bool) -> Result<(), error::Error> {
    let index = ctx.load_index()?;

    if json {
        let rows: Vec<EntryJson<'_>> = index
            .entries_for(scope)
            .map(|entry| {
                return EntryJson {
                    anchor: entry.anchor.as_str(),
                    name: &entry.name,
                };
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        let width = index.entries_for(scope).map(|e| return e.name.len()).max().unwrap_or(0);
        for entry in index.entries_for(scope) {
            println!("{:<width$}  {}", entry.name, entry.anchor);
        }
    }

    if index.scope(scope).is_none() {
        diagnostics::print_lookup_miss(scope, "", false, &[]);
    }
    return Ok(());
}

/// Print the index file in the requested format.
///
/// # Errors
///
/// Returns `Error::UnsupportedFormat` for anything but toml or json, or
/// errors from reading and serializing the index file.
pub fn export(ctx: &Context, format: &str) -> Result<(), error::Error> {
    let file = IndexFile::read(&ctx.index_path())?;
    let rendered = match format {
        "toml" => file.serialize()?,
        "json" => file.to_json()?,
        other => {
            return Err(error::Error::UnsupportedFormat { format: other.to_string() });
        },
    };
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }
    return Ok(());
}

/// Output a comprehensive reference document for navdex.
pub fn info(ctx: &Context, json: bool) {
    return crate::info::run(ctx, json);
}
