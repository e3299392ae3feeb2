use std::fmt::Write as _;
use std::path::Path;

use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened, why, and how to fix it.
/// Designed to be readable by both humans and LLM agents.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::IndexNotFound { path } => render_index_not_found(path),
        Error::IndexCorrupt { reason } => render_index_corrupt(reason),
        Error::NavtreeMalformed { file, reason } => render_navtree_malformed(file, reason),
        Error::DuplicateScope { name, existing, document } => {
            render_duplicate_scope(name, existing, document)
        },
        Error::DuplicateAnchor { anchor, existing, scope, name } => {
            render_duplicate_anchor(anchor, existing, scope, name)
        },
        Error::FileNotFound { path } => render_file_not_found(path),
        Error::UnknownSource { path } => render_unknown_source(path),
        _ => render_generic(e),
    };
}

/// Print "did you mean" hints for a lookup that found nothing.
pub fn print_lookup_miss(scope: &str, name: &str, known_scope: bool, suggestions: &[String]) {
    if !known_scope {
        eprintln!("no scope `{scope}` in the index; run `navdex scopes` to list them");
        return;
    }
    if suggestions.is_empty() {
        eprintln!("`{name}` is not documented in `{scope}`");
        return;
    }
    let list = suggestions.iter().map(|s| return format!("`{s}`")).collect::<Vec<_>>().join(", ");
    eprintln!("`{name}` is not documented in `{scope}`; did you mean {list}?");
}

fn render_generic(e: &Error) -> String {
    return match e {
        Error::ConfigNotFound { path } => format!("\
# Error: Config Not Found

`{}` does not exist.

## Fix

Check the `--config` path, or drop the flag to use `.navdex.toml`.
", path.display()),

        Error::ParseFailed { file, reason } => format!("\
# Error: Parse Failed

Could not parse `{}`: {reason}
", file.display()),

        Error::SourceAlreadyConfigured { path } => format!("\
# Error: Source Already Configured

`{path}` is already listed in `.navdex.toml`.
"),

        Error::UnknownScope { scope, name } => format!("\
# Error: Unknown Scope

Entry `{name}` names scope `{scope}`, which was never registered.
"),

        Error::UnsupportedFormat { format } => format!("\
# Error: Unsupported Format

`{format}` is not an export format.

## Fix

Use `--format toml` or `--format json`.
"),

        Error::WatchFailed { reason } => format!("\
# Error: Watch Failed

{reason}
"),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::Json(e) => format!("\
# Error: JSON

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}
"),
        Error::TomlSer(e) => format!("\
# Error: TOML Serialization

{e}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    };
}

fn render_index_not_found(path: &Path) -> String {
    return format!("\
# Error: Index Not Found

`{}` does not exist.

## Fix

Run `navdex build` to load the configured navtrees and write the index.
", path.display());
}

fn render_index_corrupt(reason: &str) -> String {
    return format!("\
# Error: Index Corrupt

{reason}

## Fix

Regenerate the index:

    navdex build
");
}

fn render_navtree_malformed(file: &Path, reason: &str) -> String {
    return format!("\
# Error: Malformed Navtree

`{}` is not a `var NAME = [ ... ];` navigation table.

{reason}

## Fix

Point `sources` at the generator's navtree files, or exclude this one:

    exclude = [\"{}\"]
", file.display(), file.display());
}

fn render_duplicate_scope(name: &str, existing: &str, document: &str) -> String {
    return format!("\
# Error: Conflicting Scope

`{name}` is documented in `{existing}` by one navtree and `{document}` by another.

## Fix

Remove one of the navtrees from `sources`, or regenerate the documentation
so both agree.
");
}

fn render_duplicate_anchor(anchor: &str, existing: &str, scope: &str, name: &str) -> String {
    let mut out = format!("\
# Error: Duplicate Anchor

`{anchor}` is claimed by both:

");
    let _ = writeln!(out, "- `{existing}`");
    let _ = writeln!(out, "- `{scope}::{name}`");
    out.push_str("\
\n## Fix

Anchors must be unique. Regenerate the documentation, then:

    navdex build
");
    return out;
}

fn render_file_not_found(path: &Path) -> String {
    return format!("\
# Error: File Not Found

`{}` does not exist.

## Fix

Check `sources` in `.navdex.toml`:

    navdex source list
", path.display());
}

fn render_unknown_source(path: &str) -> String {
    return format!("\
# Error: Unknown Source

`{path}` is not listed in `.navdex.toml`.

## Fix

    navdex source list
");
}
