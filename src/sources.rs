//! `navdex source` subcommands: edit the `sources` list in `.navdex.toml`
//! without disturbing the rest of the file.

use std::path::Path;

use crate::config::Config;
use crate::error;

// ── CLI commands ──────────────────────────────────────────────────────

/// List configured sources in config order.
pub fn cmd_list(config: &Config) {
    for source in &config.sources {
        println!("{source}");
    }
}

/// Append a navtree file or directory to the config.
///
/// # Errors
///
/// Returns `Error::SourceAlreadyConfigured` if already listed, or errors
/// from config reading/writing.
pub fn cmd_add(config_path: &Path, path: &str) -> Result<(), error::Error> {
    add_to_config(config_path, path)?;
    println!("Added source: {path}");
    return Ok(());
}

/// Remove a navtree file or directory from the config.
///
/// # Errors
///
/// Returns `Error::UnknownSource` if not listed, or errors from config
/// reading/writing.
pub fn cmd_remove(config_path: &Path, path: &str) -> Result<(), error::Error> {
    remove_from_config(config_path, path)?;
    println!("Removed source: {path}");
    println!("Run `navdex build` to refresh the index.");
    return Ok(());
}

// ── Config file editing ───────────────────────────────────────────────

/// Parse a `.navdex.toml` into a format-preserving document.
/// Returns an empty document if the file doesn't exist.
///
/// # Errors
///
/// Returns `Error::Io` on read failure or `Error::ParseFailed` on parse failure.
fn read_config_doc(config_path: &Path) -> Result<toml_edit::DocumentMut, error::Error> {
    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(error::Error::Io(e)),
    };

    let doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        return error::Error::ParseFailed {
            file: config_path.to_path_buf(),
            reason: e.to_string(),
        };
    })?;

    return Ok(doc);
}

/// The `sources` array, created empty if the key is absent.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if `sources` exists but is not an array.
fn sources_array<'d>(
    config_path: &Path,
    doc: &'d mut toml_edit::DocumentMut,
) -> Result<&'d mut toml_edit::Array, error::Error> {
    if !doc.contains_key("sources") {
        doc["sources"] = toml_edit::value(toml_edit::Array::new());
    }
    return doc
        .get_mut("sources")
        .and_then(toml_edit::Item::as_array_mut)
        .ok_or_else(|| {
            return error::Error::ParseFailed {
                file: config_path.to_path_buf(),
                reason: "`sources` is not an array".to_string(),
            };
        });
}

/// Add a source path to `.navdex.toml`, creating the file if needed.
///
/// # Errors
///
/// Returns `Error::SourceAlreadyConfigured`, `Error::ParseFailed`, or `Error::Io`.
fn add_to_config(config_path: &Path, source: &str) -> Result<(), error::Error> {
    let mut doc = read_config_doc(config_path)?;
    let sources = sources_array(config_path, &mut doc)?;

    if sources.iter().any(|v| return v.as_str() == Some(source)) {
        return Err(error::Error::SourceAlreadyConfigured { path: source.to_string() });
    }
    sources.push(source);

    std::fs::write(config_path, doc.to_string())?;
    return Ok(());
}

/// Remove a source path from `.navdex.toml`.
///
/// # Errors
///
/// Returns `Error::UnknownSource` if the path isn't listed.
fn remove_from_config(config_path: &Path, source: &str) -> Result<(), error::Error> {
    let mut doc = read_config_doc(config_path)?;
    let unknown = || return error::Error::UnknownSource { path: source.to_string() };

    let sources = doc
        .get_mut("sources")
        .and_then(toml_edit::Item::as_array_mut)
        .ok_or_else(unknown)?;
    let position = sources
        .iter()
        .position(|v| return v.as_str() == Some(source))
        .ok_or_else(unknown)?;
    sources.remove(position);

    std::fs::write(config_path, doc.to_string())?;
    return Ok(());
}
