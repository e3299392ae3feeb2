use std::path::{Path, PathBuf};

use crate::error::Error;

/// Config file name looked up in the project root.
pub const CONFIG_FILE: &str = ".navdex.toml";

/// Index file written by `build` unless the config names another.
pub const DEFAULT_INDEX_FILE: &str = ".navdex.index";

/// Project configuration loaded from `.navdex.toml`.
/// Include/exclude patterns are path prefixes applied to navtree files
/// discovered while walking source directories.
#[derive(Debug)]
pub struct Config {
    exclude: Vec<String>,
    include: Vec<String>,
    /// Where the index file lives, relative to the project root.
    pub index: PathBuf,
    /// Navtree files or directories to scan, relative to the project root.
    pub sources: Vec<String>,
}

/// Raw TOML structure for `.navdex.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct NavdexTomlConfig {
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    include: Vec<String>,
    index: Option<PathBuf>,
    sources: Option<Vec<String>>,
}

impl Config {
    /// Load config from `.navdex.toml` in the given root directory.
    /// Returns a default that scans the whole root if the file doesn't exist.
    /// Returns an error if the file exists but is malformed, never silently
    /// falling back to defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::scan_everything_by_default());
            },
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content);
    }

    /// Load config from a path the user named explicitly. Unlike [`Config::load`],
    /// a missing file is an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures, or `Error::TomlDe` if malformed.
    pub fn load_explicit(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content);
    }

    /// Parse config TOML, filling defaults for omitted keys.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: NavdexTomlConfig = toml::from_str(content)?;
        let defaults = Self::scan_everything_by_default();
        return Ok(Self {
            exclude: raw.exclude,
            include: raw.include,
            index: raw.index.unwrap_or(defaults.index),
            sources: raw.sources.unwrap_or(defaults.sources),
        });
    }

    /// Default config that scans the root, includes everything, and excludes nothing.
    fn scan_everything_by_default() -> Self {
        return Self {
            exclude: Vec::new(),
            include: Vec::new(),
            index: PathBuf::from(DEFAULT_INDEX_FILE),
            sources: vec![".".to_string()],
        };
    }

    /// Check whether a discovered navtree file should be loaded.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = Config::parse("include = [\"docs/html/group__\"]").unwrap();
        assert_eq!(config.sources, vec![".".to_string()]);
        assert_eq!(config.index, PathBuf::from(DEFAULT_INDEX_FILE));
        assert!(config.should_scan("docs/html/group__general.js"));
        assert!(!config.should_scan("docs/html/navtreedata.js"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let config = Config::parse(
            "sources = [\"docs\"]\ninclude = [\"docs/\"]\nexclude = [\"docs/search/\"]\nindex = \"out/api.index\"",
        )
        .unwrap();
        assert_eq!(config.index, PathBuf::from("out/api.index"));
        assert!(config.should_scan("docs/group__general.js"));
        assert!(!config.should_scan("docs/search/all_0.js"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(Config::parse("sourcez = []"), Err(Error::TomlDe(_))));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_explicit(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
        assert!(Config::load(dir.path()).is_ok());
    }
}
