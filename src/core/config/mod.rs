//! core::config
//!
//! Read-only configuration files supplying option defaults.
//!
//! # Overview
//!
//! A config file holds one section per command. The top-level function's
//! section is its name, each subcommand's section is the subcommand name,
//! and extensions read their own section (e.g. `[logging]`). Keys are
//! parameter names.
//!
//! ```toml
//! [main]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [logging]
//! loglvl = "DEBUG"
//! ```
//!
//! Values are kept as plain strings: numbers, booleans and datetimes are
//! stored in their textual form. No type coercion happens at this layer.
//!
//! Text that is not valid TOML is read as INI instead: `[section]` headers,
//! `key = value` or `key: value` lines, and `#` or `;` comment lines. INI
//! values are taken verbatim, so `name = foo` needs no quotes.
//!
//! # Locations
//!
//! For a configured file name, searched in order:
//! 1. `~/<name>` in the user's home directory
//! 2. `<name>` as given (relative to the working directory)
//!
//! Every file found is read; keys from later files override earlier ones.
//! Missing files are not an error.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The merged configuration.
    pub config: ConfigFile,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged sections from all config files found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    sections: BTreeMap<String, BTreeMap<String, String>>,
    /// Files that contributed values, in load order
    loaded_from: Vec<PathBuf>,
}

impl ConfigFile {
    /// Load a config file by name from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed.
    pub fn load(name: impl AsRef<Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_from(&Self::search_paths(name.as_ref()))
    }

    /// The locations searched for `name`, lowest precedence first.
    pub fn search_paths(name: &Path) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(home) = dirs::home_dir() {
            let in_home = home.join(name);
            if in_home != name {
                paths.push(in_home);
            }
        }
        paths.push(name.to_path_buf());
        paths
    }

    /// Load and merge the given files; later files override earlier ones.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed.
    pub fn load_from(paths: &[PathBuf]) -> Result<ConfigLoadResult, ConfigError> {
        let mut config = ConfigFile::default();
        let mut warnings = Vec::new();

        for path in paths {
            if !path.is_file() {
                continue;
            }
            let table = Self::read_table(path)?;
            config.merge_table(path, table, &mut warnings);
            config.loaded_from.push(path.clone());
        }

        Ok(ConfigLoadResult { config, warnings })
    }

    /// Parse config text directly.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for text that is neither TOML nor INI.
    pub fn parse(contents: &str) -> Result<ConfigLoadResult, ConfigError> {
        let path = PathBuf::from("<string>");
        let table = parse_text(&path, contents)?;

        let mut config = ConfigFile::default();
        let mut warnings = Vec::new();
        config.merge_table(&path, table, &mut warnings);
        Ok(ConfigLoadResult { config, warnings })
    }

    /// Read and parse one file. The file is closed before this returns.
    fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        parse_text(path, &contents)
    }

    fn merge_table(&mut self, path: &Path, table: toml::Table, warnings: &mut Vec<ConfigWarning>) {
        for (section, value) in table {
            let toml::Value::Table(entries) = value else {
                warnings.push(ConfigWarning {
                    message: format!("ignoring key '{}' outside of any section", section),
                    path: path.to_path_buf(),
                });
                continue;
            };

            let target = self.sections.entry(section.clone()).or_default();
            for (key, value) in entries {
                match stringify(&value) {
                    Some(text) => {
                        target.insert(key, text);
                    }
                    None => warnings.push(ConfigWarning {
                        message: format!(
                            "ignoring '{}.{}': only plain values are supported",
                            section, key
                        ),
                        path: path.to_path_buf(),
                    }),
                }
            }
        }
    }

    /// Look up a key in a section.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Get the paths of the files that were loaded.
    pub fn loaded_from(&self) -> &[PathBuf] {
        &self.loaded_from
    }
}

/// Parse as TOML, falling back to INI. The TOML error is kept if both fail.
fn parse_text(path: &Path, contents: &str) -> Result<toml::Table, ConfigError> {
    match toml::from_str(contents) {
        Ok(table) => Ok(table),
        Err(e) => parse_ini(contents).ok_or_else(|| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

/// Read INI text into the same shape TOML produces: one table per section.
///
/// Returns `None` at the first line that is neither a header, an entry, a
/// comment nor blank.
fn parse_ini(contents: &str) -> Option<toml::Table> {
    let mut table = toml::Table::new();
    let mut section: Option<String> = None;

    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let name = rest.strip_suffix(']')?.trim();
            if name.is_empty() {
                return None;
            }
            table
                .entry(name.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            section = Some(name.to_string());
            continue;
        }

        let (key, value) = line.split_once(|c: char| c == '=' || c == ':')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let value = toml::Value::String(value.trim().to_string());
        match &section {
            Some(name) => {
                if let Some(toml::Value::Table(entries)) = table.get_mut(name) {
                    entries.insert(key.to_string(), value);
                }
            }
            None => {
                table.insert(key.to_string(), value);
            }
        }
    }

    Some(table)
}

fn stringify(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}
