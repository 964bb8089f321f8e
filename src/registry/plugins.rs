//! registry::plugins
//!
//! Discovery of subcommands published outside the program.
//!
//! # Providers
//!
//! - [`StaticPlugins`]: an in-memory table, keyed by discovery key
//! - [`PathPlugins`]: executables named `<key>-<command>` on `PATH`
//!
//! The registry only sees the [`PluginProvider`] trait.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context as _;
use thiserror::Error;
use tracing::debug;

use crate::core::callable::{Callable, Function};
use crate::core::signature::{Parameter, Signature};
use crate::core::value::Value;

/// Errors from plugin discovery.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A search directory exists but could not be listed.
    #[error("failed to read plugin directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The discovery service itself failed.
    #[error("plugin discovery for '{key}' failed: {message}")]
    Discovery { key: String, message: String },
}

/// Source of dynamically discovered subcommands.
pub trait PluginProvider: Send + Sync {
    /// All callables published under `key`.
    fn discover(&self, key: &str) -> Result<Vec<Callable>, PluginError>;
}

/// Plugins held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticPlugins {
    entries: BTreeMap<String, Vec<Callable>>,
}

impl StaticPlugins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a callable under `key`.
    pub fn with(mut self, key: impl Into<String>, callable: impl Into<Callable>) -> Self {
        self.entries.entry(key.into()).or_default().push(callable.into());
        self
    }
}

impl PluginProvider for StaticPlugins {
    fn discover(&self, key: &str) -> Result<Vec<Callable>, PluginError> {
        Ok(self.entries.get(key).cloned().unwrap_or_default())
    }
}

/// Executables on a search path, `git`-style.
///
/// For key `tool`, an executable `tool-deploy` becomes the subcommand
/// `deploy`. Its arguments are passed through untouched and the call
/// returns the exit status. When several directories hold the same name,
/// the first one on the path wins.
#[derive(Debug, Clone)]
pub struct PathPlugins {
    path: Option<OsString>,
}

impl PathPlugins {
    /// Search the `PATH` of the running process.
    pub fn new() -> Self {
        Self {
            path: std::env::var_os("PATH"),
        }
    }

    /// Search an explicit `PATH`-style list of directories.
    pub fn with_path(path: impl Into<OsString>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn scan(&self, dir: &Path, prefix: &str, found: &mut BTreeMap<String, PathBuf>) -> Result<(), PluginError> {
        if !dir.is_dir() {
            return Ok(());
        }
        let entries = fs::read_dir(dir).map_err(|e| PluginError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        })?;

        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str().and_then(|n| n.strip_prefix(prefix)) else {
                continue;
            };
            if name.is_empty() || found.contains_key(name) {
                continue;
            }
            let path = entry.path();
            if is_executable(&path) {
                debug!(command = name, path = %path.display(), "discovered plugin executable");
                found.insert(name.to_string(), path);
            }
        }
        Ok(())
    }
}

impl Default for PathPlugins {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginProvider for PathPlugins {
    fn discover(&self, key: &str) -> Result<Vec<Callable>, PluginError> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };
        let prefix = format!("{}-", key);
        let mut found = BTreeMap::new();
        for dir in std::env::split_paths(path) {
            self.scan(&dir, &prefix, &mut found)?;
        }
        Ok(found
            .into_iter()
            .map(|(name, path)| executable_command(name, path))
            .collect())
    }
}

fn executable_command(name: String, path: PathBuf) -> Callable {
    let signature = Signature::new(vec![Parameter::var_positional("args")
        .with_annotation("Arguments passed to the executable")
        .with_passthrough()])
    .unwrap_or_else(|_| Signature::empty());
    let description = format!("Run {}", path.display());

    Function::new(name, signature, move |args| {
        let argv: Vec<String> = args.positional().iter().map(Value::to_string).collect();
        let status = Command::new(&path)
            .args(&argv)
            .status()
            .with_context(|| format!("failed to run {}", path.display()))?;
        Ok(Value::Int(status.code().map_or(-1, i64::from)))
    })
    .with_description(description)
    .into()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(path) {
        Ok(metadata) => metadata.is_file() && (metadata.permissions().mode() & 0o111 != 0),
        Err(_) => false,
    }
}

#[cfg(windows)]
fn is_executable(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext.to_lowercase().as_str(), "exe" | "cmd" | "bat" | "com"))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::callable::{Arguments, Context};
    use tempfile::TempDir;

    #[test]
    fn static_plugins_by_key() {
        let provider = StaticPlugins::new().with(
            "a",
            Function::new("one", Signature::empty(), |_| Ok(Value::None)),
        );
        assert_eq!(provider.discover("a").unwrap().len(), 1);
        assert!(provider.discover("b").unwrap().is_empty());
    }

    #[test]
    fn missing_path_finds_nothing() {
        let provider = PathPlugins { path: None };
        assert!(provider.discover("tool").unwrap().is_empty());
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn path_plugins_discover_prefixed_executables() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_script(first.path(), "tool-deploy", "#!/bin/sh\nexit 0\n");
        write_script(second.path(), "tool-deploy", "#!/bin/sh\nexit 9\n");
        write_script(second.path(), "tool-status", "#!/bin/sh\nexit 0\n");
        write_script(second.path(), "other-thing", "#!/bin/sh\nexit 0\n");
        fs::write(second.path().join("tool-readme"), "not executable").unwrap();

        let path = std::env::join_paths([first.path(), second.path()]).unwrap();
        let found = PathPlugins::with_path(path).discover("tool").unwrap();
        let names: Vec<_> = found.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["deploy", "status"]);

        let deploy = found[0].function();
        assert!(deploy
            .description()
            .unwrap()
            .contains(&first.path().display().to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn plugin_arguments_keep_their_dashes() {
        let dir = TempDir::new().unwrap();
        write_script(dir.path(), "tool-deploy", "#!/bin/sh\nexit 0\n");

        let found = PathPlugins::with_path(dir.path().as_os_str()).discover("tool").unwrap();
        let parser = crate::parser::build(&found[0], &crate::defaults::Defaults::new(), None)
            .unwrap()
            .unwrap();
        let options = parser.parse_from(["deploy", "--force", "-n", "3"]).unwrap();
        assert_eq!(
            options.get("args"),
            Some(&Value::List(vec![
                Value::from("--force"),
                Value::from("-n"),
                Value::from("3"),
            ]))
        );
    }

    #[cfg(unix)]
    #[test]
    fn plugin_returns_exit_status() {
        let dir = TempDir::new().unwrap();
        write_script(dir.path(), "tool-fail", "#!/bin/sh\nexit \"$1\"\n");

        let found = PathPlugins::with_path(dir.path().as_os_str()).discover("tool").unwrap();
        let context = Context::default();
        let args = Arguments::new(vec![Value::from("3")], Default::default(), &context);
        assert_eq!(found[0].function().call(args).unwrap(), Value::Int(3));
    }
}
