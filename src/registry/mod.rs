//! registry
//!
//! Named collections of subcommands.
//!
//! # Overview
//!
//! A [`Registry`] maps command names to callables and always iterates in
//! name order. Registering a name twice fails.
//!
//! Registries can be owned and passed around explicitly, or collected in
//! process-wide groups through [`subcommand`] and [`subcommand_in`]. The
//! unnamed group (`None`) always exists. Groups live until [`reset`] clears
//! them, which tests use for isolation.
//!
//! # Plugins
//!
//! [`Registry::load_plugins`] asks a [`PluginProvider`] for the callables
//! published under a discovery key and registers the ones whose names are
//! still free. See [`plugins`].
//!
//! # Example
//!
//! ```
//! use begins::{Function, Registry, Signature, Value};
//!
//! let mut registry = Registry::new();
//! registry
//!     .register(Function::new("sub", Signature::empty(), |_| Ok(Value::from("blue"))))
//!     .unwrap();
//!
//! assert!(registry.get("sub").is_some());
//! assert!(registry
//!     .register(Function::new("sub", Signature::empty(), |_| Ok(Value::None)))
//!     .is_err());
//! ```

pub mod plugins;

pub use plugins::{PathPlugins, PluginError, PluginProvider, StaticPlugins};

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::debug;

use crate::core::callable::Callable;
use crate::error::Error;

/// Subcommands keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    commands: BTreeMap<String, Arc<Callable>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callable under its function name.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateRegistration` if the name is taken.
    pub fn register(&mut self, callable: impl Into<Callable>) -> Result<(), Error> {
        let callable = callable.into();
        let name = callable.name().to_string();
        if self.commands.contains_key(&name) {
            return Err(Error::DuplicateRegistration(name));
        }
        debug!(command = %name, "registered subcommand");
        self.commands.insert(name, Arc::new(callable));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<Callable>> {
        self.commands.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// All commands, sorted by name.
    pub fn commands(&self) -> Vec<Arc<Callable>> {
        self.commands.values().cloned().collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Register the plugins `provider` publishes under `key`.
    ///
    /// Names already present are skipped, so loading twice is harmless.
    /// Returns the number of newly registered commands.
    ///
    /// # Errors
    ///
    /// Discovery failures propagate as `Error::Plugin`.
    pub fn load_plugins(&mut self, provider: &dyn PluginProvider, key: &str) -> Result<usize, Error> {
        let mut added = 0;
        for callable in provider.discover(key)? {
            if self.contains(callable.name()) {
                debug!(key, command = callable.name(), "plugin already registered");
                continue;
            }
            self.register(callable)?;
            added += 1;
        }
        debug!(key, added, "loaded plugins");
        Ok(added)
    }
}

type Groups = HashMap<Option<String>, Registry>;

static GROUPS: OnceLock<Mutex<Groups>> = OnceLock::new();

fn groups() -> MutexGuard<'static, Groups> {
    GROUPS
        .get_or_init(|| Mutex::new(Groups::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Register a callable in the default process-wide group.
///
/// The callable is handed back so the call can wrap a definition.
///
/// # Errors
///
/// Returns `Error::DuplicateRegistration` if the name is taken.
pub fn subcommand(callable: impl Into<Callable>) -> Result<Callable, Error> {
    subcommand_in(None, callable)
}

/// Register a callable in a named process-wide group.
///
/// # Errors
///
/// Returns `Error::DuplicateRegistration` if the name is taken in that group.
pub fn subcommand_in(group: Option<&str>, callable: impl Into<Callable>) -> Result<Callable, Error> {
    let callable = callable.into();
    groups()
        .entry(group.map(str::to_string))
        .or_default()
        .register(callable.clone())?;
    Ok(callable)
}

/// A copy of a process-wide group; empty if nothing was registered.
pub fn snapshot(group: Option<&str>) -> Registry {
    groups()
        .get(&group.map(str::to_string))
        .cloned()
        .unwrap_or_default()
}

/// Forget every command in a process-wide group.
pub fn reset(group: Option<&str>) {
    groups().remove(&group.map(str::to_string));
}

/// Load plugins into a process-wide group.
///
/// # Errors
///
/// Discovery failures propagate as `Error::Plugin`.
pub fn load_plugins(
    group: Option<&str>,
    provider: &dyn PluginProvider,
    key: &str,
) -> Result<usize, Error> {
    groups()
        .entry(group.map(str::to_string))
        .or_default()
        .load_plugins(provider, key)
}
