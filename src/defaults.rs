//! defaults
//!
//! Layered resolution of option defaults.
//!
//! # Precedence
//!
//! Later sources override earlier ones:
//! 1. Explicit function default
//! 2. Config file value from the resolver's section
//! 3. Environment variable `<PREFIX><NAME>` (uppercased), when enabled
//!
//! If none of these yields a value the option is required.
//!
//! # Design
//!
//! Resolution is a pure function of its three sources. The environment is
//! reached through the [`Environment`] trait so tests can supply a map
//! instead of mutating the process environment.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use begins::{Defaults, ResolvedDefault, Value};
//!
//! let env: HashMap<String, String> = [("OPT".to_string(), "5".to_string())].into();
//! let defaults = Defaults::new()
//!     .with_env_prefix("")
//!     .with_environment(Arc::new(env));
//!
//! let resolved = defaults.resolve("opt", Some(&Value::from("x")));
//! assert_eq!(resolved.value(), Some(&Value::from("5")));
//! assert!(matches!(defaults.resolve("other", None), ResolvedDefault::Required));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::config::ConfigFile;
use crate::core::value::Value;

/// Source of environment variables.
pub trait Environment: Send + Sync {
    /// Get a variable, or `None` if unset or not valid unicode.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Where a non-explicit default came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultSource {
    Config { section: String },
    Environment { variable: String },
}

/// The effective default of an option.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedDefault {
    /// The function's own default.
    Explicit(Value),
    /// A value found in the config file or the environment.
    Sourced { value: Value, source: DefaultSource },
    /// No default anywhere; the option must be supplied.
    Required,
}

impl ResolvedDefault {
    pub fn is_required(&self) -> bool {
        matches!(self, ResolvedDefault::Required)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            ResolvedDefault::Explicit(value) | ResolvedDefault::Sourced { value, .. } => {
                Some(value)
            }
            ResolvedDefault::Required => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            ResolvedDefault::Explicit(value) | ResolvedDefault::Sourced { value, .. } => {
                Some(value)
            }
            ResolvedDefault::Required => None,
        }
    }
}

/// Resolver for option defaults.
///
/// Cheap to clone; the config file and environment are shared.
#[derive(Clone)]
pub struct Defaults {
    /// `None` disables environment lookups entirely.
    env_prefix: Option<String>,
    config: Option<Arc<ConfigFile>>,
    section: Option<String>,
    environment: Arc<dyn Environment>,
}

impl Defaults {
    /// A resolver with environment lookups disabled and no config file.
    pub fn new() -> Self {
        Self {
            env_prefix: None,
            config: None,
            section: None,
            environment: Arc::new(ProcessEnvironment),
        }
    }

    /// Enable environment lookups with the given prefix (may be empty).
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    pub fn with_config(mut self, config: ConfigFile) -> Self {
        self.config = Some(Arc::new(config));
        self
    }

    pub fn with_environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.environment = environment;
        self
    }

    /// A resolver reading config values from `section`.
    pub fn scoped(&self, section: impl Into<String>) -> Self {
        Self {
            section: Some(section.into()),
            ..self.clone()
        }
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn env_enabled(&self) -> bool {
        self.env_prefix.is_some()
    }

    /// Environment variable name for a parameter; also its help placeholder.
    pub fn metavar(&self, name: &str) -> String {
        format!("{}{}", self.env_prefix.as_deref().unwrap_or(""), name).to_uppercase()
    }

    /// Resolve the default for `name`.
    pub fn resolve(&self, name: &str, explicit: Option<&Value>) -> ResolvedDefault {
        let mut resolved = match explicit {
            Some(value) => ResolvedDefault::Explicit(value.clone()),
            None => ResolvedDefault::Required,
        };

        if let (Some(config), Some(section)) = (&self.config, &self.section) {
            if let Some(text) = config.get(section, name) {
                resolved = ResolvedDefault::Sourced {
                    value: Value::Str(text.to_string()),
                    source: DefaultSource::Config {
                        section: section.clone(),
                    },
                };
            }
        }

        if self.env_enabled() {
            let variable = self.metavar(name);
            if let Some(text) = self.environment.var(&variable) {
                resolved = ResolvedDefault::Sourced {
                    value: Value::Str(text),
                    source: DefaultSource::Environment { variable },
                };
            }
        }

        resolved
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Defaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Defaults")
            .field("env_prefix", &self.env_prefix)
            .field("config", &self.config)
            .field("section", &self.section)
            .finish_non_exhaustive()
    }
}
