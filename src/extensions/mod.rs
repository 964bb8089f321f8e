//! extensions
//!
//! Wrappers that add flags to a command and act before it runs.
//!
//! # Lifecycle
//!
//! An extension takes part twice in every run:
//!
//! 1. While the parser is built, [`Extension::contribute`] adds options to
//!    the [`ParserBuilder`]. Defaults are resolved in the config section
//!    named after the extension.
//! 2. After parsing and before the function is called,
//!    [`Extension::activate`] reads its options and configures the process.
//!
//! Both steps run outermost extension first. Extensions never change the
//! parsed options. A failed activation aborts the run.
//!
//! # Provided extensions
//!
//! - [`Logging`] - log level, destination and format via `tracing`
//! - [`Tracebacks`] - panic reports with backtraces

mod logging;
mod tracebacks;

pub use logging::Logging;
pub use tracebacks::Tracebacks;

use std::path::PathBuf;

use thiserror::Error;

use crate::defaults::Defaults;
use crate::parser::{ParsedOptions, ParserBuilder};

/// Errors raised while activating an extension.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// The log file could not be opened for appending.
    #[error("cannot open log file '{path}': {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An option value is not one the extension understands.
    #[error("invalid value '{value}' for {extension} option '{option}'")]
    InvalidOption {
        extension: String,
        option: String,
        value: String,
    },

    /// Any other setup failure.
    #[error("{extension}: {message}")]
    Setup { extension: String, message: String },
}

/// A wrapper contributing flags and a pre-invocation side effect.
pub trait Extension: Send + Sync {
    /// Identifier, also the config section for the extension's defaults.
    fn name(&self) -> &str;

    /// Add this extension's options to the parser being built.
    fn contribute(&self, builder: &mut ParserBuilder, defaults: &Defaults);

    /// Act on the parsed options before the function is called.
    fn activate(&self, options: &ParsedOptions) -> Result<(), ExtensionError>;
}
