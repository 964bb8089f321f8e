//! error
//!
//! Crate-level error type.
//!
//! # Taxonomy
//!
//! Failures fall into two audiences:
//!
//! - **Integrator** errors are programming mistakes in how the command was
//!   declared or wired: [`Error::UnsupportedSignature`],
//!   [`Error::InvalidSignature`], [`Error::DuplicateRegistration`] and
//!   [`Error::MissingOption`]. They surface when the parser is built or when
//!   the parser and signature disagree, never because of user input.
//! - **User** errors come from the command line itself:
//!   [`Error::MissingRequiredValue`], [`Error::InvalidValue`],
//!   [`Error::UnknownSubcommand`] and [`Error::Parse`]. [`crate::Program::start`]
//!   turns these into a diagnostic and a non-zero exit code.
//!
//! Nothing in this crate retries.

use thiserror::Error;

use crate::convert::ConversionError;
use crate::core::config::ConfigError;
use crate::extensions::ExtensionError;
use crate::registry::PluginError;

/// Exit status used when the invocation was interrupted by the user.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Errors from building, parsing and invoking a command.
#[derive(Debug, Error)]
pub enum Error {
    /// The signature cannot be expressed as command line flags.
    #[error("unsupported signature for '{function}': {reason}")]
    UnsupportedSignature { function: String, reason: String },

    /// The declared signature breaks parameter ordering rules.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// A subcommand with this name is already registered.
    #[error("function named '{0}' already registered")]
    DuplicateRegistration(String),

    /// The parsed options lack a value the signature expects.
    #[error("missing command line option '{0}'")]
    MissingOption(String),

    /// A required option was not supplied on the command line.
    #[error("'{0}' is a required option")]
    MissingRequiredValue(String),

    /// A chained command line named a subcommand that is not registered.
    #[error("unknown subcommand '{0}'")]
    UnknownSubcommand(String),

    /// A supplied value could not be converted to the parameter's type.
    #[error("invalid value for '{name}': {source}")]
    InvalidValue {
        name: String,
        #[source]
        source: ConversionError,
    },

    /// The flag parser rejected the command line (also carries help output).
    #[error(transparent)]
    Parse(#[from] clap::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Extension(#[from] ExtensionError),

    /// The user interrupted the invocation.
    #[error("interrupted")]
    Interrupted,

    /// The command function itself failed.
    #[error(transparent)]
    Function(anyhow::Error),
}

impl Error {
    /// Whether the error was caused by command line input rather than by
    /// how the program was declared.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::MissingRequiredValue(_)
                | Error::InvalidValue { .. }
                | Error::UnknownSubcommand(_)
                | Error::Parse(_)
                | Error::Interrupted
        )
    }

    /// Process exit status for this error.
    ///
    /// Parse errors use clap's own status, so `--help` exits with 0.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Parse(e) => u8::try_from(e.exit_code()).unwrap_or(2),
            Error::Interrupted => EXIT_INTERRUPTED,
            _ => 1,
        }
    }
}

/// Marker error a command function returns when it observes a user interrupt.
///
/// ```
/// use begins::{Function, Interrupted, Signature, Value};
///
/// let main = Function::new("main", Signature::empty(), |_| {
///     Err::<Value, _>(Interrupted.into())
/// });
/// # let _ = main;
/// ```
#[derive(Debug, Clone, Copy, Error)]
#[error("interrupted")]
pub struct Interrupted;
