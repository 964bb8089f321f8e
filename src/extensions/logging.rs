//! extensions::logging
//!
//! Command line control over `tracing` output.
//!
//! # Options
//!
//! | Flag | Meaning |
//! |------|---------|
//! | `-v`, `--verbose` | Log at DEBUG |
//! | `-q`, `--quiet` | Log at WARN |
//! | `--loglvl LEVEL` | Explicit level, wins over the two above |
//! | `--logfile PATH` | Append to a file instead of stderr |
//! | `--logfmt {full,compact}` | Line format |
//!
//! Without any of them the level is INFO. Defaults come from the
//! `[logging]` config section.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, Level};

use super::{Extension, ExtensionError};
use crate::core::value::Value;
use crate::defaults::Defaults;
use crate::parser::{OptionSpec, ParsedOptions, ParserBuilder};

const HEADING: &str = "logging";
const LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
const FORMATS: [&str; 2] = ["full", "compact"];

/// Installs a `tracing` subscriber configured from the command line.
///
/// A subscriber installed earlier by the program is left in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logging;

impl Logging {
    pub fn new() -> Self {
        Self
    }

    /// The level selected by the parsed options.
    pub fn level(&self, options: &ParsedOptions) -> Result<Level, ExtensionError> {
        if let Some(text) = present(options, "loglvl") {
            return text.parse::<Level>().map_err(|_| ExtensionError::InvalidOption {
                extension: self.name().to_string(),
                option: "loglvl".into(),
                value: text,
            });
        }
        if options.get("verbose").is_some_and(Value::is_truthy) {
            Ok(Level::DEBUG)
        } else if options.get("quiet").is_some_and(Value::is_truthy) {
            Ok(Level::WARN)
        } else {
            Ok(Level::INFO)
        }
    }

    fn compact(&self, options: &ParsedOptions) -> Result<bool, ExtensionError> {
        match present(options, "logfmt").as_deref() {
            None | Some("full") => Ok(false),
            Some("compact") => Ok(true),
            Some(other) => Err(ExtensionError::InvalidOption {
                extension: self.name().to_string(),
                option: "logfmt".into(),
                value: other.to_string(),
            }),
        }
    }
}

/// Text of an option that was given a real value.
fn present(options: &ParsedOptions, name: &str) -> Option<String> {
    options
        .get(name)
        .filter(|value| !value.is_none())
        .map(Value::to_string)
}

impl Extension for Logging {
    fn name(&self) -> &str {
        "logging"
    }

    fn contribute(&self, builder: &mut ParserBuilder, defaults: &Defaults) {
        let unset = Value::None;
        let off = Value::Bool(false);

        builder.add_option(
            OptionSpec::flag("verbose", defaults.resolve("verbose", Some(&off)))
                .short('v')
                .help("Increase logging output")
                .heading(HEADING),
        );
        builder.add_option(
            OptionSpec::flag("quiet", defaults.resolve("quiet", Some(&off)))
                .short('q')
                .help("Decrease logging output")
                .heading(HEADING),
        );
        builder.add_option(
            OptionSpec::value("loglvl", defaults.resolve("loglvl", Some(&unset)))
                .metavar(defaults.metavar("loglvl"))
                .choices(LEVELS)
                .help("Set explicit log level")
                .heading(HEADING),
        );
        builder.add_option(
            OptionSpec::value("logfile", defaults.resolve("logfile", Some(&unset)))
                .metavar(defaults.metavar("logfile"))
                .help("Append log output to a file")
                .heading(HEADING),
        );
        builder.add_option(
            OptionSpec::value("logfmt", defaults.resolve("logfmt", Some(&Value::from("full"))))
                .metavar(defaults.metavar("logfmt"))
                .choices(FORMATS)
                .help("Log line format")
                .heading(HEADING),
        );
    }

    fn activate(&self, options: &ParsedOptions) -> Result<(), ExtensionError> {
        let level = self.level(options)?;
        let compact = self.compact(options)?;
        let builder = tracing_subscriber::fmt().with_max_level(level).with_target(false);

        let installed = match present(options, "logfile") {
            Some(path) => {
                let path = PathBuf::from(path);
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(|e| ExtensionError::LogFile {
                        path: path.clone(),
                        source: e,
                    })?;
                let builder = builder.with_ansi(false).with_writer(Mutex::new(file));
                if compact {
                    builder.compact().try_init()
                } else {
                    builder.try_init()
                }
            }
            None => {
                let builder = builder.with_writer(std::io::stderr);
                if compact {
                    builder.compact().try_init()
                } else {
                    builder.try_init()
                }
            }
        };

        match installed {
            Ok(()) => debug!(%level, "logging configured"),
            Err(e) => debug!("keeping existing subscriber: {}", e),
        }
        Ok(())
    }
}
