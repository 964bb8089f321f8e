//! extensions::tracebacks
//!
//! Panic reports with backtraces, optionally saved to files.
//!
//! `--tracebacks` installs a panic hook for the rest of the process. With
//! `--tbdir DIR` each report is written to a new timestamped file in `DIR`
//! instead of stderr.

use std::backtrace::Backtrace;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use super::{Extension, ExtensionError};
use crate::core::value::Value;
use crate::defaults::Defaults;
use crate::parser::{OptionSpec, ParsedOptions, ParserBuilder};

const HEADING: &str = "tracebacks";

/// Installs a panic hook that reports the panic with a full backtrace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tracebacks;

impl Tracebacks {
    pub fn new() -> Self {
        Self
    }
}

impl Extension for Tracebacks {
    fn name(&self) -> &str {
        "tracebacks"
    }

    fn contribute(&self, builder: &mut ParserBuilder, defaults: &Defaults) {
        builder.add_option(
            OptionSpec::flag("tracebacks", defaults.resolve("tracebacks", Some(&Value::Bool(false))))
                .help("Report panics with a backtrace")
                .heading(HEADING),
        );
        builder.add_option(
            OptionSpec::value("tbdir", defaults.resolve("tbdir", Some(&Value::None)))
                .metavar(defaults.metavar("tbdir"))
                .help("Write panic reports to files in this directory")
                .heading(HEADING),
        );
    }

    fn activate(&self, options: &ParsedOptions) -> Result<(), ExtensionError> {
        if !options.get("tracebacks").is_some_and(Value::is_truthy) {
            return Ok(());
        }

        let dir = options
            .get("tbdir")
            .filter(|value| !value.is_none())
            .map(|value| PathBuf::from(value.to_string()));
        if let Some(dir) = &dir {
            if !dir.is_dir() {
                return Err(ExtensionError::Setup {
                    extension: self.name().to_string(),
                    message: format!("'{}' is not a directory", dir.display()),
                });
            }
        }

        debug!(dir = ?dir, "installing panic hook");
        std::panic::set_hook(Box::new(move |info| {
            let report = format_report(&info.to_string(), &Backtrace::force_capture());
            match write_report(dir.as_deref(), &report) {
                Ok(Some(path)) => eprintln!("panic report written to {}", path.display()),
                Ok(None) => {}
                Err(e) => eprintln!("failed to write panic report: {}\n{}", e, report),
            }
        }));
        Ok(())
    }
}

fn format_report(message: &str, backtrace: &Backtrace) -> String {
    format!("{}\n\nstack backtrace:\n{}", message, backtrace)
}

/// Write a report to a new file in `dir`, or to stderr without one.
fn write_report(dir: Option<&Path>, report: &str) -> io::Result<Option<PathBuf>> {
    let Some(dir) = dir else {
        eprintln!("{}", report);
        return Ok(None);
    };
    let stamp = Local::now().format("%Y%m%dT%H%M%S%.6f");
    let path = dir.join(format!("traceback-{}.txt", stamp));
    fs::write(&path, report)?;
    Ok(Some(path))
}
