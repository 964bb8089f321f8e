//! parser::options
//!
//! Option descriptions fed to the flag parser, and the values it produces.

use std::collections::BTreeMap;

use crate::core::value::Value;
use crate::defaults::ResolvedDefault;
use crate::parser::format::HelpFormat;

/// How an option consumes the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionAction {
    /// Takes one value: `--name VALUE`
    Value,
    /// A switch without a value: `--name`
    Flag,
}

/// One generated command line option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    /// Single-character flag, `-x`
    pub short: Option<char>,
    /// Long flag without dashes, `--name`
    pub long: Option<String>,
    /// Key of the value in [`ParsedOptions`]
    pub dest: String,
    pub default: ResolvedDefault,
    pub help: Option<String>,
    /// Placeholder shown in help, e.g. `PORT`
    pub metavar: Option<String>,
    pub action: OptionAction,
    /// Allowed values; empty means any
    pub choices: Vec<String>,
    /// Help section the option is listed under
    pub heading: Option<String>,
}

impl OptionSpec {
    /// An option taking a value, flagged `--<dest>`.
    pub fn value(dest: impl Into<String>, default: ResolvedDefault) -> Self {
        let dest = dest.into();
        Self {
            short: None,
            long: Some(dest.clone()),
            dest,
            default,
            help: None,
            metavar: None,
            action: OptionAction::Value,
            choices: Vec::new(),
            heading: None,
        }
    }

    /// A switch flagged `--<dest>`.
    pub fn flag(dest: impl Into<String>, default: ResolvedDefault) -> Self {
        Self {
            action: OptionAction::Flag,
            ..Self::value(dest, default)
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    /// An option with no default must be given on the command line.
    pub fn required(&self) -> bool {
        self.default.is_required()
    }

    /// Help text with the default appended, as displayed.
    pub fn display_help(&self) -> Option<String> {
        self.help_text(&HelpFormat::default())
    }

    /// Help text laid out by `format`.
    pub fn help_text(&self, format: &HelpFormat) -> Option<String> {
        let suffix = match (&self.action, self.default.value()) {
            (OptionAction::Value, Some(value)) if format.shows_argument_defaults() => {
                Some(format!("(default: {})", value))
            }
            _ => None,
        };
        let help = self.help.as_deref().map(|help| format.argument(help));
        match (help, suffix) {
            (Some(help), Some(suffix)) => Some(format!("{} {}", help, suffix)),
            (Some(help), None) => Some(help),
            (None, suffix) => suffix,
        }
    }
}

/// The catch-all trailing positional slot.
#[derive(Debug, Clone, PartialEq)]
pub struct VariadicSpec {
    pub name: String,
    pub help: Option<String>,
    /// Take every remaining word verbatim, dashed ones included.
    pub passthrough: bool,
}

/// A value slot in [`ParsedOptions`].
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Supplied on the command line or filled from a default.
    Set(Value),
    /// Required, and neither supplied nor defaulted.
    Unset,
}

/// A subcommand selected on the command line, with its own options.
#[derive(Debug, Clone, PartialEq)]
pub struct Selected {
    pub name: String,
    pub options: ParsedOptions,
}

/// Values produced by parsing one command line.
///
/// Created once per program run and consumed by the invocation step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedOptions {
    values: BTreeMap<String, Slot>,
    subcommands: Vec<Selected>,
}

impl ParsedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), Slot::Set(value.into()));
    }

    /// Record that a required option received no value.
    pub fn set_unset(&mut self, name: impl Into<String>) {
        self.values.insert(name.into(), Slot::Unset);
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.values.get(name)
    }

    /// The value of `name`, if present and set.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.values.get(name) {
            Some(Slot::Set(value)) => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn select(&mut self, name: impl Into<String>, options: ParsedOptions) {
        self.subcommands.push(Selected {
            name: name.into(),
            options,
        });
    }

    /// Selected subcommands in execution order.
    pub fn subcommands(&self) -> &[Selected] {
        &self.subcommands
    }

    /// Name of the first selected subcommand.
    pub fn subcommand(&self) -> Option<&str> {
        self.subcommands.first().map(|s| s.name.as_str())
    }
}
