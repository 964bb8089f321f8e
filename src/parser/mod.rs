//! parser
//!
//! Flag parsers generated from signatures.
//!
//! # Architecture
//!
//! Building a parser happens in two steps:
//!
//! 1. A [`ParserBuilder`] collects [`OptionSpec`]s: first from extensions,
//!    outermost first, then one per named parameter. Conflicting flags are
//!    resolved as they are added, so the last registration wins.
//! 2. The finished [`Parser`] renders a `clap::Command` on demand and turns
//!    clap's matches into [`ParsedOptions`], filling unsupplied options from
//!    their resolved defaults.
//!
//! clap is only the grammar. Defaults, conflict resolution and help text
//! are decided here, before clap sees anything.
//!
//! # Flags
//!
//! Every named parameter `name` becomes `-n/--name NAME`. A variadic
//! positional parameter becomes a trailing catch-all positional that also
//! accepts negative numbers. When subcommands exist, a subcommand name ends
//! the catch-all. A variadic keyword parameter cannot be expressed and fails
//! the build.
//!
//! Help layout is controlled by a [`HelpFormat`] attached with
//! [`Parser::with_format`].
//!
//! # Example
//!
//! ```
//! use begins::{Callable, Defaults, Function, Parameter, Signature, Value};
//! use begins::parser::build;
//!
//! let main = Callable::from(Function::new(
//!     "main",
//!     Signature::new(vec![Parameter::new("name"), Parameter::new("count").with_default(1)]).unwrap(),
//!     |_| Ok(Value::None),
//! ));
//!
//! let parser = build(&main, &Defaults::new(), None).unwrap().unwrap();
//! let options = parser.parse_from(["main", "--name", "ada"]).unwrap();
//! assert_eq!(options.get("name"), Some(&Value::from("ada")));
//! assert_eq!(options.get("count"), Some(&Value::from(1)));
//! ```

mod format;
mod options;

pub use format::HelpFormat;
pub use options::{OptionAction, OptionSpec, ParsedOptions, Selected, Slot, VariadicSpec};

use std::ffi::OsString;
use std::io::Write;

use clap::builder::PossibleValuesParser;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use tracing::debug;

use crate::core::callable::{inspect, Callable};
use crate::core::signature::{ParamKind, Parameter};
use crate::core::value::Value;
use crate::defaults::Defaults;
use crate::error::Error;
use crate::registry::Registry;

/// Id of the replacement help flag used when `-h` or `--help` is claimed.
const HELP_ID: &str = "__begins_help";

/// Collects options for one command.
#[derive(Debug, Clone)]
pub struct ParserBuilder {
    name: String,
    description: Option<String>,
    options: Vec<OptionSpec>,
    variadic: Option<VariadicSpec>,
    subcommands: Vec<Parser>,
}

impl ParserBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            options: Vec::new(),
            variadic: None,
            subcommands: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_string);
        self
    }

    /// Add an option, taking over any flags it shares with earlier options.
    ///
    /// An earlier option that loses all of its flags, or that has the same
    /// destination, is dropped.
    pub fn add_option(&mut self, spec: OptionSpec) {
        for existing in &mut self.options {
            if spec.short.is_some() && existing.short == spec.short {
                debug!(flag = ?spec.short, from = %existing.dest, to = %spec.dest, "short flag reassigned");
                existing.short = None;
            }
            if spec.long.is_some() && existing.long == spec.long {
                debug!(flag = ?spec.long, from = %existing.dest, to = %spec.dest, "long flag reassigned");
                existing.long = None;
            }
        }
        self.options.retain(|existing| {
            (existing.short.is_some() || existing.long.is_some()) && existing.dest != spec.dest
        });
        if self.variadic.as_ref().is_some_and(|v| v.name == spec.dest) {
            debug!(dest = %spec.dest, "variadic positional replaced by option");
            self.variadic = None;
        }
        self.options.push(spec);
    }

    /// Set the catch-all positional, replacing any option with its name.
    pub fn set_variadic(&mut self, spec: VariadicSpec) {
        if self.options.iter().any(|o| o.dest == spec.name) {
            debug!(dest = %spec.name, "option replaced by variadic positional");
            self.options.retain(|o| o.dest != spec.name);
        }
        self.variadic = Some(spec);
    }

    pub fn add_subcommand(&mut self, parser: Parser) {
        self.subcommands.push(parser);
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    /// Whether nothing at all would be parsed.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty() && self.variadic.is_none() && self.subcommands.is_empty()
    }

    pub fn build(self) -> Parser {
        Parser {
            name: self.name,
            description: self.description,
            options: self.options,
            variadic: self.variadic,
            subcommands: self.subcommands,
            format: HelpFormat::default(),
        }
    }
}

/// A generated flag parser.
#[derive(Debug, Clone)]
pub struct Parser {
    name: String,
    description: Option<String>,
    options: Vec<OptionSpec>,
    variadic: Option<VariadicSpec>,
    subcommands: Vec<Parser>,
    format: HelpFormat,
}

impl Parser {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Options in registration order.
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn option(&self, dest: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.dest == dest)
    }

    pub fn variadic(&self) -> Option<&VariadicSpec> {
        self.variadic.as_ref()
    }

    /// Subcommand parsers, sorted by name.
    pub fn subcommands(&self) -> &[Parser] {
        &self.subcommands
    }

    pub fn subcommand(&self, name: &str) -> Option<&Parser> {
        self.subcommands.iter().find(|p| p.name == name)
    }

    /// Lay out help with `format`, for this parser and its subcommands.
    pub fn with_format(mut self, format: HelpFormat) -> Self {
        self.subcommands = self
            .subcommands
            .into_iter()
            .map(|sub| sub.with_format(format.clone()))
            .collect();
        self.format = format;
        self
    }

    pub fn format(&self) -> &HelpFormat {
        &self.format
    }

    /// Render the clap command for this parser.
    pub fn command(&self) -> Command {
        let mut command = Command::new(self.name.clone())
            .disable_help_subcommand(true)
            .next_line_help(self.format.is_next_line_help());
        if let Some(description) = &self.description {
            command = command.about(self.format.description(description));
        }
        if let Some(heading) = self.format.heading() {
            command = command.subcommand_help_heading(heading.to_string());
        }

        let short_taken = self.options.iter().any(|o| o.short == Some('h'));
        let long_taken = self.options.iter().any(|o| o.long.as_deref() == Some("help"));
        if short_taken || long_taken {
            command = command.disable_help_flag(true);
            if !(short_taken && long_taken) {
                let mut help = Arg::new(HELP_ID)
                    .action(ArgAction::Help)
                    .help("Print help");
                if !short_taken {
                    help = help.short('h');
                }
                if !long_taken {
                    help = help.long("help");
                }
                command = command.arg(help);
            }
        }

        for spec in &self.options {
            command = command.arg(option_arg(spec, &self.format));
        }

        if let Some(variadic) = &self.variadic {
            let mut arg = Arg::new(variadic.name.clone())
                .num_args(0..)
                .action(ArgAction::Append)
                .value_name(variadic.name.clone());
            arg = if variadic.passthrough {
                arg.trailing_var_arg(true).allow_hyphen_values(true)
            } else {
                arg.allow_negative_numbers(true)
            };
            if let Some(help) = &variadic.help {
                arg = arg.help(self.format.argument(help));
            }
            command = command.arg(arg);
        }

        if !self.subcommands.is_empty() {
            command = command.subcommand_precedence_over_arg(true);
        }
        for sub in &self.subcommands {
            command = command.subcommand(sub.command());
        }
        command
    }

    /// Full help text.
    pub fn render_help(&self) -> String {
        self.command().render_help().to_string()
    }

    /// Parse a complete command line, program name first.
    ///
    /// # Errors
    ///
    /// Returns clap's error for invalid input, and for `--help`.
    pub fn parse_from<I, T>(&self, args: I) -> Result<ParsedOptions, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command().try_get_matches_from(args)?;
        Ok(self.collect(&matches))
    }

    /// Parse a follow-up chunk of a chained command line.
    ///
    /// The chunk has no program name; its first word must name a subcommand.
    ///
    /// # Errors
    ///
    /// Returns clap's error for an unknown or missing subcommand or invalid
    /// subcommand options.
    pub fn parse_chained<I, T>(&self, chunk: I) -> Result<Selected, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = Command::new(self.name.clone())
            .disable_help_subcommand(true)
            .subcommand_required(true)
            .subcommands(self.subcommands.iter().map(Parser::command));

        let args = std::iter::once(OsString::from(&self.name)).chain(chunk.into_iter().map(Into::into));
        let matches = command.try_get_matches_from_mut(args)?;

        match matches.subcommand() {
            Some((name, sub_matches)) => match self.subcommand(name) {
                Some(sub) => Ok(Selected {
                    name: name.to_string(),
                    options: sub.collect(sub_matches),
                }),
                None => Err(command.error(
                    ErrorKind::InvalidSubcommand,
                    format!("unknown subcommand '{}'", name),
                )),
            },
            None => Err(command.error(ErrorKind::MissingSubcommand, "a subcommand is required")),
        }
    }

    /// Write a shell completion script for this parser.
    pub fn write_completions(&self, shell: Shell, out: &mut dyn Write) {
        let mut command = self.command();
        clap_complete::generate(shell, &mut command, self.name.clone(), out);
    }

    fn collect(&self, matches: &ArgMatches) -> ParsedOptions {
        let mut parsed = ParsedOptions::new();

        for spec in &self.options {
            let supplied = match spec.action {
                OptionAction::Value => matches
                    .get_one::<String>(&spec.dest)
                    .map(|s| Value::Str(s.clone())),
                OptionAction::Flag => matches
                    .get_flag(&spec.dest)
                    .then_some(Value::Bool(true)),
            };
            match supplied.or_else(|| spec.default.value().cloned()) {
                Some(value) => parsed.set(spec.dest.clone(), value),
                None if spec.action == OptionAction::Flag => parsed.set(spec.dest.clone(), false),
                None => parsed.set_unset(spec.dest.clone()),
            }
        }

        if let Some(variadic) = &self.variadic {
            let values: Vec<Value> = matches
                .get_many::<String>(&variadic.name)
                .map(|values| values.map(|s| Value::Str(s.clone())).collect())
                .unwrap_or_default();
            parsed.set(variadic.name.clone(), values);
        }

        if let Some((name, sub_matches)) = matches.subcommand() {
            if let Some(sub) = self.subcommand(name) {
                parsed.select(name, sub.collect(sub_matches));
            }
        }

        parsed
    }
}

fn option_arg(spec: &OptionSpec, format: &HelpFormat) -> Arg {
    let mut arg = Arg::new(spec.dest.clone());
    if let Some(short) = spec.short {
        arg = arg.short(short);
    }
    if let Some(long) = &spec.long {
        arg = arg.long(long.clone());
    }

    match spec.action {
        OptionAction::Value => {
            arg = arg.action(ArgAction::Set).required(spec.required());
            if let Some(metavar) = &spec.metavar {
                arg = arg.value_name(metavar.clone());
            }
            if !spec.choices.is_empty() {
                arg = arg.value_parser(PossibleValuesParser::new(spec.choices.clone()));
            }
        }
        OptionAction::Flag => arg = arg.action(ArgAction::SetTrue),
    }

    if let Some(help) = spec.help_text(format) {
        arg = arg.help(help);
    }
    if let Some(heading) = &spec.heading {
        arg = arg.help_heading(heading.clone());
    }
    arg
}

/// The option generated for a named parameter.
pub fn option_for(param: &Parameter, defaults: &Defaults) -> OptionSpec {
    let default = defaults.resolve(&param.name, param.default.as_ref());
    let mut spec = OptionSpec::value(param.name.clone(), default).metavar(defaults.metavar(&param.name));
    if let Some(first) = param.name.chars().next() {
        spec = spec.short(first);
    }
    if let Some(annotation) = &param.annotation {
        spec = spec.help(annotation.clone());
    }
    spec
}

/// Collect the options for one callable: extension flags, then parameters.
///
/// # Errors
///
/// Returns `Error::UnsupportedSignature` for a variadic keyword parameter.
pub fn builder_for(callable: &Callable, defaults: &Defaults) -> Result<ParserBuilder, Error> {
    let inspection = inspect(callable, true)?;
    let function = inspection.function;
    let mut builder = ParserBuilder::new(function.name()).with_description(function.description());

    for extension in &inspection.extensions {
        extension.contribute(&mut builder, &defaults.scoped(extension.name()));
    }

    for param in function.signature() {
        match param.kind {
            ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword | ParamKind::KeywordOnly => {
                builder.add_option(option_for(param, defaults));
            }
            ParamKind::VarPositional => builder.set_variadic(VariadicSpec {
                name: param.name.clone(),
                help: param.annotation.clone(),
                passthrough: param.passthrough,
            }),
            ParamKind::VarKeyword => {
                return Err(Error::UnsupportedSignature {
                    function: function.name().to_string(),
                    reason: "variable length keyword arguments not supported".into(),
                })
            }
        }
    }

    Ok(builder)
}

/// Build the parser for a callable and, optionally, its subcommands.
///
/// `defaults` should already be scoped to the callable's config section.
/// Each subcommand resolves its defaults in a section named after itself.
///
/// Returns `None` when there is nothing to parse: no parameters, no
/// extension flags and no subcommands.
///
/// # Errors
///
/// Returns `Error::UnsupportedSignature` if the callable or any subcommand
/// declares a variadic keyword parameter.
pub fn build(
    callable: &Callable,
    defaults: &Defaults,
    subcommands: Option<&Registry>,
) -> Result<Option<Parser>, Error> {
    let mut builder = builder_for(callable, defaults)?;

    if let Some(registry) = subcommands {
        for command in registry.commands() {
            let sub = builder_for(&command, &defaults.scoped(command.name()))?;
            builder.add_subcommand(sub.build());
        }
    }

    if builder.is_empty() {
        debug!(command = callable.name(), "nothing to parse");
        return Ok(None);
    }

    debug!(
        command = callable.name(),
        options = builder.options().len(),
        subcommands = builder.subcommands.len(),
        "built parser"
    );
    Ok(Some(builder.build()))
}
