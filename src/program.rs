//! program
//!
//! The entry point tying parsing and invocation together.
//!
//! # Example
//!
//! ```
//! use begins::{Function, Parameter, Program, Signature, Value};
//!
//! let main = Function::new(
//!     "main",
//!     Signature::new(vec![Parameter::new("a"), Parameter::new("b").with_default("x")]).unwrap(),
//!     |args| Ok(Value::List(args.positional().to_vec())),
//! );
//!
//! let result = Program::new(main).run_from(["prog", "--a", "A"]).unwrap();
//! assert_eq!(result, Value::List(vec![Value::from("A"), Value::from("x")]));
//! ```

use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap_complete::Shell;
use tracing::{debug, warn};

use crate::core::callable::Callable;
use crate::core::config::ConfigFile;
use crate::core::value::Value;
use crate::defaults::{Defaults, Environment};
use crate::error::Error;
use crate::invoke;
use crate::parser::{self, HelpFormat, ParsedOptions, Parser};
use crate::registry::{self, PluginProvider, Registry};

/// A command line program built around one callable.
pub struct Program {
    callable: Callable,
    env_prefix: Option<String>,
    config_file: Option<PathBuf>,
    config_section: Option<String>,
    group: Option<String>,
    registry: Option<Registry>,
    plugins: Vec<(String, Arc<dyn PluginProvider>)>,
    auto_convert: bool,
    cmd_delim: Option<String>,
    environment: Option<Arc<dyn Environment>>,
    format: HelpFormat,
}

impl Program {
    pub fn new(callable: impl Into<Callable>) -> Self {
        Self {
            callable: callable.into(),
            env_prefix: None,
            config_file: None,
            config_section: None,
            group: None,
            registry: None,
            plugins: Vec::new(),
            auto_convert: false,
            cmd_delim: None,
            environment: None,
            format: HelpFormat::default(),
        }
    }

    /// Read defaults from `<PREFIX><NAME>` environment variables.
    ///
    /// An empty prefix enables lookups of the bare uppercased names.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Read defaults from this file in the home directory and as given.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Config section for the main function, instead of its name.
    pub fn config_section(mut self, section: impl Into<String>) -> Self {
        self.config_section = Some(section.into());
        self
    }

    /// Take subcommands from a named process-wide group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Take subcommands from this registry instead of a process-wide group.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Discover plugin subcommands published under `key`.
    pub fn plugins(mut self, key: impl Into<String>, provider: impl PluginProvider + 'static) -> Self {
        self.plugins.push((key.into(), Arc::new(provider)));
        self
    }

    /// Convert values to the type of their parameter's default.
    pub fn auto_convert(mut self, enabled: bool) -> Self {
        self.auto_convert = enabled;
        self
    }

    /// Allow several subcommands per run, separated by `delim`.
    pub fn cmd_delim(mut self, delim: impl Into<String>) -> Self {
        self.cmd_delim = Some(delim.into());
        self
    }

    /// Help layout for the generated parser and its subcommands.
    pub fn formatter(mut self, format: HelpFormat) -> Self {
        self.format = format;
        self
    }

    /// Environment used for default lookups.
    pub fn environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// The default resolver for the main function.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the config file exists but is unusable.
    pub fn defaults(&self) -> Result<Defaults, Error> {
        let mut defaults = Defaults::new();
        if let Some(prefix) = &self.env_prefix {
            defaults = defaults.with_env_prefix(prefix.clone());
        }
        if let Some(environment) = &self.environment {
            defaults = defaults.with_environment(Arc::clone(environment));
        }
        if let Some(path) = &self.config_file {
            let loaded = ConfigFile::load(path)?;
            for warning in &loaded.warnings {
                warn!(path = %warning.path.display(), "{}", warning.message);
            }
            debug!(files = ?loaded.config.loaded_from(), "loaded config");
            defaults = defaults.with_config(loaded.config);
        }

        let section = self
            .config_section
            .clone()
            .unwrap_or_else(|| self.callable.name().to_string());
        Ok(defaults.scoped(section))
    }

    /// The subcommands available to this program, plugins included.
    ///
    /// # Errors
    ///
    /// Returns `Error::Plugin` if discovery fails.
    pub fn subcommands(&self) -> Result<Registry, Error> {
        match &self.registry {
            Some(explicit) => {
                let mut registry = explicit.clone();
                for (key, provider) in &self.plugins {
                    registry.load_plugins(provider.as_ref(), key)?;
                }
                Ok(registry)
            }
            None => {
                let group = self.group.as_deref();
                for (key, provider) in &self.plugins {
                    registry::load_plugins(group, provider.as_ref(), key)?;
                }
                Ok(registry::snapshot(group))
            }
        }
    }

    /// Build the parser, or `None` when there is nothing to parse.
    ///
    /// # Errors
    ///
    /// Fails for unsupported signatures, config and plugin errors.
    pub fn build_parser(&self) -> Result<Option<Parser>, Error> {
        let registry = self.subcommands()?;
        self.parser_with(&self.defaults()?, &registry)
    }

    fn parser_with(&self, defaults: &Defaults, registry: &Registry) -> Result<Option<Parser>, Error> {
        let parser = parser::build(
            &self.callable,
            defaults,
            (!registry.is_empty()).then_some(registry),
        )?;
        Ok(parser.map(|parser| parser.with_format(self.format.clone())))
    }

    /// Parse `args` (program name first) and run.
    ///
    /// # Errors
    ///
    /// Any build, parse or invocation error. Help output arrives as an
    /// `Error::Parse` with exit code 0.
    pub fn run_from<I, T>(&self, args: I) -> Result<Value, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let defaults = self.defaults()?;
        let registry = self.subcommands()?;

        let options = match self.parser_with(&defaults, &registry)? {
            Some(parser) => self.parse(&parser, args)?,
            None => {
                debug!(command = self.callable.name(), "no parser needed");
                ParsedOptions::new()
            }
        };

        invoke::invoke(&self.callable, &options, Some(&registry), self.auto_convert)
    }

    /// Run with the process arguments.
    pub fn run(&self) -> Result<Value, Error> {
        self.run_from(std::env::args_os())
    }

    /// Run with the process arguments and report the outcome.
    pub fn start(&self) -> ExitCode {
        match self.run() {
            Ok(_) => ExitCode::SUCCESS,
            Err(err) => report(&err),
        }
    }

    /// Write a completion script for this program's parser.
    ///
    /// # Errors
    ///
    /// Fails if the parser cannot be built.
    pub fn write_completions(&self, shell: Shell, out: &mut dyn Write) -> Result<(), Error> {
        if let Some(parser) = self.build_parser()? {
            parser.write_completions(shell, out);
        }
        Ok(())
    }

    fn parse(&self, parser: &Parser, args: Vec<OsString>) -> Result<ParsedOptions, Error> {
        let delim = match &self.cmd_delim {
            Some(delim) if !parser.subcommands().is_empty() => OsStr::new(delim.as_str()),
            _ => return Ok(parser.parse_from(args)?),
        };

        let mut chunks = args.split(|arg| arg.as_os_str() == delim);
        let first = chunks.next().unwrap_or_default();
        let mut options = parser.parse_from(first.iter().cloned())?;

        for chunk in chunks.filter(|chunk| !chunk.is_empty()) {
            let selected = parser.parse_chained(chunk.iter().cloned())?;
            debug!(command = %selected.name, "chained subcommand");
            options.select(selected.name, selected.options);
        }
        Ok(options)
    }
}

/// Print a diagnostic for `err` and pick the exit status.
pub fn report(err: &Error) -> ExitCode {
    match err {
        Error::Parse(e) => {
            let _ = e.print();
        }
        Error::MissingRequiredValue(_) => eprintln!("{}", err),
        Error::Interrupted => {}
        _ => eprintln!("error: {}", err),
    }
    ExitCode::from(err.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::callable::Function;
    use crate::core::signature::{Parameter, Signature};
    use std::collections::HashMap;

    fn collect(name: &str, params: Vec<Parameter>) -> Function {
        Function::new(name, Signature::new(params).unwrap(), |args| {
            Ok(Value::List(args.positional().to_vec()))
        })
    }

    #[test]
    fn void_program_runs_directly() {
        let program = Program::new(Function::new("main", Signature::empty(), |args| {
            assert!(args.positional().is_empty());
            Ok(Value::from("called"))
        }))
        .registry(Registry::new());

        assert!(program.build_parser().unwrap().is_none());
        assert_eq!(program.run_from(["prog"]).unwrap(), Value::from("called"));
    }

    #[test]
    fn explicit_default_used_when_not_supplied() {
        let program = Program::new(collect(
            "main",
            vec![Parameter::new("a"), Parameter::new("b").with_default(Value::None)],
        ))
        .registry(Registry::new());

        let result = program.run_from(["prog", "--a", "A"]).unwrap();
        assert_eq!(result, Value::List(vec![Value::from("A"), Value::None]));
    }

    #[test]
    fn environment_supplies_defaults() {
        let env: HashMap<String, String> = [("OPT".to_string(), "5".to_string())].into();
        let program = Program::new(collect("main", vec![Parameter::new("opt").with_default("X")]))
            .registry(Registry::new())
            .env_prefix("")
            .environment(Arc::new(env));

        let result = program.run_from(["prog"]).unwrap();
        assert_eq!(result, Value::List(vec![Value::from("5")]));
    }

    #[test]
    fn config_section_override() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("app.toml");
        std::fs::write(&path, "[main]\nname = \"by-name\"\n[app]\nname = \"by-section\"").unwrap();

        let base = || {
            Program::new(collect("main", vec![Parameter::new("name")]))
                .registry(Registry::new())
                .config_file(&path)
        };

        assert_eq!(
            base().run_from(["prog"]).unwrap(),
            Value::List(vec![Value::from("by-name")])
        );
        assert_eq!(
            base().config_section("app").run_from(["prog"]).unwrap(),
            Value::List(vec![Value::from("by-section")])
        );
    }

    #[test]
    fn chained_subcommands_run_in_order() {
        let mut registry = Registry::new();
        registry
            .register(Function::new(
                "add",
                Signature::new(vec![Parameter::new("n").with_default(0)]).unwrap(),
                |args| {
                    let previous = args
                        .context()
                        .last_return
                        .as_ref()
                        .and_then(Value::as_int)
                        .unwrap_or(0);
                    let n = args.arg(0).and_then(Value::as_int).unwrap_or(0);
                    Ok(Value::Int(previous + n))
                },
            ))
            .unwrap();

        let program = Program::new(Function::new("main", Signature::empty(), |_| Ok(Value::Int(1))))
            .registry(registry)
            .auto_convert(true)
            .cmd_delim("--");

        let result = program
            .run_from(["prog", "add", "-n", "2", "--", "add", "-n", "3"])
            .unwrap();
        assert_eq!(result, Value::Int(6));
    }

    #[test]
    fn chained_chunk_must_name_subcommand() {
        let mut registry = Registry::new();
        registry.register(collect("one", vec![])).unwrap();

        let program = Program::new(collect("main", vec![]))
            .registry(registry)
            .cmd_delim("--");

        let err = program.run_from(["prog", "one", "--", "two"]).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn plugins_join_explicit_registry() {
        let provider = crate::registry::StaticPlugins::new().with(
            "demo.plugins",
            Function::new("plug", Signature::empty(), |_| Ok(Value::from("plugged"))),
        );
        let program = Program::new(collect("main", vec![]))
            .registry(Registry::new())
            .plugins("demo.plugins", provider);

        assert_eq!(program.subcommands().unwrap().len(), 1);
        assert_eq!(program.run_from(["prog", "plug"]).unwrap(), Value::from("plugged"));
    }

    #[test]
    fn subcommand_name_ends_variadic_main() {
        let mut registry = Registry::new();
        registry
            .register(Function::new("sub", Signature::empty(), |args| {
                Ok(args.context().last_return.clone().unwrap_or(Value::None))
            }))
            .unwrap();
        let program = Program::new(collect("main", vec![Parameter::var_positional("rest")]))
            .registry(registry);

        let result = program.run_from(["prog", "x", "sub"]).unwrap();
        assert_eq!(result, Value::List(vec![Value::from("x")]));
    }

    #[test]
    fn formatter_reaches_subcommands() {
        let mut registry = Registry::new();
        registry.register(collect("sub", vec![Parameter::new("n")])).unwrap();
        let format = HelpFormat::new()
            .argument_defaults(false)
            .subcommand_heading("Available subcommands");
        let program = Program::new(collect("main", vec![]))
            .registry(registry)
            .formatter(format.clone());

        let parser = program.build_parser().unwrap().unwrap();
        assert_eq!(parser.format(), &format);
        assert_eq!(parser.subcommand("sub").unwrap().format(), &format);
        assert!(parser.render_help().contains("Available subcommands"));
    }

    #[test]
    fn help_is_a_parse_error_with_success_status() {
        let program = Program::new(collect("main", vec![Parameter::new("a")])).registry(Registry::new());
        let err = program.run_from(["prog", "--help"]).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn missing_required_flag_fails() {
        let program = Program::new(collect("main", vec![Parameter::new("a")])).registry(Registry::new());
        let err = program.run_from(["prog"]).unwrap_err();
        assert!(err.is_user_error());
        assert_ne!(err.exit_code(), 0);
    }
}
