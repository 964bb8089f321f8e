//! Begins - command line programs derived from function signatures
//!
//! Declare a function's parameters once and get a complete command line
//! interface: parameter names become flags, defaults become option
//! defaults, annotations become help text, and running the program calls
//! the function with the parsed values.
//!
//! # Architecture
//!
//! A run flows through these modules in order:
//!
//! - [`core`] - Values, signatures, callables and config files
//! - [`defaults`] - Layered defaults from the function, config and environment
//! - [`parser`] - Flag parsers generated from signatures, rendered with clap
//! - [`registry`] - Subcommand collections and plugin discovery
//! - [`extensions`] - Wrappers adding flags and pre-run side effects
//! - [`invoke`] - Binding parsed values back onto function calls
//! - [`program`] - The entry point tying everything together
//!
//! # Example
//!
//! ```
//! use begins::{Function, Parameter, Program, Registry, Signature, Value};
//!
//! let main = Function::new(
//!     "main",
//!     Signature::new(vec![
//!         Parameter::new("host").with_default("127.0.0.1"),
//!         Parameter::new("port").with_default(8080),
//!     ])
//!     .unwrap(),
//!     |args| Ok(Value::List(args.positional().to_vec())),
//! );
//!
//! let result = Program::new(main)
//!     .registry(Registry::new())
//!     .auto_convert(true)
//!     .run_from(["serve", "--port", "9000"])
//!     .unwrap();
//!
//! assert_eq!(result, Value::List(vec![Value::from("127.0.0.1"), Value::from(9000)]));
//! ```

pub mod convert;
pub mod core;
pub mod defaults;
pub mod error;
pub mod extensions;
pub mod invoke;
pub mod parser;
pub mod program;
pub mod registry;

pub use crate::core::callable::{inspect, Arguments, Callable, Context, Function};
pub use crate::core::config::ConfigFile;
pub use crate::core::signature::{ParamKind, Parameter, Signature};
pub use crate::core::value::Value;
pub use defaults::{Defaults, Environment, ResolvedDefault};
pub use error::{Error, Interrupted};
pub use extensions::{Extension, Logging, Tracebacks};
pub use parser::{HelpFormat, OptionSpec, ParsedOptions, Parser, ParserBuilder, Slot};
pub use program::Program;
pub use registry::Registry;
