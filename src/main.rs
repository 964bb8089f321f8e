//! begins-demo
//!
//! A small program showing subcommands, chaining and logging flags.
//!
//! ```text
//! begins-demo --name Ada hello --greeting Hi -- goodbye
//! ```

use std::process::ExitCode;

use begins::{Function, Logging, Parameter, Program, Registry, Signature, Value};
use tracing::info;

/// Upper bound for `goodbye --times`.
const MAX_GOODBYES: i64 = 100;

fn commands() -> Result<Registry, begins::Error> {
    let mut registry = Registry::new();

    registry.register(
        Function::new(
            "hello",
            Signature::new(vec![
                Parameter::new("greeting").with_default("Hello").with_annotation("Word of greeting"),
            ])?,
            |args| {
                let name = args.context().last_return.clone().unwrap_or_default();
                let greeting = args.arg(0).cloned().unwrap_or_default();
                info!(%greeting, "greeting");
                Ok(Value::from(format!("{}, {}!", greeting, name)))
            },
        )
        .with_description("Greet the named person"),
    )?;

    registry.register(
        Function::new(
            "goodbye",
            Signature::new(vec![Parameter::new("times").with_default(1)])?,
            |args| {
                let times = args
                    .arg(0)
                    .and_then(Value::as_int)
                    .unwrap_or(1)
                    .clamp(0, MAX_GOODBYES);
                let words = vec![Value::from("Goodbye"); times as usize];
                Ok(Value::List(words))
            },
        )
        .with_description("Say goodbye, possibly several times"),
    )?;

    Ok(registry)
}

fn main() -> ExitCode {
    let registry = match commands() {
        Ok(registry) => registry,
        Err(err) => return begins::program::report(&err),
    };

    let main = Function::new(
        "main",
        Signature::new(vec![Parameter::new("name").with_default("World").with_annotation("Who to talk to")])
            .unwrap_or_else(|_| Signature::empty()),
        |args| Ok(args.arg(0).cloned().unwrap_or_default()),
    )
    .with_description("Demonstration of begins");

    let program = Program::new(begins::Callable::from(main).with(Logging::new()))
        .registry(registry)
        .env_prefix("DEMO_")
        .config_file(".begins-demo.toml")
        .auto_convert(true)
        .cmd_delim("--");

    match program.run() {
        Ok(value) => match serde_json::to_string(&value) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {}", err);
                ExitCode::FAILURE
            }
        },
        Err(err) => begins::program::report(&err),
    }
}
