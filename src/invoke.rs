//! invoke
//!
//! Mapping parsed options back onto function calls.
//!
//! # Binding
//!
//! Parameters are bound in declared order:
//!
//! - positional-only and positional-or-keyword values become positional
//!   arguments
//! - keyword-only values become keyword arguments
//! - the variadic positional slot is expanded after the positional values
//!
//! A parameter missing from the options is a defect in how the parser was
//! built ([`Error::MissingOption`]). A parameter present but without a
//! value was required and not supplied ([`Error::MissingRequiredValue`]).
//!
//! # Dispatch
//!
//! The main function always runs first. Every selected subcommand then runs
//! in order, each seeing the previous result in its [`Context`]. The last
//! result is the result of the run.

use std::collections::BTreeMap;
use std::io;

use tracing::debug;

use crate::convert::Converter;
use crate::core::callable::{inspect, Arguments, Callable, Context, Function};
use crate::core::signature::ParamKind;
use crate::core::value::Value;
use crate::error::{Error, Interrupted};
use crate::parser::{ParsedOptions, Slot};
use crate::registry::Registry;

/// Bind the options for `function`'s parameters.
///
/// # Errors
///
/// Returns `Error::MissingOption`, `Error::MissingRequiredValue`, or
/// `Error::InvalidValue` when `auto_convert` is set and a value does not
/// fit its default's type.
pub fn bind<'c>(
    function: &Function,
    options: &ParsedOptions,
    auto_convert: bool,
    context: &'c Context,
) -> Result<Arguments<'c>, Error> {
    let mut positional = Vec::new();
    let mut variadic = Vec::new();
    let mut keywords = BTreeMap::new();

    for param in function.signature() {
        match param.kind {
            ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword | ParamKind::KeywordOnly => {
                let value = match options.slot(&param.name) {
                    None => return Err(Error::MissingOption(param.name.clone())),
                    Some(Slot::Unset) => return Err(Error::MissingRequiredValue(param.name.clone())),
                    Some(Slot::Set(value)) => value.clone(),
                };
                let value = match param.default.as_ref().and_then(Converter::infer) {
                    Some(converter) if auto_convert => {
                        converter
                            .convert(value)
                            .map_err(|source| Error::InvalidValue {
                                name: param.name.clone(),
                                source,
                            })?
                    }
                    _ => value,
                };
                if param.kind == ParamKind::KeywordOnly {
                    keywords.insert(param.name.clone(), value);
                } else {
                    positional.push(value);
                }
            }
            ParamKind::VarPositional => match options.get(&param.name) {
                Some(Value::List(values)) => variadic.extend(values.iter().cloned()),
                Some(Value::None) | None => {}
                Some(value) => variadic.push(value.clone()),
            },
            // Only reachable without a parser; nothing can fill it.
            ParamKind::VarKeyword => {}
        }
    }

    positional.extend(variadic);
    Ok(Arguments::new(positional, keywords, context))
}

/// Activate the extensions of `callable` and call its function.
///
/// # Errors
///
/// Fails if an extension cannot activate, if binding fails, or with the
/// function's own error.
pub fn call(
    callable: &Callable,
    options: &ParsedOptions,
    auto_convert: bool,
    context: &Context,
) -> Result<Value, Error> {
    let inspection = inspect(callable, false)?;
    for extension in &inspection.extensions {
        debug!(extension = extension.name(), "activating extension");
        extension.activate(options)?;
    }

    let function = inspection.function;
    let args = bind(function, options, auto_convert, context)?;
    debug!(command = function.name(), "invoking");
    function.call(args).map_err(function_error)
}

/// Run the main callable, then each selected subcommand.
///
/// # Errors
///
/// Returns `Error::UnknownSubcommand` if a selected subcommand is not in
/// `registry`, and any error from [`call`].
pub fn invoke(
    callable: &Callable,
    options: &ParsedOptions,
    registry: Option<&Registry>,
    auto_convert: bool,
) -> Result<Value, Error> {
    let mut context = Context::default();
    let mut result = call(callable, options, auto_convert, &context)?;

    for selected in options.subcommands() {
        let command = registry
            .and_then(|r| r.get(&selected.name))
            .ok_or_else(|| Error::UnknownSubcommand(selected.name.clone()))?;
        context.last_return = Some(result);
        result = call(&command, &selected.options, auto_convert, &context)?;
    }

    Ok(result)
}

/// Recognise user interrupts among function errors.
fn function_error(err: anyhow::Error) -> Error {
    let interrupted = err.chain().any(|cause| {
        cause.is::<Interrupted>()
            || cause
                .downcast_ref::<io::Error>()
                .is_some_and(|e| e.kind() == io::ErrorKind::Interrupted)
    });
    if interrupted {
        Error::Interrupted
    } else {
        Error::Function(err)
    }
}
