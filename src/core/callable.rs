//! core::callable
//!
//! Command functions and the extension chains wrapped around them.
//!
//! # Architecture
//!
//! A [`Callable`] is a singly linked list. Each [`Callable::Extended`] node
//! owns one [`Extension`] and the next-inner callable; the list always ends
//! in a [`Callable::Function`], the only node with a real [`Signature`].
//!
//! ```text
//! Extended(Logging) -> Extended(Tracebacks) -> Function(main)
//! ```
//!
//! [`inspect`] walks the list iteratively, so the depth of the chain never
//! grows the stack.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::signature::Signature;
use crate::core::value::Value;
use crate::error::Error;
use crate::extensions::Extension;

/// Body of a command function.
pub type Body = dyn Fn(Arguments<'_>) -> anyhow::Result<Value> + Send + Sync;

/// State shared along one program run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    /// Result of the previously invoked function in this run, if any.
    pub last_return: Option<Value>,
}

/// Arguments bound for a single call.
#[derive(Debug)]
pub struct Arguments<'a> {
    positional: Vec<Value>,
    keywords: BTreeMap<String, Value>,
    context: &'a Context,
}

impl<'a> Arguments<'a> {
    pub fn new(
        positional: Vec<Value>,
        keywords: BTreeMap<String, Value>,
        context: &'a Context,
    ) -> Self {
        Self {
            positional,
            keywords,
            context,
        }
    }

    /// Positional values in call order, variadic values last.
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn keywords(&self) -> &BTreeMap<String, Value> {
        &self.keywords
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.get(name)
    }

    pub fn context(&self) -> &Context {
        self.context
    }
}

/// A named function with a declared signature.
#[derive(Clone)]
pub struct Function {
    name: String,
    description: Option<String>,
    signature: Signature,
    body: Arc<Body>,
}

impl Function {
    /// Declare a function.
    ///
    /// # Example
    ///
    /// ```
    /// use begins::{Function, Parameter, Signature, Value};
    ///
    /// let greet = Function::new(
    ///     "greet",
    ///     Signature::new(vec![Parameter::new("name")]).unwrap(),
    ///     |args| Ok(Value::from(format!("hello {}", args.arg(0).unwrap()))),
    /// )
    /// .with_description("Say hello");
    ///
    /// assert_eq!(greet.name(), "greet");
    /// ```
    pub fn new<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(Arguments<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            signature,
            body: Arc::new(body),
        }
    }

    /// Attach the description shown in help output.
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Call the body with already bound arguments.
    pub fn call(&self, args: Arguments<'_>) -> anyhow::Result<Value> {
        (self.body)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// A function, possibly wrapped in extensions.
#[derive(Clone)]
pub enum Callable {
    Function(Function),
    Extended(ExtensionNode),
}

/// One link of an extension chain.
#[derive(Clone)]
pub struct ExtensionNode {
    extension: Arc<dyn Extension>,
    wrapped: Box<Callable>,
}

impl ExtensionNode {
    pub fn extension(&self) -> &dyn Extension {
        self.extension.as_ref()
    }

    pub fn wrapped(&self) -> &Callable {
        &self.wrapped
    }
}

impl Callable {
    /// Wrap this callable in an extension, which becomes the outermost node.
    pub fn with(self, extension: impl Extension + 'static) -> Self {
        Callable::Extended(ExtensionNode {
            extension: Arc::new(extension),
            wrapped: Box::new(self),
        })
    }

    /// The innermost function.
    pub fn function(&self) -> &Function {
        let mut current = self;
        loop {
            match current {
                Callable::Function(function) => return function,
                Callable::Extended(node) => current = &*node.wrapped,
            }
        }
    }

    /// Name of the innermost function; also the subcommand name.
    pub fn name(&self) -> &str {
        self.function().name()
    }
}

impl From<Function> for Callable {
    fn from(function: Function) -> Self {
        Callable::Function(function)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Function(function) => function.fmt(f),
            Callable::Extended(node) => f
                .debug_struct("Extended")
                .field("extension", &node.extension.name())
                .field("wrapped", &node.wrapped)
                .finish(),
        }
    }
}

/// Result of walking an extension chain.
pub struct Inspection<'a> {
    /// Extensions in traversal order, outermost first.
    pub extensions: Vec<&'a dyn Extension>,
    /// The function whose signature drives parsing.
    pub function: &'a Function,
}

impl Inspection<'_> {
    pub fn signature(&self) -> &Signature {
        self.function.signature()
    }
}

/// Unwrap a callable down to its function, collecting extensions on the way.
///
/// # Errors
///
/// Returns `Error::UnsupportedSignature` when `for_parser` is set and the
/// function declares a variadic-keyword parameter, which has no flag form.
pub fn inspect(callable: &Callable, for_parser: bool) -> Result<Inspection<'_>, Error> {
    let mut extensions = Vec::new();
    let mut current = callable;
    let function = loop {
        match current {
            Callable::Function(function) => break function,
            Callable::Extended(node) => {
                extensions.push(node.extension.as_ref());
                current = &*node.wrapped;
            }
        }
    };

    if for_parser {
        if let Some(param) = function.signature().var_keyword() {
            return Err(Error::UnsupportedSignature {
                function: function.name().to_string(),
                reason: format!(
                    "variable length keyword arguments ('{}') not supported",
                    param.name
                ),
            });
        }
    }

    Ok(Inspection {
        extensions,
        function,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signature::Parameter;
    use crate::defaults::Defaults;
    use crate::extensions::ExtensionError;
    use crate::parser::{ParsedOptions, ParserBuilder};

    struct Named(&'static str);

    impl Extension for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn contribute(&self, _builder: &mut ParserBuilder, _defaults: &Defaults) {}

        fn activate(&self, _options: &ParsedOptions) -> Result<(), ExtensionError> {
            Ok(())
        }
    }

    fn target() -> Function {
        Function::new("target", Signature::empty(), |_| Ok(Value::from("called")))
            .with_description("target")
    }

    #[test]
    fn inspect_plain_function() {
        let callable = Callable::from(target());
        let inspection = inspect(&callable, true).unwrap();
        assert!(inspection.extensions.is_empty());
        assert_eq!(inspection.function.name(), "target");
    }

    #[test]
    fn inspect_collects_extensions_outermost_first() {
        let callable = Callable::from(target())
            .with(Named("inner"))
            .with(Named("outer"));

        let inspection = inspect(&callable, true).unwrap();
        let names: Vec<_> = inspection.extensions.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["outer", "inner"]);
        assert_eq!(inspection.function.name(), "target");
    }

    #[test]
    fn wrapped_callable_exposes_inner_name() {
        let callable = Callable::from(target()).with(Named("ext"));
        assert_eq!(callable.name(), "target");
        assert_eq!(callable.function().description(), Some("target"));
    }

    #[test]
    fn var_keyword_rejected_only_for_parser() {
        let sig = Signature::new(vec![Parameter::var_keyword("kwargs")]).unwrap();
        let callable = Callable::from(Function::new("main", sig, |_| Ok(Value::None)));

        assert!(inspect(&callable, false).is_ok());
        assert!(matches!(
            inspect(&callable, true),
            Err(Error::UnsupportedSignature { .. })
        ));
    }

    #[test]
    fn call_passes_arguments() {
        let context = Context::default();
        let sum = Function::new("sum", Signature::empty(), |args| {
            Ok(Value::from(
                args.positional().iter().filter_map(Value::as_int).sum::<i64>(),
            ))
        });
        let args = Arguments::new(
            vec![Value::from(1), Value::from(2)],
            BTreeMap::new(),
            &context,
        );
        assert_eq!(sum.call(args).unwrap(), Value::from(3));
    }
}
