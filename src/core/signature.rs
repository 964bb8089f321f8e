//! core::signature
//!
//! Declarative function signatures.
//!
//! # Design
//!
//! Rust has no runtime reflection over function parameters, so a command
//! declares its parameter list explicitly. A [`Signature`] is the ordered,
//! kind-tagged list of [`Parameter`]s that drives both flag generation and
//! the mapping of parsed values back onto a call.
//!
//! # Invariants
//!
//! Enforced by [`Signature::new`]:
//!
//! - Parameter names are non-empty, unique and do not start with `-`
//! - At most one variadic-positional and one variadic-keyword parameter
//! - A variadic-keyword parameter comes last
//! - Positional-only parameters precede every other kind
//!
//! # Example
//!
//! ```
//! use begins::{Parameter, Signature, Value};
//!
//! let sig = Signature::new(vec![
//!     Parameter::new("host").with_default("127.0.0.1"),
//!     Parameter::new("port").with_default(8080).with_annotation("Port to bind"),
//!     Parameter::var_positional("files"),
//! ])
//! .unwrap();
//!
//! assert_eq!(sig.len(), 3);
//! assert_eq!(sig.get("port").unwrap().default, Some(Value::Int(8080)));
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::core::value::Value;
use crate::error::Error;

/// How a parameter binds to call arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Bound by position only
    PositionalOnly,
    /// Bound by position (the default kind)
    PositionalOrKeyword,
    /// Bound by name only
    KeywordOnly,
    /// Collects any remaining positional values
    VarPositional,
    /// Collects any remaining named values (cannot be expressed as flags)
    VarKeyword,
}

impl ParamKind {
    /// Whether the parameter becomes a single named option.
    pub fn is_named_option(&self) -> bool {
        matches!(
            self,
            ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword | ParamKind::KeywordOnly
        )
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self, ParamKind::VarPositional | ParamKind::VarKeyword)
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::PositionalOnly => "positional_only",
            ParamKind::PositionalOrKeyword => "positional_or_keyword",
            ParamKind::KeywordOnly => "keyword_only",
            ParamKind::VarPositional => "var_positional",
            ParamKind::VarKeyword => "var_keyword",
        };
        write!(f, "{}", name)
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParamKind,
    /// Explicit function default; `None` means the parameter has none.
    pub default: Option<Value>,
    /// Help text shown for the generated option.
    pub annotation: Option<String>,
    /// A variadic positional that takes the rest of the line verbatim.
    pub passthrough: bool,
}

impl Parameter {
    /// A positional-or-keyword parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::PositionalOrKeyword)
    }

    pub fn positional_only(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::PositionalOnly)
    }

    pub fn keyword_only(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::KeywordOnly)
    }

    pub fn var_positional(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::VarPositional)
    }

    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::VarKeyword)
    }

    fn with_kind(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            annotation: None,
            passthrough: false,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_annotation(mut self, text: impl Into<String>) -> Self {
        self.annotation = Some(text.into());
        self
    }

    /// Hand every remaining word to this variadic positional, flags included.
    pub fn with_passthrough(mut self) -> Self {
        self.passthrough = true;
        self
    }
}

/// Ordered parameter list of a function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Parameter>,
}

impl Signature {
    /// Build a validated signature.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSignature` when the parameter list breaks one
    /// of the ordering rules listed in the module docs.
    pub fn new(params: Vec<Parameter>) -> Result<Self, Error> {
        Self::validate(&params)?;
        Ok(Self { params })
    }

    /// A signature without parameters.
    pub fn empty() -> Self {
        Self::default()
    }

    fn validate(params: &[Parameter]) -> Result<(), Error> {
        let mut seen = HashSet::new();
        let mut var_positional = 0;
        let mut var_keyword = 0;
        let mut past_positional_only = false;

        for (i, param) in params.iter().enumerate() {
            if param.name.is_empty() {
                return Err(Error::InvalidSignature(
                    "parameter names cannot be empty".into(),
                ));
            }
            if param.name.starts_with('-') {
                return Err(Error::InvalidSignature(format!(
                    "parameter '{}' cannot start with '-'",
                    param.name
                )));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(Error::InvalidSignature(format!(
                    "duplicate parameter '{}'",
                    param.name
                )));
            }

            match param.kind {
                ParamKind::PositionalOnly if past_positional_only => {
                    return Err(Error::InvalidSignature(format!(
                        "positional-only parameter '{}' follows other parameters",
                        param.name
                    )));
                }
                ParamKind::PositionalOnly => {}
                ParamKind::VarPositional => {
                    var_positional += 1;
                    past_positional_only = true;
                }
                ParamKind::VarKeyword => {
                    var_keyword += 1;
                    if i + 1 != params.len() {
                        return Err(Error::InvalidSignature(format!(
                            "variadic keyword parameter '{}' must be last",
                            param.name
                        )));
                    }
                }
                _ => past_positional_only = true,
            }
        }

        if var_positional > 1 {
            return Err(Error::InvalidSignature(
                "at most one variadic positional parameter is allowed".into(),
            ));
        }
        if var_keyword > 1 {
            return Err(Error::InvalidSignature(
                "at most one variadic keyword parameter is allowed".into(),
            ));
        }
        Ok(())
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    /// The variadic-keyword parameter, if declared.
    pub fn var_keyword(&self) -> Option<&Parameter> {
        self.params
            .iter()
            .find(|p| p.kind == ParamKind::VarKeyword)
    }
}

impl<'a> IntoIterator for &'a Signature {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(sig: &Signature) -> Vec<(String, Option<Value>, String)> {
        sig.iter()
            .map(|p| (p.name.clone(), p.default.clone(), p.kind.to_string()))
            .collect()
    }

    #[test]
    fn zero_arguments() {
        assert!(Signature::empty().is_empty());
    }

    #[test]
    fn multiple_arguments_keep_order_and_kind() {
        let sig = Signature::new(vec![
            Parameter::new("a"),
            Parameter::new("b").with_default(Value::None),
            Parameter::var_positional("args"),
            Parameter::var_keyword("kwargs"),
        ])
        .unwrap();

        assert_eq!(
            describe(&sig),
            vec![
                ("a".into(), None, "positional_or_keyword".into()),
                ("b".into(), Some(Value::None), "positional_or_keyword".into()),
                ("args".into(), None, "var_positional".into()),
                ("kwargs".into(), None, "var_keyword".into()),
            ]
        );
        assert_eq!(sig.var_keyword().unwrap().name, "kwargs");
    }

    #[test]
    fn duplicate_names_rejected() {
        let result = Signature::new(vec![Parameter::new("a"), Parameter::keyword_only("a")]);
        assert!(matches!(result, Err(Error::InvalidSignature(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn dashed_names_rejected() {
        let result = Signature::new(vec![Parameter::new("-x")]);
        assert!(matches!(result, Err(Error::InvalidSignature(msg)) if msg.contains("'-x'")));

        assert!(Signature::new(vec![Parameter::new("dry-run")]).is_ok());
    }

    #[test]
    fn two_var_positionals_rejected() {
        let result = Signature::new(vec![
            Parameter::var_positional("a"),
            Parameter::var_positional("b"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn var_keyword_must_be_last() {
        let result = Signature::new(vec![Parameter::var_keyword("kw"), Parameter::new("a")]);
        assert!(matches!(result, Err(Error::InvalidSignature(msg)) if msg.contains("last")));
    }

    #[test]
    fn positional_only_must_lead() {
        let result = Signature::new(vec![Parameter::new("a"), Parameter::positional_only("b")]);
        assert!(result.is_err());

        let ok = Signature::new(vec![
            Parameter::positional_only("a"),
            Parameter::positional_only("b"),
            Parameter::new("c"),
        ]);
        assert!(ok.is_ok());
    }

    #[test]
    fn empty_name_rejected() {
        assert!(Signature::new(vec![Parameter::new("")]).is_err());
    }

    #[test]
    fn kind_classification() {
        assert!(ParamKind::KeywordOnly.is_named_option());
        assert!(!ParamKind::VarPositional.is_named_option());
        assert!(ParamKind::VarKeyword.is_variadic());
    }
}
