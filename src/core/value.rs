//! core::value
//!
//! Dynamic values carried from defaults and the command line into calls.
//!
//! # Design
//!
//! Command line input is text, but function defaults are not. A [`Value`]
//! keeps the type of an explicit default intact while values read from the
//! command line, the environment or a config file arrive as [`Value::Str`].
//! Conversion between the two is handled by [`crate::convert`].

use std::fmt;

use serde::Serialize;

/// A value passed to or returned from a command function.
///
/// # Example
///
/// ```
/// use begins::Value;
///
/// let port = Value::from(8080);
/// assert_eq!(port.as_int(), Some(8080));
/// assert_eq!(port.to_string(), "8080");
///
/// let names = Value::from(vec![Value::from("a"), Value::from("b")]);
/// assert_eq!(names.to_string(), "a,b");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absence of a value
    #[default]
    None,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text, the form of every value read from outside the program
    Str(String),
    /// Ordered collection
    List(Vec<Value>),
}

impl Value {
    /// Name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Interpret the value as a switch.
    ///
    /// Strings are read with [`crate::convert::to_bool`], so a flag whose
    /// default came from `VERBOSE=yes` in the environment is on. Unparsable
    /// strings count as off.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => crate::convert::to_bool(s).unwrap_or(false),
            Value::List(items) => !items.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        assert_eq!(Value::None.to_string(), "none");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from("text").to_string(), "text");
        assert_eq!(
            Value::from(vec![Value::from(1), Value::from("x")]).to_string(),
            "1,x"
        );
    }

    #[test]
    fn truthiness() {
        assert!(Value::from("yes").is_truthy());
        assert!(Value::from("1").is_truthy());
        assert!(!Value::from("off").is_truthy());
        assert!(!Value::from("garbage").is_truthy());
        assert!(!Value::None.is_truthy());
        assert!(Value::from(true).is_truthy());
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::None);
        assert_eq!(Value::from(Some("a")), Value::from("a"));
    }

    #[test]
    fn serializes_untagged() {
        let value = Value::from(vec![Value::from("a"), Value::from(2), Value::None]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"["a",2,null]"#);
    }

    #[test]
    fn int_widens_to_float() {
        assert_eq!(Value::from(3).as_float(), Some(3.0));
        assert_eq!(Value::from("3").as_float(), None);
    }
}
