//! convert
//!
//! Turning command line strings into typed values.
//!
//! Values arriving from the command line, the config file or the
//! environment are strings. When automatic conversion is enabled, a
//! parameter whose explicit default is an integer, float, boolean or list
//! gets its string value converted to the same type. Nothing else is
//! converted.

use thiserror::Error;

use crate::core::value::Value;

/// A value that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {target}")]
pub struct ConversionError {
    pub value: String,
    pub target: &'static str,
}

/// Target type of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    Int,
    Float,
    Bool,
    List,
}

impl Converter {
    /// The conversion implied by a default value, if any.
    pub fn infer(default: &Value) -> Option<Self> {
        match default {
            Value::Int(_) => Some(Converter::Int),
            Value::Float(_) => Some(Converter::Float),
            Value::Bool(_) => Some(Converter::Bool),
            Value::List(_) => Some(Converter::List),
            Value::None | Value::Str(_) => None,
        }
    }

    pub fn target(&self) -> &'static str {
        match self {
            Converter::Int => "integer",
            Converter::Float => "float",
            Converter::Bool => "boolean",
            Converter::List => "list",
        }
    }

    /// Convert a string value; other values are returned unchanged.
    pub fn convert(&self, value: Value) -> Result<Value, ConversionError> {
        let Value::Str(text) = value else {
            return Ok(value);
        };
        let invalid = || ConversionError {
            value: text.clone(),
            target: self.target(),
        };
        match self {
            Converter::Int => text.trim().parse().map(Value::Int).map_err(|_| invalid()),
            Converter::Float => text.trim().parse().map(Value::Float).map_err(|_| invalid()),
            Converter::Bool => to_bool(&text).map(Value::Bool),
            Converter::List => Ok(Value::List(to_list(&text).into_iter().map(Value::Str).collect())),
        }
    }
}

/// Read a boolean the way people type one.
///
/// ```
/// use begins::convert::to_bool;
///
/// assert_eq!(to_bool("Yes"), Ok(true));
/// assert_eq!(to_bool("off"), Ok(false));
/// assert!(to_bool("maybe").is_err());
/// ```
pub fn to_bool(text: &str) -> Result<bool, ConversionError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        _ => Err(ConversionError {
            value: text.to_string(),
            target: "boolean",
        }),
    }
}

/// Split a comma separated list, dropping empty items.
pub fn to_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_from_default_type() {
        assert_eq!(Converter::infer(&Value::from(3)), Some(Converter::Int));
        assert_eq!(Converter::infer(&Value::from(1.5)), Some(Converter::Float));
        assert_eq!(Converter::infer(&Value::from(true)), Some(Converter::Bool));
        assert_eq!(Converter::infer(&Value::List(vec![])), Some(Converter::List));
        assert_eq!(Converter::infer(&Value::from("x")), None);
        assert_eq!(Converter::infer(&Value::None), None);
    }

    #[test]
    fn convert_strings() {
        assert_eq!(Converter::Int.convert(Value::from(" 42 ")), Ok(Value::Int(42)));
        assert_eq!(Converter::Float.convert(Value::from("2.5")), Ok(Value::Float(2.5)));
        assert_eq!(Converter::Bool.convert(Value::from("on")), Ok(Value::Bool(true)));
        assert_eq!(
            Converter::List.convert(Value::from("a,,b")),
            Ok(Value::List(vec![Value::from("a"), Value::from("b")]))
        );
    }

    #[test]
    fn typed_values_pass_through() {
        assert_eq!(Converter::Int.convert(Value::Int(7)), Ok(Value::Int(7)));
        assert_eq!(Converter::Bool.convert(Value::None), Ok(Value::None));
    }

    #[test]
    fn invalid_input_names_target() {
        let err = Converter::Int.convert(Value::from("seven")).unwrap_err();
        assert_eq!(err.to_string(), "'seven' is not a valid integer");
    }

    #[test]
    fn list_of_only_separators_is_empty() {
        assert!(to_list(",,,").is_empty());
        assert!(to_list("").is_empty());
    }
}
