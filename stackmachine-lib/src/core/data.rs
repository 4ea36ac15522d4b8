//! Deals with run-time data representation

use derive_more::{Display, From};

/// A value on the operand stack. There is no implicit conversion between the variants,
/// every operator decides which pairings it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From)]
pub enum Value {
    #[display(fmt = "{}", _0)]
    Int(i64),
    #[display(fmt = "\"{}\"", _0)]
    Str(String),
    #[display(fmt = "{}", _0)]
    Bool(bool),
}

impl Value {
    /// name of the variant as used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
        }
    }
}

impl From<&str> for Value {
    fn from(x: &str) -> Self {
        Value::Str(x.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::from("ab").to_string(), "\"ab\"");
        assert_eq!(Value::from(true).to_string(), "true");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Int(0).type_name(), "int");
        assert_eq!(Value::from(String::new()).type_name(), "string");
        assert_eq!(Value::Bool(false).type_name(), "bool");
    }
}
