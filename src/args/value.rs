//! The heterogeneous value produced by argument parsing.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A parsed argument value.
///
/// Built-in argument types produce one of the primitive variants; custom
/// argument types may smuggle any `Send + Sync` payload through [`Other`]
/// and retrieve it with a typed downcast.
///
/// [`Other`]: ArgValue::Other
#[derive(Clone)]
pub enum ArgValue {
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(String),
    Other(Arc<dyn Any + Send + Sync>),
}

impl ArgValue {
    /// Returns the type name of the value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgValue::Integer(_) => "integer",
            ArgValue::Long(_) => "long",
            ArgValue::Float(_) => "float",
            ArgValue::Double(_) => "double",
            ArgValue::Bool(_) => "bool",
            ArgValue::String(_) => "string",
            ArgValue::Other(_) => "custom",
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            ArgValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            ArgValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            ArgValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            ArgValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Typed access to a custom payload.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            ArgValue::Other(v) => Arc::clone(v).downcast().ok(),
            _ => None,
        }
    }
}

impl PartialEq for ArgValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ArgValue::Integer(a), ArgValue::Integer(b)) => a == b,
            (ArgValue::Long(a), ArgValue::Long(b)) => a == b,
            (ArgValue::Float(a), ArgValue::Float(b)) => a == b,
            (ArgValue::Double(a), ArgValue::Double(b)) => a == b,
            (ArgValue::Bool(a), ArgValue::Bool(b)) => a == b,
            (ArgValue::String(a), ArgValue::String(b)) => a == b,
            (ArgValue::Other(a), ArgValue::Other(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Integer(v) => write!(f, "Integer({v})"),
            ArgValue::Long(v) => write!(f, "Long({v})"),
            ArgValue::Float(v) => write!(f, "Float({v})"),
            ArgValue::Double(v) => write!(f, "Double({v})"),
            ArgValue::Bool(v) => write!(f, "Bool({v})"),
            ArgValue::String(v) => write!(f, "String({v:?})"),
            ArgValue::Other(_) => write!(f, "Other(..)"),
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Integer(v) => write!(f, "{v}"),
            ArgValue::Long(v) => write!(f, "{v}"),
            ArgValue::Float(v) => write!(f, "{v}"),
            ArgValue::Double(v) => write!(f, "{v}"),
            ArgValue::Bool(v) => write!(f, "{v}"),
            ArgValue::String(v) => write!(f, "{v}"),
            ArgValue::Other(_) => write!(f, "<custom>"),
        }
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        ArgValue::Integer(v)
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Long(v)
    }
}

impl From<f32> for ArgValue {
    fn from(v: f32) -> Self {
        ArgValue::Float(v)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Double(v)
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::String(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::String(v.to_string())
    }
}
