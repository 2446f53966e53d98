mod object;
mod structure;

pub use object::Object;
pub use structure::Structure;

use crate::components::collection::Collection;
use crate::components::types::COLLECTION_CLASS;
use serde::{Deserialize, Serialize};

/// A value stored in a collection.
///
/// `Object` and `Collection` values are objects and subject to a collections element type.
/// Everything else is a scalar.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Structure),
    Object(Object),
    Collection(Box<Collection>),
}

impl Value {
    /// Returns `true` if the value is an object and therefore checked against an element type.
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Collection(_))
    }

    /// Returns the class name of an object value.
    #[inline]
    pub fn class(&self) -> Option<&str> {
        match self {
            Value::Object(o) => Some(o.class()),
            Value::Collection(_) => Some(COLLECTION_CLASS),
            _ => None,
        }
    }

    /// The class name for objects or the kind of scalar otherwise. Used in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(o) => o.class(),
            Value::Collection(_) => COLLECTION_CLASS,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&Structure> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    #[inline]
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Value::Collection(c) => Some(c),
            _ => None,
        }
    }
}

impl From<()> for Value {
    #[inline]
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    #[inline]
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Structure> for Value {
    #[inline]
    fn from(value: Structure) -> Self {
        Value::Array(value)
    }
}

impl From<Object> for Value {
    #[inline]
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl From<Collection> for Value {
    #[inline]
    fn from(value: Collection) -> Self {
        Value::Collection(Box::new(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
