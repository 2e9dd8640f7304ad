//! Tagged values crossing the generic call boundary.

use std::fmt;

/// Declared kind of a primary return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    Text,
    Bool,
    /// Polymorphic operations: the value is returned with whatever tag it carries.
    Any,
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultKind::I32 => "i32",
            ResultKind::I64 => "i64",
            ResultKind::U32 => "u32",
            ResultKind::U64 => "u64",
            ResultKind::F32 => "f32",
            ResultKind::F64 => "f64",
            ResultKind::Text => "text",
            ResultKind::Bool => "bool",
            ResultKind::Any => "any",
        };
        f.write_str(name)
    }
}

/// A single tagged value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Empty,
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Text(String),
    Bool(bool),
}

impl Value {
    /// Kind tag of this value; `None` for `Empty`.
    pub fn kind(&self) -> Option<ResultKind> {
        match self {
            Value::Empty => None,
            Value::I32(_) => Some(ResultKind::I32),
            Value::I64(_) => Some(ResultKind::I64),
            Value::U32(_) => Some(ResultKind::U32),
            Value::U64(_) => Some(ResultKind::U64),
            Value::F32(_) => Some(ResultKind::F32),
            Value::F64(_) => Some(ResultKind::F64),
            Value::Text(_) => Some(ResultKind::Text),
            Value::Bool(_) => Some(ResultKind::Bool),
        }
    }

    /// Zero value for a declared kind. `Any` has no zero, so it stays `Empty`.
    pub fn zero(kind: ResultKind) -> Value {
        match kind {
            ResultKind::I32 => Value::I32(0),
            ResultKind::I64 => Value::I64(0),
            ResultKind::U32 => Value::U32(0),
            ResultKind::U64 => Value::U64(0),
            ResultKind::F32 => Value::F32(0.0),
            ResultKind::F64 => Value::F64(0.0),
            ResultKind::Text => Value::Text(String::new()),
            ResultKind::Bool => Value::Bool(false),
            ResultKind::Any => Value::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Take the text out of a `Text` value without copying.
    pub fn into_text(self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Value::from(7i32).kind(), Some(ResultKind::I32));
        assert_eq!(Value::from(7i64).kind(), Some(ResultKind::I64));
        assert_eq!(Value::from("x").kind(), Some(ResultKind::Text));
        assert_eq!(Value::Empty.kind(), None);
    }

    #[test]
    fn test_accessors_do_not_convert() {
        let v = Value::I64(5);
        assert_eq!(v.as_i64(), Some(5));
        assert_eq!(v.as_i32(), None);
        assert_eq!(Value::U32(9).as_u32(), Some(9));
        assert_eq!(Value::from("abc").into_text().as_deref(), Some("abc"));
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(Value::zero(ResultKind::Text), Value::Text(String::new()));
        assert_eq!(Value::zero(ResultKind::I64), Value::I64(0));
        assert_eq!(Value::zero(ResultKind::Any), Value::Empty);
    }
}
