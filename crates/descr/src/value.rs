//! Owned attribute values.
//!
//! Unlike an interpreter heap value, a [`Value`] owns all of its data and can be
//! freely cloned, compared and stored in instance storage. The one exception is
//! [`Value::Hook`], which shares the class-level hook it points at.

use std::{
    fmt::{self, Write},
    sync::Arc,
};

use crate::{hook::HookRef, types::Type};

/// A value held in instance storage, returned by attribute access, or stored as a
/// class-level constant.
///
/// # Binary Serialization
///
/// Values serialize with derived serde (postcard is used for instance snapshots).
/// `Hook` is class-level state and is skipped: serializing a value that holds a
/// hook fails, and deserialization never produces one.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum Value {
    /// Python's `None` singleton.
    #[default]
    None,
    /// Python boolean (`True` or `False`).
    Bool(bool),
    /// Python integer (64-bit signed).
    Int(i64),
    /// Python float (64-bit IEEE 754).
    Float(f64),
    /// Python string (UTF-8).
    Str(String),
    /// Python list.
    List(Vec<Self>),
    /// A class-level hook, surfaced when the class itself is accessed or when a
    /// data hook without a getter has no instance value to fall back on.
    #[serde(skip)]
    Hook(HookRef),
}

impl Value {
    /// Returns the runtime type of this value.
    #[must_use]
    pub fn py_type(&self) -> Type {
        Type::of(self)
    }

    /// Returns the Python type name (`"int"`, `"str"`, ...).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.py_type().into()
    }

    /// Returns the hook if this value is `Value::Hook`.
    #[must_use]
    pub fn as_hook(&self) -> Option<&HookRef> {
        match self {
            Self::Hook(hook) => Some(hook),
            _ => None,
        }
    }

    /// Writes the Python `repr()` of this value.
    pub fn repr_fmt(&self, f: &mut impl Write) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => float_repr_fmt(*v, f),
            Self::Str(s) => string_repr_fmt(s, f),
            Self::List(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.repr_fmt(f)?;
                }
                f.write_char(']')
            }
            Self::Hook(hook) => write!(f, "<{} hook>", hook.kind()),
        }
    }

    /// Returns the Python `repr()` of this value as a string.
    #[must_use]
    pub fn repr(&self) -> String {
        let mut s = String::new();
        // writing into a String cannot fail
        let _ = self.repr_fmt(&mut s);
        s
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            _ => self.repr_fmt(f),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            // Use to_bits() so NaN compares equal to itself, like Object in snapshots
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Hook(a), Self::Hook(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn float_repr_fmt(v: f64, f: &mut impl Write) -> fmt::Result {
    if v.is_nan() {
        f.write_str("nan")
    } else if v.is_infinite() {
        f.write_str(if v > 0.0 { "inf" } else { "-inf" })
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        write!(f, "{v:.1}")
    } else {
        write!(f, "{v}")
    }
}

/// Writes a single-quoted Python string literal, switching to double quotes when
/// the string contains a single quote and no double quote.
fn string_repr_fmt(s: &str, f: &mut impl Write) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    f.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl From<HookRef> for Value {
    fn from(hook: HookRef) -> Self {
        Self::Hook(hook)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::None
    }
}

/// Error returned when a `Value` cannot be converted to the requested Rust type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    /// The type name that was expected (e.g., "int", "str").
    pub expected: &'static str,
    /// The actual type name of the `Value` (e.g., "list", "NoneType").
    pub actual: &'static str,
}

impl ConversionError {
    /// Creates a new `ConversionError` with the expected and actual type names.
    #[must_use]
    pub fn new(expected: &'static str, actual: &'static str) -> Self {
        Self { expected, actual }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, got {}", self.expected, self.actual)
    }
}

impl std::error::Error for ConversionError {}

impl TryFrom<&Value> for i64 {
    type Error = ConversionError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(i) => Ok(*i),
            _ => Err(ConversionError::new("int", value.type_name())),
        }
    }
}

/// Int values are widened to f64 to match python's behavior.
impl TryFrom<&Value> for f64 {
    type Error = ConversionError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as Self),
            _ => Err(ConversionError::new("float", value.type_name())),
        }
    }
}

impl TryFrom<&Value> for String {
    type Error = ConversionError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            _ => Err(ConversionError::new("str", value.type_name())),
        }
    }
}

/// Note: This does NOT use Python's truthiness rules.
impl TryFrom<&Value> for bool {
    type Error = ConversionError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(ConversionError::new("bool", value.type_name())),
        }
    }
}
