use strum::{Display, EnumString, IntoStaticStr};

use crate::value::Value;

/// Runtime type of a [`Value`].
///
/// Used by [`TypedValidating`](crate::hooks::TypedValidating) to declare the
/// type an attribute must hold, and in `TypeMismatch` errors to report what was
/// actually supplied. Parses from and displays as the Python spelling
/// (`"int"`, `"str"`, `"NoneType"`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, serde::Serialize, serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum Type {
    #[strum(serialize = "NoneType")]
    NoneType,
    Bool,
    Int,
    Float,
    Str,
    List,
    /// A class-level hook surfaced by class-level access.
    Hook,
}

impl Type {
    /// Returns the exact runtime type of `value`.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::None => Self::NoneType,
            Value::Bool(_) => Self::Bool,
            Value::Int(_) => Self::Int,
            Value::Float(_) => Self::Float,
            Value::Str(_) => Self::Str,
            Value::List(_) => Self::List,
            Value::Hook(_) => Self::Hook,
        }
    }

    /// Returns whether `value` is an instance of this type.
    ///
    /// `bool` counts as a subtype of `int`, so `Type::Int.is_instance(&Value::Bool(true))`
    /// holds, mirroring `isinstance(True, int)`.
    #[must_use]
    pub fn is_instance(self, value: &Value) -> bool {
        let actual = Self::of(value);
        actual == self || (self == Self::Int && actual == Self::Bool)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn names_use_python_spelling() {
        assert_eq!(Type::Int.to_string(), "int");
        assert_eq!(Type::NoneType.to_string(), "NoneType");
        assert_eq!(Type::from_str("str"), Ok(Type::Str));
        assert_eq!(Value::None.type_name(), "NoneType");
    }

    #[test]
    fn bool_is_an_int() {
        assert!(Type::Int.is_instance(&Value::Bool(false)));
        assert!(!Type::Bool.is_instance(&Value::Int(1)));
        assert!(!Type::Float.is_instance(&Value::Int(1)));
    }
}
