use std::fmt::{self, Display};

use strum::{Display, EnumString, IntoStaticStr};

use crate::{storage::StoreError, types::Type};

/// Result type alias for attribute operations.
pub type AttrResult<T> = Result<T, AttrError>;

/// The attribute operation a hook was asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Get,
    Set,
    Delete,
}

/// Coarse classification of an [`AttrError`].
///
/// Uses strum derives so the kind displays as the variant name, which is what
/// tracers and host bindings report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ErrorKind {
    AttributeNotFound,
    SlotError,
    TypeMismatch,
    UnsupportedOperation,
    RecursionLimit,
    Rejected,
}

/// Errors raised by a slot-backed instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// The name is not one of the class's declared slots.
    Undeclared { class: String, name: String },
}

impl Display for SlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undeclared { class, name } => {
                write!(f, "'{class}' object has no attribute '{name}' and no __dict__ for setting new attributes")
            }
        }
    }
}

impl std::error::Error for SlotError {}

/// Error returned by attribute get, set and delete.
///
/// Every failure is reported to the immediate caller; the resolver never
/// retries or falls back to a different path after one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrError {
    /// The name resolves to neither a hook nor a stored value.
    NotFound { class: String, name: String },
    /// A slot-backed instance rejected the name.
    Slot(SlotError),
    /// A typed hook rejected a value; nothing was written.
    TypeMismatch {
        class: String,
        name: String,
        expected: Type,
        found: Type,
    },
    /// The hook does not implement the requested operation.
    Unsupported {
        class: String,
        name: String,
        op: Operation,
    },
    /// Nested resolution went deeper than the configured limit.
    Recursion { limit: usize, depth: usize },
    /// An application hook refused the operation.
    Rejected {
        class: String,
        name: String,
        reason: String,
    },
}

impl AttrError {
    /// Creates an AttributeNotFound error for `name` on an instance of `class`.
    #[must_use]
    pub fn not_found(class: impl Display, name: &str) -> Self {
        Self::NotFound {
            class: class.to_string(),
            name: name.to_owned(),
        }
    }

    /// Creates a slot error for an undeclared slot name.
    #[must_use]
    pub fn undeclared_slot(class: impl Display, name: &str) -> Self {
        Self::Slot(SlotError::Undeclared {
            class: class.to_string(),
            name: name.to_owned(),
        })
    }

    #[must_use]
    pub fn type_mismatch(class: impl Display, name: &str, expected: Type, found: Type) -> Self {
        Self::TypeMismatch {
            class: class.to_string(),
            name: name.to_owned(),
            expected,
            found,
        }
    }

    #[must_use]
    pub fn unsupported(class: impl Display, name: &str, op: Operation) -> Self {
        Self::Unsupported {
            class: class.to_string(),
            name: name.to_owned(),
            op,
        }
    }

    /// Creates an error for an application hook that refuses a value.
    ///
    /// Intended for custom hooks and accessor functions with their own
    /// invariants (e.g. "distance must not be negative").
    #[must_use]
    pub fn rejected(class: impl Display, name: &str, reason: impl Display) -> Self {
        Self::Rejected {
            class: class.to_string(),
            name: name.to_owned(),
            reason: reason.to_string(),
        }
    }

    /// Converts a storage failure into an attribute error for `class`.
    #[must_use]
    pub(crate) fn from_store(err: StoreError, class: impl Display) -> Self {
        match err {
            StoreError::NotFound(name) => Self::not_found(class, &name),
            StoreError::Undeclared(name) => Self::undeclared_slot(class, &name),
        }
    }

    /// Returns the coarse kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::AttributeNotFound,
            Self::Slot(_) => ErrorKind::SlotError,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::Unsupported { .. } => ErrorKind::UnsupportedOperation,
            Self::Recursion { .. } => ErrorKind::RecursionLimit,
            Self::Rejected { .. } => ErrorKind::Rejected,
        }
    }
}

impl Display for AttrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { class, name } => write!(f, "'{class}' object has no attribute '{name}'"),
            Self::Slot(err) => write!(f, "{err}"),
            Self::TypeMismatch {
                class,
                name,
                expected,
                found,
            } => write!(
                f,
                "'{class}.{name}' must be of type '{expected}', not '{found}'"
            ),
            Self::Unsupported { class, name, op } => match op {
                Operation::Get => write!(f, "attribute '{name}' of '{class}' objects is not readable"),
                Operation::Set => write!(f, "property '{name}' of '{class}' object has no setter"),
                Operation::Delete => write!(f, "property '{name}' of '{class}' object has no deleter"),
            },
            Self::Recursion { .. } => f.write_str("maximum resolution depth exceeded"),
            Self::Rejected { class, name, reason } => write!(f, "'{class}.{name}': {reason}"),
        }
    }
}

impl std::error::Error for AttrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Slot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SlotError> for AttrError {
    fn from(err: SlotError) -> Self {
        Self::Slot(err)
    }
}

/// Error returned when a class definition is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// A slot name was declared more than once.
    DuplicateSlot { class: String, slot: String },
    /// A slot name collides with an entry in the class table.
    SlotConflictsWithAttribute { class: String, slot: String },
    /// More than one base class contributes slots.
    LayoutConflict { class: String },
    /// A slot-backed class derives from a class whose instances use dynamic storage.
    DynamicBase { class: String, base: String },
    /// The inheritance chain is deeper than `MAX_INHERITANCE_DEPTH`.
    InheritanceTooDeep { class: String, limit: usize },
}

impl Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSlot { class, slot } => write!(f, "class '{class}' declares slot '{slot}' twice"),
            Self::SlotConflictsWithAttribute { class, slot } => {
                write!(f, "'{slot}' in slots of '{class}' conflicts with class variable")
            }
            Self::LayoutConflict { class } => {
                write!(f, "multiple bases of '{class}' have instance lay-out conflict")
            }
            Self::DynamicBase { class, base } => {
                write!(f, "slotted class '{class}' cannot derive from '{base}', which has dynamic storage")
            }
            Self::InheritanceTooDeep { class, limit } => {
                write!(f, "inheritance chain of '{class}' exceeds {limit} levels")
            }
        }
    }
}

impl std::error::Error for DefinitionError {}
