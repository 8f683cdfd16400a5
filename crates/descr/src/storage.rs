//! Per-instance attribute storage.
//!
//! Two layouts are supported, chosen by the class rather than per instance:
//!
//! - [`DynamicStore`]: an open, insertion-ordered mapping (the instance `__dict__`).
//! - [`SlotStore`]: a fixed array sized by the class's declared slots; names outside
//!   the layout are rejected.
//!
//! Both sit behind [`Storage`], so the resolver does not care which one an
//! instance uses.

use std::{fmt, sync::Arc};

use ahash::AHashMap;
use indexmap::IndexMap;

use crate::{exception::DefinitionError, value::Value};

/// Error returned by storage operations.
///
/// Storage does not know which class it belongs to; the resolver turns these into
/// [`AttrError`](crate::AttrError)s carrying the class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No value is stored under the name (or the slot is unset).
    NotFound(String),
    /// The name is not part of the slot layout.
    Undeclared(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "no value stored for '{name}'"),
            Self::Undeclared(name) => write!(f, "'{name}' is not a declared slot"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Open mapping from attribute name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicStore {
    attrs: IndexMap<String, Value>,
}

impl DynamicStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn read(&self, name: &str) -> Result<&Value, StoreError> {
        self.attrs.get(name).ok_or_else(|| StoreError::NotFound(name.to_owned()))
    }

    /// Inserts or overwrites `name`. Never fails.
    pub fn write(&mut self, name: &str, value: Value) {
        self.attrs.insert(name.to_owned(), value);
    }

    /// Removes `name`, preserving the order of the remaining entries.
    pub fn remove(&mut self, name: &str) -> Result<Value, StoreError> {
        self.attrs
            .shift_remove(name)
            .ok_or_else(|| StoreError::NotFound(name.to_owned()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// The ordered set of slot names for a slot-backed class.
///
/// Computed once at class definition (inherited slots first, then the class's
/// own) and shared by every instance of the class.
#[derive(Debug, Default)]
pub struct SlotLayout {
    /// Slot names in index order.
    names: Vec<String>,
    /// Slot name -> index in `names`.
    indices: AHashMap<String, usize>,
}

impl SlotLayout {
    /// Builds a layout from slot names in index order.
    ///
    /// `class` is only used for the error message if a name is repeated.
    pub fn new(class: &str, names: impl IntoIterator<Item = String>) -> Result<Self, DefinitionError> {
        let mut layout = Self::default();
        for name in names {
            if layout.indices.contains_key(&name) {
                return Err(DefinitionError::DuplicateSlot {
                    class: class.to_owned(),
                    slot: name,
                });
            }
            layout.indices.insert(name.clone(), layout.names.len());
            layout.names.push(name);
        }
        Ok(layout)
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl PartialEq for SlotLayout {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Eq for SlotLayout {}

/// Fixed-size slot array.
///
/// `values.len()` always equals the layout length; unset slots hold `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotStore {
    layout: Arc<SlotLayout>,
    values: Vec<Option<Value>>,
}

impl SlotStore {
    /// Creates an empty store with one unset slot per layout entry.
    #[must_use]
    pub fn new(layout: Arc<SlotLayout>) -> Self {
        let values = vec![None; layout.len()];
        Self { layout, values }
    }

    #[must_use]
    pub fn layout(&self) -> &Arc<SlotLayout> {
        &self.layout
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.layout
            .index_of(name)
            .is_some_and(|idx| self.values[idx].is_some())
    }

    pub fn read(&self, name: &str) -> Result<&Value, StoreError> {
        let idx = self.index(name)?;
        self.read_index(idx).ok_or_else(|| StoreError::NotFound(name.to_owned()))
    }

    pub fn write(&mut self, name: &str, value: Value) -> Result<(), StoreError> {
        let idx = self.index(name)?;
        self.values[idx] = Some(value);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Value, StoreError> {
        let idx = self.index(name)?;
        self.remove_index(idx).ok_or_else(|| StoreError::NotFound(name.to_owned()))
    }

    /// Reads a slot by index, returning `None` if it is unset or out of range.
    #[must_use]
    pub fn read_index(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)?.as_ref()
    }

    /// Writes a slot by index. Returns `false` if the index is out of range.
    pub fn write_index(&mut self, idx: usize, value: Value) -> bool {
        match self.values.get_mut(idx) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    /// Clears a slot by index, returning the old value if it was set.
    pub fn remove_index(&mut self, idx: usize) -> Option<Value> {
        self.values.get_mut(idx)?.take()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.layout
            .names()
            .iter()
            .zip(&self.values)
            .filter_map(|(name, value)| value.as_ref().map(|v| (name.as_str(), v)))
    }

    fn index(&self, name: &str) -> Result<usize, StoreError> {
        self.layout
            .index_of(name)
            .ok_or_else(|| StoreError::Undeclared(name.to_owned()))
    }
}

/// Instance storage: either an open mapping or a fixed slot array.
#[derive(Debug, Clone, PartialEq)]
pub enum Storage {
    Dynamic(DynamicStore),
    Slots(SlotStore),
}

impl Storage {
    /// Returns whether a value is stored under `name`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        match self {
            Self::Dynamic(store) => store.has(name),
            Self::Slots(store) => store.has(name),
        }
    }

    /// Returns the stored value for `name`, if any. Undeclared slot names read as absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.read(name).ok()
    }

    pub fn read(&self, name: &str) -> Result<&Value, StoreError> {
        match self {
            Self::Dynamic(store) => store.read(name),
            Self::Slots(store) => store.read(name),
        }
    }

    pub fn write(&mut self, name: &str, value: Value) -> Result<(), StoreError> {
        match self {
            Self::Dynamic(store) => {
                store.write(name, value);
                Ok(())
            }
            Self::Slots(store) => store.write(name, value),
        }
    }

    pub fn remove(&mut self, name: &str) -> Result<Value, StoreError> {
        match self {
            Self::Dynamic(store) => store.remove(name),
            Self::Slots(store) => store.remove(name),
        }
    }

    /// Lists the stored attributes in order: insertion order for dynamic storage,
    /// slot order (set slots only) for slot storage.
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, &Value)> {
        match self {
            Self::Dynamic(store) => store.iter().collect(),
            Self::Slots(store) => store.iter().collect(),
        }
    }

    #[must_use]
    pub fn is_slots(&self) -> bool {
        matches!(self, Self::Slots(_))
    }
}
