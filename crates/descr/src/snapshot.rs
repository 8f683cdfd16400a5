//! Binary snapshots of instance storage.
//!
//! A snapshot records the class name, the slot layout (for slot-backed classes)
//! and the stored attributes in order. Hooks are class-level and are never part of
//! a snapshot; loading needs the class again and checks that it still matches.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    class::{Class, Instance},
    storage::StoreError,
    value::Value,
};

/// Serialized form of an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StorageSnapshot {
    class: String,
    /// Full slot layout, `None` for dynamic storage.
    slots: Option<Vec<String>>,
    entries: Vec<(String, Value)>,
}

/// Error returned by [`Instance::dump`] and [`Instance::load`].
#[derive(Debug)]
pub enum SnapshotError {
    /// Encoding failed, typically because a stored value is a hook.
    Encode(postcard::Error),
    Decode(postcard::Error),
    /// The snapshot was taken from a different class.
    ClassMismatch { expected: String, found: String },
    /// The class's slot layout differs from the one in the snapshot.
    LayoutMismatch { class: String },
    /// A stored entry could not be written back.
    Store(StoreError),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
            Self::Decode(err) => write!(f, "failed to decode snapshot: {err}"),
            Self::ClassMismatch { expected, found } => {
                write!(f, "snapshot of '{found}' cannot be loaded as '{expected}'")
            }
            Self::LayoutMismatch { class } => write!(f, "slot layout of '{class}' does not match the snapshot"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for SnapshotError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl Instance {
    /// Serializes this instance's storage to a binary format.
    ///
    /// The result can be restored with [`Instance::load`] given the same class.
    ///
    /// # Errors
    /// Returns [`SnapshotError::Encode`] if a stored value cannot be serialized
    /// (a hook stored as an instance value).
    pub fn dump(&self) -> Result<Vec<u8>, SnapshotError> {
        let class = self.class();
        let snapshot = StorageSnapshot {
            class: class.name().to_owned(),
            slots: class.uses_slots().then(|| class.slot_names().to_vec()),
            entries: self
                .storage()
                .entries()
                .into_iter()
                .map(|(name, value)| (name.to_owned(), value.clone()))
                .collect(),
        };
        postcard::to_allocvec(&snapshot).map_err(SnapshotError::Encode)
    }

    /// Rebuilds an instance of `class` from bytes produced by [`Instance::dump`].
    ///
    /// # Arguments
    /// * `class` - The class the snapshot was taken from
    /// * `bytes` - The serialized data from `dump()`
    ///
    /// # Errors
    /// Fails if the bytes do not decode, or if the class name or slot layout
    /// differs from the snapshot.
    pub fn load(class: &Arc<Class>, bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: StorageSnapshot = postcard::from_bytes(bytes).map_err(SnapshotError::Decode)?;
        if snapshot.class != class.name() {
            return Err(SnapshotError::ClassMismatch {
                expected: class.name().to_owned(),
                found: snapshot.class,
            });
        }
        let layout_matches = match &snapshot.slots {
            Some(names) => class.uses_slots() && names.as_slice() == class.slot_names(),
            None => !class.uses_slots(),
        };
        if !layout_matches {
            return Err(SnapshotError::LayoutMismatch {
                class: class.name().to_owned(),
            });
        }

        let mut instance = Self::new(class);
        for (name, value) in snapshot.entries {
            instance.storage_mut().write(&name, value)?;
        }
        Ok(instance)
    }
}
