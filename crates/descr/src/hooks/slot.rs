use std::sync::Arc;

use crate::{
    class::Instance,
    exception::{AttrError, AttrResult},
    hook::{Hook, HookKind},
    resolver::Resolver,
    storage::Storage,
    value::Value,
};

/// Data hook generated for each declared slot.
///
/// Reads and writes the slot array by index. Instances of a dynamic subclass of a
/// slot-backed class have no slot array, so the hook falls back to the name in
/// their dynamic storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotBound {
    index: usize,
}

impl SlotBound {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Hook for SlotBound {
    fn kind(&self) -> HookKind {
        HookKind::Slot
    }

    fn get(&self, _cx: &mut Resolver<'_>, instance: &mut Instance, name: &str) -> AttrResult<Value> {
        let found = match instance.storage() {
            Storage::Slots(store) => store.read_index(self.index),
            Storage::Dynamic(store) => store.read(name).ok(),
        };
        found
            .cloned()
            .ok_or_else(|| AttrError::not_found(instance.class().name(), name))
    }

    fn set(&self, _cx: &mut Resolver<'_>, instance: &mut Instance, name: &str, value: Value) -> AttrResult<()> {
        let class = Arc::clone(instance.class());
        match instance.storage_mut() {
            Storage::Slots(store) => {
                if store.write_index(self.index, value) {
                    Ok(())
                } else {
                    Err(AttrError::undeclared_slot(class.name(), name))
                }
            }
            Storage::Dynamic(store) => {
                store.write(name, value);
                Ok(())
            }
        }
    }

    fn delete(&self, _cx: &mut Resolver<'_>, instance: &mut Instance, name: &str) -> AttrResult<()> {
        let removed = match instance.storage_mut() {
            Storage::Slots(store) => store.remove_index(self.index),
            Storage::Dynamic(store) => store.remove(name).ok(),
        };
        match removed {
            Some(_) => Ok(()),
            None => Err(AttrError::not_found(instance.class().name(), name)),
        }
    }

    fn has_set(&self) -> bool {
        true
    }

    fn has_delete(&self) -> bool {
        true
    }
}
