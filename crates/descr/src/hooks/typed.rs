use std::sync::Arc;

use crate::{
    class::Instance,
    exception::{AttrError, AttrResult},
    hook::{Hook, HookKind},
    resolver::Resolver,
    types::Type,
    value::Value,
};

/// A data hook that only accepts values of one type.
///
/// Values live in the instance's storage under the attribute name; the hook
/// checks assignments before they reach it. A rejected value is never written,
/// so the previous value (if any) survives a failed assignment.
///
/// `bool` values are accepted where `int` is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedValidating {
    expected: Type,
}

impl TypedValidating {
    #[must_use]
    pub fn new(expected: Type) -> Self {
        Self { expected }
    }

    #[must_use]
    pub fn expected(&self) -> Type {
        self.expected
    }
}

impl Hook for TypedValidating {
    fn kind(&self) -> HookKind {
        HookKind::Typed
    }

    fn get(&self, _cx: &mut Resolver<'_>, instance: &mut Instance, name: &str) -> AttrResult<Value> {
        instance
            .storage()
            .read(name)
            .cloned()
            .map_err(|err| AttrError::from_store(err, instance.class().name()))
    }

    fn set(&self, _cx: &mut Resolver<'_>, instance: &mut Instance, name: &str, value: Value) -> AttrResult<()> {
        let class = Arc::clone(instance.class());
        if !self.expected.is_instance(&value) {
            return Err(AttrError::type_mismatch(class.name(), name, self.expected, value.py_type()));
        }
        instance
            .storage_mut()
            .write(name, value)
            .map_err(|err| AttrError::from_store(err, class.name()))
    }

    fn delete(&self, _cx: &mut Resolver<'_>, instance: &mut Instance, name: &str) -> AttrResult<()> {
        let class = Arc::clone(instance.class());
        instance
            .storage_mut()
            .remove(name)
            .map(drop)
            .map_err(|err| AttrError::from_store(err, class.name()))
    }

    fn has_set(&self) -> bool {
        true
    }

    fn has_delete(&self) -> bool {
        true
    }
}
