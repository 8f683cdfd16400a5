use std::{fmt, sync::Arc};

use super::GetterFn;
use crate::{
    class::Instance,
    exception::{AttrError, AttrResult},
    hook::{Hook, HookKind},
    resolver::Resolver,
    storage::Storage,
    value::Value,
};

/// A non-data hook that runs its function on every access.
///
/// Nothing is remembered between reads, so two reads may disagree (a random or
/// time-based attribute). An instance value stored under the same name shadows it.
pub struct Computed {
    func: Box<GetterFn>,
}

impl Computed {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&mut Resolver<'_>, &mut Instance) -> AttrResult<Value> + Send + Sync + 'static,
    {
        Self { func: Box::new(func) }
    }
}

impl fmt::Debug for Computed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed").finish_non_exhaustive()
    }
}

impl Hook for Computed {
    fn kind(&self) -> HookKind {
        HookKind::Computed
    }

    fn get(&self, cx: &mut Resolver<'_>, instance: &mut Instance, _name: &str) -> AttrResult<Value> {
        (self.func)(cx, instance)
    }
}

/// A non-data hook that computes its value once per instance.
///
/// # Reads write
///
/// The first read on an instance runs the function and **writes the result into
/// that instance's storage** under the attribute name, then returns it. Because
/// the hook is non-data, every later read finds the stored value first and the
/// hook is never consulted again for that instance. The hook itself keeps no
/// per-instance state.
///
/// Consequences callers must keep in mind:
/// - a read needs `&mut Instance`. On a slot-backed instance without a slot of the
///   same name every read fails with a slot error before the function runs;
/// - a dynamic subclass of a slot-backed class caches as usual;
/// - deleting the attribute drops the cached value, so the next read recomputes;
/// - assigning the attribute replaces the cached value;
/// - sharing an instance across threads requires serialising reads as well as
///   writes (see [`SharedInstance`](crate::SharedInstance)), otherwise two readers
///   could both run the function.
pub struct ComputedCached {
    func: Box<GetterFn>,
}

impl ComputedCached {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&mut Resolver<'_>, &mut Instance) -> AttrResult<Value> + Send + Sync + 'static,
    {
        Self { func: Box::new(func) }
    }
}

impl fmt::Debug for ComputedCached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedCached").finish_non_exhaustive()
    }
}

impl Hook for ComputedCached {
    fn kind(&self) -> HookKind {
        HookKind::Cached
    }

    fn get(&self, cx: &mut Resolver<'_>, instance: &mut Instance, name: &str) -> AttrResult<Value> {
        // only reachable with a stored value when the hook is invoked directly
        if let Some(value) = instance.storage().get(name) {
            return Ok(value.clone());
        }
        // nowhere to cache: fail before the function runs
        if let Storage::Slots(store) = instance.storage()
            && store.layout().index_of(name).is_none()
        {
            return Err(AttrError::undeclared_slot(instance.class().name(), name));
        }
        let value = (self.func)(cx, instance)?;
        let class = Arc::clone(instance.class());
        instance
            .storage_mut()
            .write(name, value.clone())
            .map_err(|err| AttrError::from_store(err, class.name()))?;
        cx.tracer().on_cache_fill(name);
        Ok(value)
    }
}
