//! Attribute resolution.
//!
//! Implements the hook precedence rules for get, set and delete:
//! - Data hooks (hooks with set or delete) take priority over instance storage
//! - Instance storage takes priority over non-data hooks
//! - Non-data hooks (get only) come last
//!
//! Each operation is a single pass: one class-chain lookup followed by at most one
//! delegation. Failures are returned as-is; nothing falls through to another path
//! after a hook has been chosen.

use std::sync::Arc;

use crate::{
    class::{Class, Instance},
    exception::{AttrError, AttrResult, Operation},
    hook::HookRef,
    resource::ResolveLimits,
    tracer::AttrTracer,
    value::Value,
};

/// How a looked-up name is handled for an operation.
enum Route {
    /// A data hook owns the name; delegate to it.
    Hook(HookRef),
    /// No data hook; use instance storage. Carries a non-data hook (or a data hook
    /// without a getter) to fall back on for get.
    Storage(Option<HookRef>),
}

/// Drives attribute get/set/delete for instances.
///
/// A resolver borrows a tracer and tracks the current nesting depth. Hooks receive
/// the resolver, so accessors that read other attributes go through the same
/// tracer and depth guard. Build one per batch of operations; it is cheap.
#[derive(Debug)]
pub struct Resolver<'a> {
    tracer: &'a mut dyn AttrTracer,
    limits: ResolveLimits,
    depth: usize,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver with default limits.
    #[must_use]
    pub fn new(tracer: &'a mut dyn AttrTracer) -> Self {
        Self::with_limits(tracer, ResolveLimits::default())
    }

    #[must_use]
    pub fn with_limits(tracer: &'a mut dyn AttrTracer, limits: ResolveLimits) -> Self {
        Self {
            tracer,
            limits,
            depth: 0,
        }
    }

    /// Returns the tracer, for hooks that report their own events.
    pub fn tracer(&mut self) -> &mut (dyn AttrTracer + 'a) {
        &mut *self.tracer
    }

    #[must_use]
    pub fn limits(&self) -> ResolveLimits {
        self.limits
    }

    /// Current nesting depth: 0 outside any operation, 1 inside a top-level one.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Resolves `name` on `instance`.
    ///
    /// Takes `&mut Instance` because resolution may write: a cached hook stores its
    /// computed value in the instance's storage on first read.
    pub fn get(&mut self, instance: &mut Instance, name: &str) -> AttrResult<Value> {
        self.guarded(|cx| cx.get_inner(instance, name))
    }

    /// Assigns `name` on `instance`.
    pub fn set(&mut self, instance: &mut Instance, name: &str, value: impl Into<Value>) -> AttrResult<()> {
        let value = value.into();
        self.guarded(|cx| cx.set_inner(instance, name, value))
    }

    /// Deletes `name` from `instance`.
    pub fn delete(&mut self, instance: &mut Instance, name: &str) -> AttrResult<()> {
        self.guarded(|cx| cx.delete_inner(instance, name))
    }

    /// Resolves `name` on the class itself, without an instance.
    ///
    /// Returns the hook itself unless the hook supplies a class-level value (plain
    /// class attributes return their constant).
    pub fn get_class_attr(&mut self, class: &Class, name: &str) -> AttrResult<Value> {
        let hook = class.lookup(name);
        self.tracer.on_lookup(class.name(), name, hook.map(|h| h.kind()));
        match hook {
            Some(hook) => Ok(hook.get_class(class, name).unwrap_or_else(|| Value::Hook(Arc::clone(hook)))),
            None => Err(AttrError::not_found(class.name(), name)),
        }
    }

    fn get_inner(&mut self, instance: &mut Instance, name: &str) -> AttrResult<Value> {
        match self.route(instance, name) {
            Route::Hook(hook) if hook.has_get() => {
                self.tracer.on_hook(Operation::Get, name, hook.kind(), self.depth);
                hook.get(self, instance, name)
            }
            Route::Hook(hook) => self.get_from_storage(instance, name, Some(hook)),
            Route::Storage(fallback) => self.get_from_storage(instance, name, fallback),
        }
    }

    fn get_from_storage(&mut self, instance: &mut Instance, name: &str, fallback: Option<HookRef>) -> AttrResult<Value> {
        if let Some(value) = instance.storage().get(name) {
            self.tracer.on_storage(Operation::Get, name);
            return Ok(value.clone());
        }
        match fallback {
            Some(hook) if hook.has_get() && !hook.is_data() => {
                self.tracer.on_hook(Operation::Get, name, hook.kind(), self.depth);
                hook.get(self, instance, name)
            }
            // a data hook without a getter evaluates to itself
            Some(hook) => Ok(Value::Hook(hook)),
            None => Err(AttrError::not_found(instance.class().name(), name)),
        }
    }

    fn set_inner(&mut self, instance: &mut Instance, name: &str, value: Value) -> AttrResult<()> {
        match self.route(instance, name) {
            Route::Hook(hook) => {
                self.tracer.on_hook(Operation::Set, name, hook.kind(), self.depth);
                hook.set(self, instance, name, value)
            }
            Route::Storage(_) => {
                self.tracer.on_storage(Operation::Set, name);
                let class = Arc::clone(instance.class());
                instance
                    .storage_mut()
                    .write(name, value)
                    .map_err(|err| AttrError::from_store(err, class.name()))
            }
        }
    }

    fn delete_inner(&mut self, instance: &mut Instance, name: &str) -> AttrResult<()> {
        match self.route(instance, name) {
            Route::Hook(hook) => {
                self.tracer.on_hook(Operation::Delete, name, hook.kind(), self.depth);
                hook.delete(self, instance, name)
            }
            Route::Storage(_) => {
                self.tracer.on_storage(Operation::Delete, name);
                let class = Arc::clone(instance.class());
                instance
                    .storage_mut()
                    .remove(name)
                    .map(drop)
                    .map_err(|err| AttrError::from_store(err, class.name()))
            }
        }
    }

    /// Looks `name` up along the instance's class chain and decides who handles it.
    fn route(&mut self, instance: &Instance, name: &str) -> Route {
        let class = instance.class();
        let hook = class.lookup(name).cloned();
        self.tracer.on_lookup(class.name(), name, hook.as_ref().map(|h| h.kind()));
        match hook {
            Some(hook) if hook.is_data() => Route::Hook(hook),
            other => Route::Storage(other),
        }
    }

    /// Runs `f` one level deeper, refusing if that would exceed the depth limit.
    fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> AttrResult<T>) -> AttrResult<T> {
        let limit = self.limits.effective_max_depth();
        if self.depth >= limit {
            self.tracer.on_depth_exceeded(limit);
            return Err(AttrError::Recursion {
                limit,
                depth: self.depth + 1,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
