//! Instances shared between threads.
//!
//! Resolution needs `&mut Instance` (cached hooks write on first read), so an
//! instance reachable from several threads must serialise whole operations, not
//! just storage writes. [`SharedInstance`] holds the instance behind a
//! `parking_lot::Mutex` and runs each get/set/delete under the lock, which makes a
//! cached hook's check-compute-store sequence atomic: concurrent first reads run
//! the function once.

use parking_lot::Mutex;

use crate::{
    class::Instance,
    exception::AttrResult,
    resolver::Resolver,
    resource::ResolveLimits,
    tracer::{AttrTracer, NoopTracer},
    value::Value,
};

/// An [`Instance`] that can be read and written from several threads.
///
/// Share it by reference (scoped threads) or wrap it in an `Arc`.
#[derive(Debug)]
pub struct SharedInstance {
    inner: Mutex<Instance>,
    limits: ResolveLimits,
}

impl SharedInstance {
    #[must_use]
    pub fn new(instance: Instance) -> Self {
        Self::with_limits(instance, ResolveLimits::default())
    }

    /// Creates a shared instance whose operations run with `limits`.
    #[must_use]
    pub fn with_limits(instance: Instance, limits: ResolveLimits) -> Self {
        Self {
            inner: Mutex::new(instance),
            limits,
        }
    }

    pub fn get(&self, name: &str) -> AttrResult<Value> {
        self.get_traced(&mut NoopTracer, name)
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) -> AttrResult<()> {
        let mut instance = self.inner.lock();
        Resolver::with_limits(&mut NoopTracer, self.limits).set(&mut instance, name, value)
    }

    pub fn delete(&self, name: &str) -> AttrResult<()> {
        let mut instance = self.inner.lock();
        Resolver::with_limits(&mut NoopTracer, self.limits).delete(&mut instance, name)
    }

    /// Resolves `name` under the lock, reporting events to `tracer`.
    pub fn get_traced(&self, tracer: &mut dyn AttrTracer, name: &str) -> AttrResult<Value> {
        let mut instance = self.inner.lock();
        Resolver::with_limits(tracer, self.limits).get(&mut instance, name)
    }

    /// Runs `f` with exclusive access to the instance, for multi-step updates
    /// that must not interleave with other threads.
    ///
    /// `f` receives a resolver carrying this instance's limits; resolve through it
    /// rather than `Instance::get_attr`, which uses the default limits.
    pub fn with<R>(&self, f: impl FnOnce(&mut Resolver<'_>, &mut Instance) -> R) -> R {
        let mut instance = self.inner.lock();
        let mut tracer = NoopTracer;
        let mut resolver = Resolver::with_limits(&mut tracer, self.limits);
        f(&mut resolver, &mut *instance)
    }

    /// Returns a copy of the instance as it is right now.
    #[must_use]
    pub fn snapshot(&self) -> Instance {
        self.inner.lock().clone()
    }

    #[must_use]
    pub fn into_inner(self) -> Instance {
        self.inner.into_inner()
    }
}

impl From<Instance> for SharedInstance {
    fn from(instance: Instance) -> Self {
        Self::new(instance)
    }
}
