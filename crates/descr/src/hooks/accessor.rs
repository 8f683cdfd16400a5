use std::fmt;

use super::{DeleterFn, GetterFn, SetterFn};
use crate::{
    class::Instance,
    exception::{AttrError, AttrResult, Operation},
    hook::{Hook, HookKind},
    resolver::Resolver,
    value::Value,
};

/// A data hook built from a getter and optional setter and deleter functions.
///
/// Always a data hook, even without a setter, so a read-only accessor cannot be
/// shadowed by instance storage; assigning it fails with `UnsupportedOperation`.
///
/// The functions receive the resolver, so they can read and write other
/// attributes of the same instance:
///
/// ```
/// use descr::{Class, PairedAccessor, TypedValidating, Type, Value};
///
/// let cls = Class::builder("Distance")
///     .hook("meters", TypedValidating::new(Type::Float))
///     .hook(
///         "km",
///         PairedAccessor::new(|cx, inst| {
///             let meters = f64::try_from(&cx.get(inst, "meters")?).unwrap_or_default();
///             Ok(Value::Float(meters / 1000.0))
///         })
///         .with_setter(|cx, inst, value| {
///             let km = f64::try_from(&value).unwrap_or_default();
///             cx.set(inst, "meters", km * 1000.0)
///         }),
///     )
///     .build()
///     .unwrap();
///
/// let mut d = cls.instantiate();
/// d.set_attr("km", 1.5).unwrap();
/// assert_eq!(d.get_attr("meters").unwrap(), Value::Float(1500.0));
/// ```
pub struct PairedAccessor {
    getter: Box<GetterFn>,
    setter: Option<Box<SetterFn>>,
    deleter: Option<Box<DeleterFn>>,
}

impl PairedAccessor {
    pub fn new<F>(getter: F) -> Self
    where
        F: Fn(&mut Resolver<'_>, &mut Instance) -> AttrResult<Value> + Send + Sync + 'static,
    {
        Self {
            getter: Box::new(getter),
            setter: None,
            deleter: None,
        }
    }

    #[must_use]
    pub fn with_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut Resolver<'_>, &mut Instance, Value) -> AttrResult<()> + Send + Sync + 'static,
    {
        self.setter = Some(Box::new(setter));
        self
    }

    #[must_use]
    pub fn with_deleter<F>(mut self, deleter: F) -> Self
    where
        F: Fn(&mut Resolver<'_>, &mut Instance) -> AttrResult<()> + Send + Sync + 'static,
    {
        self.deleter = Some(Box::new(deleter));
        self
    }
}

impl fmt::Debug for PairedAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairedAccessor")
            .field("setter", &self.setter.is_some())
            .field("deleter", &self.deleter.is_some())
            .finish_non_exhaustive()
    }
}

impl Hook for PairedAccessor {
    fn kind(&self) -> HookKind {
        HookKind::Accessor
    }

    fn get(&self, cx: &mut Resolver<'_>, instance: &mut Instance, _name: &str) -> AttrResult<Value> {
        (self.getter)(cx, instance)
    }

    fn set(&self, cx: &mut Resolver<'_>, instance: &mut Instance, name: &str, value: Value) -> AttrResult<()> {
        match &self.setter {
            Some(setter) => setter(cx, instance, value),
            None => Err(AttrError::unsupported(instance.class().name(), name, Operation::Set)),
        }
    }

    fn delete(&self, cx: &mut Resolver<'_>, instance: &mut Instance, name: &str) -> AttrResult<()> {
        match &self.deleter {
            Some(deleter) => deleter(cx, instance),
            None => Err(AttrError::unsupported(instance.class().name(), name, Operation::Delete)),
        }
    }

    fn has_set(&self) -> bool {
        self.setter.is_some()
    }

    fn has_delete(&self) -> bool {
        self.deleter.is_some()
    }

    fn is_data(&self) -> bool {
        true
    }
}
