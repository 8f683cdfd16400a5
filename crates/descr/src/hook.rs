//! The hook (descriptor) protocol.
//!
//! A hook is a class-level object that intercepts attribute access for one name.
//! Capabilities decide where it sits in the resolution order:
//!
//! - Data hooks (`is_data()`: the hook implements set or delete) take priority
//!   over instance storage.
//! - Instance storage takes priority over non-data hooks (get only).
//! - Non-data hooks come last and act as overridable class-level defaults.
//!
//! Hooks are shared by every instance of the owning class and its subclasses, so
//! they must never keep per-instance state. Anything per-instance belongs in the
//! instance's [`Storage`](crate::Storage).

use std::{fmt, sync::Arc};

use strum::{Display, IntoStaticStr};

use crate::{
    class::{Class, Instance},
    exception::{AttrError, AttrResult, Operation},
    resolver::Resolver,
    value::Value,
};

/// Shared handle to a hook, as stored in class tables and in [`Value::Hook`].
pub type HookRef = Arc<dyn Hook>;

/// Which built-in variant a hook is, for tracing and introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum HookKind {
    Plain,
    Computed,
    Cached,
    Typed,
    Slot,
    Accessor,
    /// Any application-defined hook.
    Custom,
}

/// A class-level attribute hook.
///
/// Only [`get`](Self::get) is required. `set` and `delete` default to failing
/// with `UnsupportedOperation`; a hook that overrides them must also report the
/// capability via [`has_set`](Self::has_set) / [`has_delete`](Self::has_delete)
/// so the resolver treats it as a data hook.
///
/// Every method receives the [`Resolver`] driving the access, so a hook can
/// resolve other attributes of the same instance (with depth limiting and
/// tracing applied) and the attribute name it is bound to in the class table.
pub trait Hook: fmt::Debug + Send + Sync {
    /// Returns which variant this hook is.
    fn kind(&self) -> HookKind {
        HookKind::Custom
    }

    /// Resolves the attribute for `instance`.
    ///
    /// Not called by the resolver when [`has_get`](Self::has_get) is false.
    fn get(&self, cx: &mut Resolver<'_>, instance: &mut Instance, name: &str) -> AttrResult<Value>;

    /// Resolves the attribute when accessed through the class itself.
    ///
    /// Returning `None` (the default) makes the class-level access evaluate to the
    /// hook itself, which is what makes the protocol introspectable.
    fn get_class(&self, _owner: &Class, _name: &str) -> Option<Value> {
        None
    }

    /// Assigns the attribute on `instance`.
    fn set(&self, _cx: &mut Resolver<'_>, instance: &mut Instance, name: &str, _value: Value) -> AttrResult<()> {
        Err(AttrError::unsupported(instance.class().name(), name, Operation::Set))
    }

    /// Deletes the attribute from `instance`.
    fn delete(&self, _cx: &mut Resolver<'_>, instance: &mut Instance, name: &str) -> AttrResult<()> {
        Err(AttrError::unsupported(instance.class().name(), name, Operation::Delete))
    }

    /// Whether [`get`](Self::get) is meaningful for this hook.
    fn has_get(&self) -> bool {
        true
    }

    fn has_set(&self) -> bool {
        false
    }

    fn has_delete(&self) -> bool {
        false
    }

    /// Whether this hook takes priority over instance storage.
    ///
    /// Defaults to `has_set() || has_delete()`. Accessors override it so that a
    /// read-only accessor still shadows instance storage.
    fn is_data(&self) -> bool {
        self.has_set() || self.has_delete()
    }
}
