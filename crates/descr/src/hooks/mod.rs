//! Built-in hook variants.
//!
//! | Variant | get | set | delete | Data hook |
//! |---|---|---|---|---|
//! | [`PlainValue`] | constant | - | - | no |
//! | [`Computed`] | runs a function every time | - | - | no |
//! | [`ComputedCached`] | runs a function once per instance, caches in storage | - | - | no |
//! | [`TypedValidating`] | storage | type-checked storage write | storage | yes |
//! | [`SlotBound`] | slot by index | slot by index | slot by index | yes |
//! | [`PairedAccessor`] | getter | optional setter | optional deleter | always |

mod accessor;
mod computed;
mod plain;
mod slot;
mod typed;

pub use accessor::PairedAccessor;
pub use computed::{Computed, ComputedCached};
pub use plain::PlainValue;
pub use slot::SlotBound;
pub use typed::TypedValidating;

use crate::{class::Instance, exception::AttrResult, resolver::Resolver, value::Value};

/// A function of an instance producing a value: accessor getters and computed hooks.
pub type GetterFn = dyn Fn(&mut Resolver<'_>, &mut Instance) -> AttrResult<Value> + Send + Sync;

/// An accessor setter, receiving the assigned value.
pub type SetterFn = dyn Fn(&mut Resolver<'_>, &mut Instance, Value) -> AttrResult<()> + Send + Sync;

/// An accessor deleter.
pub type DeleterFn = dyn Fn(&mut Resolver<'_>, &mut Instance) -> AttrResult<()> + Send + Sync;
