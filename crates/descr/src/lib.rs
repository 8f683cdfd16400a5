#![doc = include_str!("../../../README.md")]

mod class;
mod exception;
mod hook;
pub mod hooks;
mod resolver;
mod resource;
mod shared;
mod snapshot;
mod storage;
mod table;
pub mod tracer;
mod types;
mod value;

pub use crate::{
    class::{Class, ClassBuilder, Instance},
    exception::{AttrError, AttrResult, DefinitionError, ErrorKind, Operation, SlotError},
    hook::{Hook, HookKind, HookRef},
    hooks::{Computed, ComputedCached, PairedAccessor, PlainValue, SlotBound, TypedValidating},
    resolver::Resolver,
    resource::{DEFAULT_MAX_RESOLUTION_DEPTH, MAX_INHERITANCE_DEPTH, ResolveLimits},
    shared::SharedInstance,
    snapshot::SnapshotError,
    storage::{DynamicStore, SlotLayout, SlotStore, StoreError, Storage},
    table::DescriptorTable,
    tracer::{AttrTracer, NoopTracer, ProfilingReport, ProfilingTracer, RecordingTracer, StderrTracer, TraceEvent},
    types::Type,
    value::{ConversionError, Value},
};
