//! Tests for resolution tracers.

use descr::{
    Class, ComputedCached, HookKind, Operation, PairedAccessor, ProfilingTracer, RecordingTracer, Resolver,
    StderrTracer, TraceEvent, Type, TypedValidating, Value,
};
use pretty_assertions::assert_eq;

fn lookup(class: &str, name: &str, found: Option<HookKind>) -> TraceEvent {
    TraceEvent::Lookup {
        class: class.to_owned(),
        name: name.to_owned(),
        found,
    }
}

fn hook(op: Operation, name: &str, kind: HookKind, depth: usize) -> TraceEvent {
    TraceEvent::Hook {
        op,
        name: name.to_owned(),
        kind,
        depth,
    }
}

fn storage(op: Operation, name: &str) -> TraceEvent {
    TraceEvent::Storage {
        op,
        name: name.to_owned(),
    }
}

// === RecordingTracer ===

#[test]
fn records_data_hook_and_storage_paths() {
    let cls = Class::builder("Person")
        .hook("age", TypedValidating::new(Type::Int))
        .build()
        .unwrap();
    let mut p = cls.instantiate();
    let mut tracer = RecordingTracer::new();
    let mut resolver = Resolver::new(&mut tracer);

    resolver.set(&mut p, "age", 3).unwrap();
    resolver.set(&mut p, "nickname", "bo").unwrap();
    resolver.get(&mut p, "nickname").unwrap();
    resolver.delete(&mut p, "nickname").unwrap();

    assert_eq!(
        tracer.events(),
        &[
            lookup("Person", "age", Some(HookKind::Typed)),
            hook(Operation::Set, "age", HookKind::Typed, 1),
            lookup("Person", "nickname", None),
            storage(Operation::Set, "nickname"),
            lookup("Person", "nickname", None),
            storage(Operation::Get, "nickname"),
            lookup("Person", "nickname", None),
            storage(Operation::Delete, "nickname"),
        ]
    );
}

#[test]
fn records_cache_fill_once() {
    let cls = Class::builder("Report")
        .hook("total", ComputedCached::new(|_, _| Ok(Value::Int(1))))
        .build()
        .unwrap();
    let mut r = cls.instantiate();
    let mut tracer = RecordingTracer::new();
    let mut resolver = Resolver::new(&mut tracer);

    resolver.get(&mut r, "total").unwrap();
    resolver.get(&mut r, "total").unwrap();

    assert_eq!(
        tracer.into_events(),
        vec![
            lookup("Report", "total", Some(HookKind::Cached)),
            hook(Operation::Get, "total", HookKind::Cached, 1),
            TraceEvent::CacheFill {
                name: "total".to_owned()
            },
            lookup("Report", "total", Some(HookKind::Cached)),
            storage(Operation::Get, "total"),
        ]
    );
}

/// Resolutions made from inside an accessor are reported one level deeper.
#[test]
fn nested_resolution_reports_depth() {
    let cls = Class::builder("Distance")
        .hook("meters", TypedValidating::new(Type::Float))
        .hook("km", PairedAccessor::new(|cx, inst| cx.get(inst, "meters")))
        .build()
        .unwrap();
    let mut d = cls.instantiate();
    d.set_attr("meters", 5.0).unwrap();

    let mut tracer = RecordingTracer::new();
    Resolver::new(&mut tracer).get(&mut d, "km").unwrap();

    assert_eq!(
        tracer.events(),
        &[
            lookup("Distance", "km", Some(HookKind::Accessor)),
            hook(Operation::Get, "km", HookKind::Accessor, 1),
            lookup("Distance", "meters", Some(HookKind::Typed)),
            hook(Operation::Get, "meters", HookKind::Typed, 2),
        ]
    );
}

#[test]
fn recording_limit_and_clear() {
    let cls = Class::builder("Foo").value("x", 1).build().unwrap();
    let mut foo = cls.instantiate();
    let mut tracer = RecordingTracer::with_limit(3);

    {
        let mut resolver = Resolver::new(&mut tracer);
        for _ in 0..5 {
            resolver.get(&mut foo, "x").unwrap();
        }
    }
    assert_eq!(tracer.event_count(), 3);

    tracer.clear();
    assert_eq!(tracer.event_count(), 0);
}

// === ProfilingTracer ===

#[test]
fn profiling_counts() {
    let cls = Class::builder("Person")
        .hook("age", TypedValidating::new(Type::Int))
        .value("species", "human")
        .build()
        .unwrap();
    let mut p = cls.instantiate();
    let mut tracer = ProfilingTracer::new();
    {
        let mut resolver = Resolver::new(&mut tracer);
        resolver.set(&mut p, "age", 1).unwrap();
        resolver.get(&mut p, "age").unwrap();
        resolver.get(&mut p, "species").unwrap();
        resolver.set(&mut p, "tag", "x").unwrap();
        resolver.get(&mut p, "tag").unwrap();
        resolver.delete(&mut p, "tag").unwrap();
        resolver.get(&mut p, "missing").unwrap_err();
    }

    let report = tracer.report();
    assert_eq!(report.hook_counts, vec![(HookKind::Typed, 2), (HookKind::Plain, 1)]);
    assert_eq!(report.total_lookups, 7);
    assert_eq!(report.lookup_misses, 4);
    assert_eq!(report.storage_reads, 1);
    assert_eq!(report.storage_writes, 1);
    assert_eq!(report.storage_removes, 1);
    assert_eq!(report.cache_fills, 0);
    assert_eq!(report.max_depth, 1);
    assert_eq!(report.depth_exceeded, 0);

    let text = report.to_string();
    assert!(text.contains("Lookups:         7"));
    assert!(text.contains("typed"));
}

// === StderrTracer ===

#[test]
fn stderr_tracer_does_not_change_results() {
    let cls = Class::builder("Foo").value("x", 1).build().unwrap();
    let mut foo = cls.instantiate();
    let mut tracer = StderrTracer::with_limit(2);
    let mut resolver = Resolver::new(&mut tracer);

    for _ in 0..3 {
        assert_eq!(resolver.get(&mut foo, "x").unwrap(), Value::Int(1));
    }
}
