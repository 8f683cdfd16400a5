//! Tests for instances shared between threads.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};

use descr::{Class, ComputedCached, ErrorKind, RecordingTracer, ResolveLimits, SharedInstance, Value};
use pretty_assertions::assert_eq;

/// Concurrent first reads of a cached attribute run the computation once.
#[test]
fn cached_runs_once_across_threads() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let cls = Class::builder("Report")
        .hook(
            "total",
            ComputedCached::new(move |_, _| {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Int(10))
            }),
        )
        .build()
        .unwrap();
    let shared = SharedInstance::new(cls.instantiate());

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..100 {
                    assert_eq!(shared.get("total").unwrap(), Value::Int(10));
                }
            });
        }
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_writers_serialise() {
    let cls = Class::builder("Counter").build().unwrap();
    let shared = Arc::new(SharedInstance::new(cls.instantiate()));
    shared.set("n", 0).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for _ in 0..250 {
                    shared.with(|cx, inst| {
                        let n = i64::try_from(&cx.get(inst, "n").unwrap()).unwrap();
                        cx.set(inst, "n", n + 1).unwrap();
                    });
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(shared.get("n").unwrap(), Value::Int(1000));
}

#[test]
fn shared_get_set_delete() {
    let cls = Class::builder("Foo").value("x", 1).build().unwrap();
    let shared: SharedInstance = cls.instantiate().into();

    assert_eq!(shared.get("x").unwrap(), Value::Int(1));
    shared.set("x", 2).unwrap();
    assert_eq!(shared.get("x").unwrap(), Value::Int(2));
    shared.delete("x").unwrap();
    assert_eq!(shared.get("x").unwrap(), Value::Int(1));
    assert_eq!(shared.delete("x").unwrap_err().kind(), ErrorKind::AttributeNotFound);

    shared.set("y", "kept").unwrap();
    let snapshot = shared.snapshot();
    assert_eq!(snapshot.storage().get("y"), Some(&Value::from("kept")));

    let inner = shared.into_inner();
    assert_eq!(inner.storage().entries(), vec![("y", &Value::from("kept"))]);
}

#[test]
fn shared_uses_configured_limits_and_tracer() {
    let cls = Class::builder("Loop")
        .hook("me", descr::PairedAccessor::new(|cx, inst| cx.get(inst, "me")))
        .build()
        .unwrap();
    let shared = SharedInstance::with_limits(cls.instantiate(), ResolveLimits::new().max_depth(3));

    let mut tracer = RecordingTracer::new();
    let err = shared.get_traced(&mut tracer, "me").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RecursionLimit);
    assert_eq!(tracer.event_count(), 7);
}

/// Resolutions made inside `with` use the limits the shared instance was built with.
#[test]
fn with_passes_configured_limits() {
    let cls = Class::builder("Chain")
        .hook("a", descr::PairedAccessor::new(|cx, inst| cx.get(inst, "b")))
        .value("b", 1)
        .build()
        .unwrap();
    let shared = SharedInstance::with_limits(cls.instantiate(), ResolveLimits::new().max_depth(1));

    let err = shared.with(|cx, inst| {
        assert_eq!(cx.limits().effective_max_depth(), 1);
        cx.get(inst, "a").unwrap_err()
    });
    assert_eq!(err.kind(), ErrorKind::RecursionLimit);
    assert_eq!(shared.with(|cx, inst| cx.get(inst, "b")), Ok(Value::Int(1)));
}
