//! Tests for the built-in hook variants.

use std::sync::{
    Arc,
    atomic::{AtomicI64, AtomicUsize, Ordering},
};

use descr::{
    AttrError, Class, Computed, ComputedCached, ErrorKind, HookKind, NoopTracer, PairedAccessor, Resolver, Type,
    TypedValidating, Value,
};
use pretty_assertions::assert_eq;

const YARDS_PER_METER: f64 = 1.093_61;

fn distance_class() -> Arc<Class> {
    Class::builder("Distance")
        .hook("meters", TypedValidating::new(Type::Float))
        .hook(
            "yards",
            PairedAccessor::new(|cx, inst| {
                let meters = f64::try_from(&cx.get(inst, "meters")?).unwrap_or_default();
                Ok(Value::Float(meters * YARDS_PER_METER))
            })
            .with_setter(|cx, inst, value| {
                let Ok(yards) = f64::try_from(&value) else {
                    return Err(AttrError::rejected(inst.class().name(), "yards", "expected a number"));
                };
                if yards < 0.0 {
                    return Err(AttrError::rejected(inst.class().name(), "yards", "must not be negative"));
                }
                cx.set(inst, "meters", yards / YARDS_PER_METER)
            })
            .with_deleter(|cx, inst| cx.delete(inst, "meters")),
        )
        .build()
        .unwrap()
}

// === PlainValue ===

#[test]
fn plain_value_reads_constant() {
    let cls = Class::builder("Config").value("retries", 3).value("name", "svc").build().unwrap();
    let mut cfg = cls.instantiate();
    assert_eq!(cfg.get_attr("retries").unwrap(), Value::Int(3));
    assert_eq!(cfg.get_attr("name").unwrap(), Value::from("svc"));
    assert!(cfg.storage().entries().is_empty());
}

// === Computed ===

/// A computed hook runs again on every read and never touches storage.
#[test]
fn computed_runs_every_time() {
    let counter = Arc::new(AtomicI64::new(0));
    let seen = Arc::clone(&counter);
    let cls = Class::builder("Ticker")
        .hook(
            "tick",
            Computed::new(move |_, _| Ok(Value::Int(seen.fetch_add(1, Ordering::SeqCst)))),
        )
        .build()
        .unwrap();
    let mut t = cls.instantiate();

    assert_eq!(t.get_attr("tick").unwrap(), Value::Int(0));
    assert_eq!(t.get_attr("tick").unwrap(), Value::Int(1));
    assert!(!t.storage().has("tick"));

    // assignment goes to storage and shadows the hook
    t.set_attr("tick", 100).unwrap();
    assert_eq!(t.get_attr("tick").unwrap(), Value::Int(100));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

// === ComputedCached ===

#[test]
fn cached_runs_once_per_instance() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let cls = Class::builder("Report")
        .hook(
            "total",
            ComputedCached::new(move |_, _| {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Int(99))
            }),
        )
        .build()
        .unwrap();

    let mut a = cls.instantiate();
    assert_eq!(a.get_attr("total").unwrap(), Value::Int(99));
    assert_eq!(a.get_attr("total").unwrap(), Value::Int(99));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(a.storage().get("total"), Some(&Value::Int(99)));

    // a second instance gets its own computation
    let mut b = cls.instantiate();
    assert_eq!(b.get_attr("total").unwrap(), Value::Int(99));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// Deleting the cached value makes the next read compute again.
#[test]
fn cached_recomputes_after_delete() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let cls = Class::builder("Report")
        .hook(
            "total",
            ComputedCached::new(move |_, _| {
                let n = seen.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Int(i64::try_from(n).unwrap_or_default()))
            }),
        )
        .build()
        .unwrap();
    let mut r = cls.instantiate();

    assert_eq!(r.get_attr("total").unwrap(), Value::Int(0));
    r.del_attr("total").unwrap();
    assert!(!r.storage().has("total"));
    assert_eq!(r.get_attr("total").unwrap(), Value::Int(1));

    // assignment replaces the cached value without running the function
    r.set_attr("total", 50).unwrap();
    assert_eq!(r.get_attr("total").unwrap(), Value::Int(50));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn cached_may_read_other_attributes() {
    let cls = Class::builder("Rect")
        .hook(
            "area",
            ComputedCached::new(|cx, inst| {
                let w = i64::try_from(&cx.get(inst, "w")?).unwrap_or_default();
                let h = i64::try_from(&cx.get(inst, "h")?).unwrap_or_default();
                Ok(Value::Int(w * h))
            }),
        )
        .build()
        .unwrap();
    let mut rect = cls.instantiate();
    rect.set_attr("w", 3).unwrap();
    rect.set_attr("h", 4).unwrap();

    assert_eq!(rect.get_attr("area").unwrap(), Value::Int(12));
    // cached: later changes do not show through
    rect.set_attr("w", 10).unwrap();
    assert_eq!(rect.get_attr("area").unwrap(), Value::Int(12));
}

/// A failing computation caches nothing.
#[test]
fn cached_error_is_not_stored() {
    let cls = Class::builder("Rect")
        .hook("area", ComputedCached::new(|cx, inst| cx.get(inst, "w")))
        .build()
        .unwrap();
    let mut rect = cls.instantiate();

    let err = rect.get_attr("area").unwrap_err();
    assert_eq!(
        err,
        AttrError::NotFound {
            class: "Rect".to_owned(),
            name: "w".to_owned()
        }
    );
    assert!(!rect.storage().has("area"));

    rect.set_attr("w", 2).unwrap();
    assert_eq!(rect.get_attr("area").unwrap(), Value::Int(2));
}

// === TypedValidating ===

#[test]
fn typed_accepts_matching_values() {
    let cls = Class::builder("Person")
        .hook("age", TypedValidating::new(Type::Int))
        .hook("name", TypedValidating::new(Type::Str))
        .build()
        .unwrap();
    let mut p = cls.instantiate();

    p.set_attr("name", "Ada").unwrap();
    p.set_attr("age", 36).unwrap();
    assert_eq!(p.get_attr("name").unwrap(), Value::from("Ada"));
    assert_eq!(p.get_attr("age").unwrap(), Value::Int(36));

    // bool is an int
    p.set_attr("age", true).unwrap();
    assert_eq!(p.get_attr("age").unwrap(), Value::Bool(true));
}

/// A rejected assignment leaves the previous value in place.
#[test]
fn typed_rejects_without_writing() {
    let cls = Class::builder("Person")
        .hook("age", TypedValidating::new(Type::Int))
        .build()
        .unwrap();
    let mut p = cls.instantiate();
    p.set_attr("age", 30).unwrap();

    let err = p.set_attr("age", "thirty").unwrap_err();
    assert_eq!(
        err,
        AttrError::TypeMismatch {
            class: "Person".to_owned(),
            name: "age".to_owned(),
            expected: Type::Int,
            found: Type::Str,
        }
    );
    assert_eq!(p.get_attr("age").unwrap(), Value::Int(30));

    let err = p.set_attr("age", 1.5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(p.get_attr("age").unwrap(), Value::Int(30));
}

/// A person with typed fields keeps its age after a string assignment fails.
#[test]
fn person_scenario() {
    let cls = Class::builder("Person")
        .hook("name", TypedValidating::new(Type::Str))
        .hook("age", TypedValidating::new(Type::Int))
        .build()
        .unwrap();
    let mut p = cls.instantiate();
    p.set_attr("name", "Bill").unwrap();
    p.set_attr("age", 25).unwrap();

    let err = p.set_attr("age", "25").unwrap_err();
    assert_eq!(err.to_string(), "'Person.age' must be of type 'int', not 'str'");
    assert_eq!(p.get_attr("name").unwrap().to_string(), "Bill");
    assert_eq!(p.get_attr("age").unwrap(), Value::Int(25));
}

#[test]
fn typed_unset_and_delete() {
    let cls = Class::builder("Person")
        .hook("age", TypedValidating::new(Type::Int))
        .build()
        .unwrap();
    let mut p = cls.instantiate();

    assert_eq!(p.get_attr("age").unwrap_err().kind(), ErrorKind::AttributeNotFound);
    assert_eq!(p.del_attr("age").unwrap_err().kind(), ErrorKind::AttributeNotFound);

    p.set_attr("age", 5).unwrap();
    p.del_attr("age").unwrap();
    assert_eq!(p.get_attr("age").unwrap_err().kind(), ErrorKind::AttributeNotFound);
}

// === PairedAccessor ===

#[test]
fn accessor_converts_units() {
    let cls = distance_class();
    let mut d = cls.instantiate();

    d.set_attr("meters", 100.0).unwrap();
    let yards = f64::try_from(&d.get_attr("yards").unwrap()).unwrap();
    assert!((yards - 109.361).abs() < 1e-9);

    d.set_attr("yards", YARDS_PER_METER * 2.0).unwrap();
    let meters = f64::try_from(&d.get_attr("meters").unwrap()).unwrap();
    assert!((meters - 2.0).abs() < 1e-9);
    assert!(!d.storage().has("yards"));
}

#[test]
fn accessor_setter_can_reject() {
    let cls = distance_class();
    let mut d = cls.instantiate();
    d.set_attr("meters", 1.0).unwrap();

    let err = d.set_attr("yards", -1.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert_eq!(err.to_string(), "'Distance.yards': must not be negative");
    assert_eq!(d.get_attr("meters").unwrap(), Value::Float(1.0));
}

#[test]
fn accessor_deleter_runs() {
    let cls = distance_class();
    let mut d = cls.instantiate();
    d.set_attr("meters", 1.0).unwrap();

    d.del_attr("yards").unwrap();
    assert!(!d.storage().has("meters"));
    assert_eq!(d.get_attr("yards").unwrap_err().kind(), ErrorKind::AttributeNotFound);
}

// === Direct invocation ===

/// Hooks fetched through the class can be invoked on an instance directly.
#[test]
fn hook_from_class_can_be_invoked_directly() {
    let cls = Class::builder("Person")
        .hook("age", TypedValidating::new(Type::Int))
        .build()
        .unwrap();
    let mut p = cls.instantiate();
    let mut tracer = NoopTracer;
    let mut resolver = Resolver::new(&mut tracer);

    let hook = resolver.get_class_attr(&cls, "age").unwrap();
    let hook = hook.as_hook().unwrap().clone();
    assert_eq!(hook.kind(), HookKind::Typed);

    hook.set(&mut resolver, &mut p, "age", Value::Int(7)).unwrap();
    assert_eq!(hook.get(&mut resolver, &mut p, "age").unwrap(), Value::Int(7));
    assert_eq!(p.get_attr("age").unwrap(), Value::Int(7));

    let err = hook.set(&mut resolver, &mut p, "age", Value::from("x")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn hook_kinds_and_capabilities() {
    let cls = distance_class();
    let meters = cls.lookup("meters").unwrap();
    let yards = cls.lookup("yards").unwrap();

    assert_eq!(meters.kind(), HookKind::Typed);
    assert_eq!(yards.kind(), HookKind::Accessor);
    assert!(yards.has_set());
    assert!(yards.has_delete());

    let read_only = PairedAccessor::new(|_, _| Ok(Value::None));
    assert!(descr::Hook::is_data(&read_only));
    assert!(!descr::Hook::has_set(&read_only));

    let cached = ComputedCached::new(|_, _| Ok(Value::None));
    assert!(!descr::Hook::is_data(&cached));
    assert_eq!(HookKind::Cached.to_string(), "cached");
}
