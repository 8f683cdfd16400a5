use std::sync::Arc;

// Use codspeed-criterion-compat when running on CodSpeed (CI), real criterion otherwise (for flamegraphs)
#[cfg(codspeed)]
use codspeed_criterion_compat::{Criterion, black_box, criterion_group, criterion_main};
#[cfg(not(codspeed))]
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use descr::{Class, ComputedCached, Instance, NoopTracer, PairedAccessor, Resolver, Type, TypedValidating, Value};

/// Dynamic class with one attribute of each kind, two levels below `Root` so
/// inherited lookups walk ancestors.
fn dynamic_class() -> Arc<Class> {
    let root = Class::builder("Root").value("inherited", 1).build().unwrap();
    let mid = Class::builder("Mid").base(&root).build().unwrap();
    Class::builder("Leaf")
        .base(&mid)
        .value("plain", 2)
        .hook("typed", TypedValidating::new(Type::Int))
        .hook("cached", ComputedCached::new(|_, _| Ok(Value::Int(3))))
        .hook("accessor", PairedAccessor::new(|cx, inst| cx.get(inst, "typed")))
        .build()
        .unwrap()
}

fn slotted_class() -> Arc<Class> {
    let root = Class::builder("Root").slots(["inherited"]).build().unwrap();
    Class::builder("Leaf")
        .base(&root)
        .value("plain", 2)
        .slots(["stored"])
        .build()
        .unwrap()
}

fn bench_gets(c: &mut Criterion, label: &str, mut inst: Instance, names: &[&str]) {
    for &name in names {
        c.bench_function(&format!("get_{label}_{name}"), |b| {
            b.iter(|| {
                let mut tracer = NoopTracer;
                let mut resolver = Resolver::new(&mut tracer);
                black_box(resolver.get(&mut inst, black_box(name)).unwrap());
            });
        });
    }
}

fn resolution(c: &mut Criterion) {
    let mut inst = dynamic_class().instantiate();
    inst.set_attr("stored", 4).unwrap();
    inst.set_attr("typed", 5).unwrap();
    inst.get_attr("cached").unwrap();
    bench_gets(
        c,
        "dynamic",
        inst.clone(),
        &["stored", "plain", "typed", "cached", "accessor", "inherited"],
    );

    c.bench_function("set_dynamic_typed", |b| {
        b.iter(|| inst.set_attr("typed", black_box(6)).unwrap());
    });

    let mut inst = slotted_class().instantiate();
    inst.set_attr("stored", 4).unwrap();
    inst.set_attr("inherited", 1).unwrap();
    bench_gets(c, "slots", inst.clone(), &["stored", "plain", "inherited"]);

    c.bench_function("set_slots_stored", |b| {
        b.iter(|| inst.set_attr("stored", black_box(6)).unwrap());
    });
}

fn class_definition(c: &mut Criterion) {
    c.bench_function("build_class", |b| {
        b.iter(|| black_box(dynamic_class()));
    });
}

criterion_group!(benches, resolution, class_definition);
criterion_main!(benches);
