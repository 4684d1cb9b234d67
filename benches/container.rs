#![allow(dead_code)]

use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use weft::{auto_injected, Container, Injected, InjectedWeak, Lifetime::*, Tag};

struct A(Arc<B>, Arc<C>);
struct B(i32);
struct C(Arc<CA>);
struct CA(Arc<CAA>);
struct CAA(Arc<CAAA>);
struct CAAA(Arc<CAAAA>);
struct CAAAA(Arc<CAAAAA>);
struct CAAAAA;

struct Parent {
    child: Injected<Child>,
}

struct Child {
    parent: InjectedWeak<Parent>,
}

auto_injected!(Parent { child });
auto_injected!(Child { parent });

fn container_with_chain(lifetime: weft::Lifetime) -> Container {
    let container = Container::new();
    let _ = container.register(None, lifetime, |_| Ok(CAAAAA));
    let _ = container.register(None, lifetime, |r| Ok(CAAAA(r.resolve(None)?)));
    let _ = container.register(None, lifetime, |r| Ok(CAAA(r.resolve(None)?)));
    let _ = container.register(None, lifetime, |r| Ok(CAA(r.resolve(None)?)));
    let _ = container.register(None, lifetime, |r| Ok(CA(r.resolve(None)?)));
    let _ = container.register(None, lifetime, |r| Ok(C(r.resolve(None)?)));
    let _ = container.register(None, lifetime, |_| Ok(B(2)));
    let _ = container.register(None, lifetime, |r| Ok(A(r.resolve(None)?, r.resolve(None)?)));
    container
}

#[inline]
fn container_resolve(container: &Container) {
    let _ = container.resolve::<A>(None).unwrap();
}

#[inline]
fn container_resolve_tagged_fallback(container: &Container) {
    let _ = container.resolve::<B>(Some(Tag::from("missing"))).unwrap();
}

#[inline]
fn container_resolve_cycle(container: &Container) {
    let parent = container.resolve::<Parent>(None).unwrap();
    assert!(parent.child.value().is_some());
}

fn criterion_benchmark(c: &mut Criterion) {
    let container_1 = container_with_chain(SharedInGraph);
    let container_2 = container_with_chain(Shared);
    let container_3 = container_with_chain(Unshared);
    let container_4 = Container::new();
    let _ = container_4
        .register(None, SharedInGraph, |_| {
            Ok(Parent {
                child: Injected::new(),
            })
        })
        .auto_injected();
    let _ = container_4
        .register(None, SharedInGraph, |_| {
            Ok(Child {
                parent: InjectedWeak::new(),
            })
        })
        .auto_injected();

    c.bench_function("container_new_with_chain", |b| b.iter(|| container_with_chain(SharedInGraph)))
        .bench_function("container_resolve_shared_in_graph", |b| b.iter(|| container_resolve(&container_1)))
        .bench_function("container_resolve_shared", |b| b.iter(|| container_resolve(&container_2)))
        .bench_function("container_resolve_unshared", |b| b.iter(|| container_resolve(&container_3)))
        .bench_function("container_resolve_tagged_fallback", |b| {
            b.iter(|| container_resolve_tagged_fallback(&container_1))
        })
        .bench_function("container_resolve_cycle", |b| b.iter(|| container_resolve_cycle(&container_4)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
