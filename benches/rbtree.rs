use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rbtree_index::RbTree;
use std::collections::BTreeSet;

const NUM_OF_OPERATIONS: usize = 1000;

fn random_values() -> Vec<u32> {
    let mut rng = SmallRng::from_seed([1; 16]);
    (0..NUM_OF_OPERATIONS).map(|_| rng.gen()).collect()
}

fn bench_rbtree_insert(c: &mut Criterion) {
    let values = random_values();
    c.bench_function("bench rbtree insert", move |b| {
        b.iter(|| {
            let mut index = RbTree::new("bench");
            for value in values.iter() {
                index.insert(*value);
            }
            index.len()
        })
    });
}

fn bench_rbtree_contains(c: &mut Criterion) {
    let values = random_values();
    let index: RbTree<u32> = values.iter().cloned().collect();
    c.bench_function("bench rbtree contains", move |b| {
        b.iter(|| values.iter().filter(|v| index.contains(*v)).count())
    });
}

fn bench_rbtree_remove(c: &mut Criterion) {
    let values = random_values();
    let index: RbTree<u32> = values.iter().cloned().collect();
    c.bench_function("bench rbtree remove", move |b| {
        b.iter(|| {
            let mut index = index.clone();
            values.iter().filter_map(|v| index.remove(v)).count()
        })
    });
}

fn bench_btreeset_insert(c: &mut Criterion) {
    let values = random_values();
    c.bench_function("bench btreeset insert", move |b| {
        b.iter(|| {
            let mut set = BTreeSet::new();
            for value in values.iter() {
                set.insert(*value);
            }
            set.len()
        })
    });
}

criterion_group!(
    benches,
    bench_rbtree_insert,
    bench_rbtree_contains,
    bench_rbtree_remove,
    bench_btreeset_insert
);
criterion_main!(benches);
