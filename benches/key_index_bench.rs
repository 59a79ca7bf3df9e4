use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hash_list::key_index::KeyIndex;
use slotmap::{DefaultKey, SlotMap};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn slots(n: usize) -> Vec<DefaultKey> {
    let mut arena: SlotMap<DefaultKey, ()> = SlotMap::with_capacity(n);
    (0..n).map(|_| arena.insert(())).collect()
}

fn filled(seed: u64, n: usize) -> (KeyIndex<String>, Vec<String>, Vec<DefaultKey>) {
    let mut ix = KeyIndex::new();
    let keys: Vec<String> = lcg(seed).take(n).map(key).collect();
    let slots = slots(n);
    for (k, &slot) in keys.iter().zip(&slots) {
        ix.insert(k.clone(), slot).unwrap();
    }
    (ix, keys, slots)
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("key_index::insert_fresh_100k", |b| {
        b.iter_batched(
            || {
                let keys: Vec<String> = lcg(1).take(100_000).map(key).collect();
                (keys, slots(100_000))
            },
            |(keys, slots)| {
                let mut ix = KeyIndex::new();
                for (k, slot) in keys.into_iter().zip(slots) {
                    ix.insert(k, slot).unwrap();
                }
                black_box(ix)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_find_hit_10k(c: &mut Criterion) {
    c.bench_function("key_index::find_hit_10k_on_100k", |b| {
        let (ix, keys, _) = filled(7, 100_000);
        let n = keys.len();
        let mut s = 0x9e3779b97f4a7c15u64;
        let queries: Vec<String> = (0..10_000)
            .map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                keys[(s as usize) % n].clone()
            })
            .collect();
        b.iter(|| {
            for k in &queries {
                black_box(ix.find(k));
            }
        })
    });
}

fn bench_find_miss_10k(c: &mut Criterion) {
    c.bench_function("key_index::find_miss_10k_on_100k", |b| {
        let (ix, _, _) = filled(11, 100_000);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for _ in 0..10_000 {
                let k = key(miss.next().unwrap());
                black_box(ix.find(&k));
            }
        })
    });
}

// Unlinking by slot skips hashing and comparing keys; compare with removal by key.
fn bench_unlink_vs_remove_10k(c: &mut Criterion) {
    c.bench_function("key_index::unlink_10k_of_100k", |b| {
        b.iter_batched(
            || filled(5, 100_000),
            |(mut ix, _, slots)| {
                for &slot in slots.iter().step_by(10) {
                    let _ = ix.unlink(slot);
                }
                black_box(ix)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("key_index::remove_10k_of_100k", |b| {
        b.iter_batched(
            || filled(5, 100_000),
            |(mut ix, keys, _)| {
                for k in keys.iter().step_by(10) {
                    let _ = ix.remove(k);
                }
                black_box(ix)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_find_hit_10k,
              bench_find_miss_10k,
              bench_unlink_vs_remove_10k
}
criterion_main!(benches_insert, benches_ops);
