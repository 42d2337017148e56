use core::hash::BuildHasher;
use core::hash::Hash;
use core::hint::black_box;
use std::collections::VecDeque;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use siphasher::sip::SipHasher;
use slot_hash::DuplicateKeyPolicy;
use slot_hash::FifoKeyedQueue;
use slot_hash::HashMap as SlotHashMap;

type HashbrownMap<K, V> = hashbrown::HashMap<K, V, SipBuild>;
type StdMap<K, V> = std::collections::HashMap<K, V, SipBuild>;
type SlotMap<K, V> = SlotHashMap<K, V, SipBuild>;

#[derive(Clone, Copy, Default)]
struct SipBuild;

impl BuildHasher for SipBuild {
    type Hasher = SipHasher;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher::new()
    }
}

trait BenchKey: Clone + Hash + Eq {
    fn new(key: u64) -> Self;
}

impl BenchKey for u64 {
    fn new(key: u64) -> Self {
        black_box(key)
    }
}

impl BenchKey for String {
    fn new(key: u64) -> Self {
        black_box(format!("key_{:016X}", key))
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

fn slot_map<K: BenchKey>(capacity: usize) -> SlotMap<K, u64> {
    SlotHashMap::with_hasher(capacity, DuplicateKeyPolicy::Replace, SipBuild)
}

fn random_keys<K: BenchKey>(count: usize) -> Vec<K> {
    let mut rng = SmallRng::from_os_rng();
    (0..count).map(|_| K::new(rng.random())).collect()
}

fn group_name<K>(name: &str) -> String {
    format!("{}_{}", name, core::any::type_name::<K>())
}

fn bench_insert_random<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<K>("insert_random"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("slot_hash/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut map = slot_map::<K>(0);
                    for (i, key) in keys.into_iter().enumerate() {
                        black_box(map.insert(key, i as u64).ok());
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut map = HashbrownMap::with_hasher(SipBuild);
                    for (i, key) in keys.into_iter().enumerate() {
                        black_box(map.insert(key, i as u64));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut map = StdMap::with_hasher(SipBuild);
                    for (i, key) in keys.into_iter().enumerate() {
                        black_box(map.insert(key, i as u64));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<K>("find_hit_miss"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size * 2);
        let (present, _) = keys.split_at(size);
        let mut probes = keys.clone();
        probes.shuffle(&mut SmallRng::from_os_rng());

        let mut slot = slot_map::<K>(size);
        let mut brown = HashbrownMap::with_capacity_and_hasher(size, SipBuild);
        let mut std_map = StdMap::with_capacity_and_hasher(size, SipBuild);
        for (i, key) in present.iter().enumerate() {
            let _ = slot.insert(key.clone(), i as u64);
            brown.insert(key.clone(), i as u64);
            std_map.insert(key.clone(), i as u64);
        }

        group.throughput(Throughput::Elements(probes.len() as u64));
        group.bench_function(format!("slot_hash/{size}"), |b| {
            b.iter(|| {
                for key in &probes {
                    black_box(slot.try_get(key));
                }
            })
        });
        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for key in &probes {
                    black_box(brown.get(key));
                }
            })
        });
        group.bench_function(format!("std/{size}"), |b| {
            b.iter(|| {
                for key in &probes {
                    black_box(std_map.get(key));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<K>("remove"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        let mut order = keys.clone();
        order.shuffle(&mut SmallRng::from_os_rng());

        let mut slot = slot_map::<K>(size);
        let mut brown = HashbrownMap::with_capacity_and_hasher(size, SipBuild);
        for (i, key) in keys.iter().enumerate() {
            let _ = slot.insert(key.clone(), i as u64);
            brown.insert(key.clone(), i as u64);
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("slot_hash/{size}"), |b| {
            b.iter_batched(
                || slot.clone(),
                |mut map| {
                    for key in &order {
                        black_box(map.remove(key));
                    }
                    black_box(map)
                },
                BatchSize::LargeInput,
            )
        });
        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || brown.clone(),
                |mut map| {
                    for key in &order {
                        black_box(map.remove(key));
                    }
                    black_box(map)
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

#[derive(Clone, Copy)]
enum Operation {
    Insert,
    Remove,
    Find,
}

fn bench_mixed_zipf<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<K>("mixed_zipf"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let mut rng = SmallRng::from_os_rng();
        let op_distr = Zipf::new(3.0, 1.0).unwrap();
        let key_distr = Zipf::new(size as f64 * 2.0 - 1.0, 1.0).unwrap();

        let script = (0..size * 3)
            .map(|_| {
                let op: f64 = rng.sample(op_distr);
                let key = K::new(rng.sample(key_distr) as u64);
                let op = if op <= 1.0 {
                    Operation::Find
                } else if op <= 2.0 {
                    Operation::Insert
                } else {
                    Operation::Remove
                };
                (op, key)
            })
            .collect::<Vec<(Operation, K)>>();

        group.throughput(Throughput::Elements(script.len() as u64));
        group.bench_function(format!("slot_hash/{size}"), |b| {
            b.iter_batched(
                || script.clone(),
                |script| {
                    let mut map = slot_map::<K>(0);
                    for (op, key) in script {
                        match op {
                            Operation::Insert => {
                                black_box(map.insert(key, 0).ok());
                            }
                            Operation::Remove => {
                                black_box(map.remove(&key));
                            }
                            Operation::Find => {
                                black_box(map.try_get(&key));
                            }
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || script.clone(),
                |script| {
                    let mut map = HashbrownMap::with_hasher(SipBuild);
                    for (op, key) in script {
                        match op {
                            Operation::Insert => {
                                black_box(map.insert(key, 0u64));
                            }
                            Operation::Remove => {
                                black_box(map.remove(&key));
                            }
                            Operation::Find => {
                                black_box(map.get(&key));
                            }
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_fifo_churn<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<K>("fifo_churn"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size * 4);
        group.throughput(Throughput::Elements(keys.len() as u64 * 2));

        group.bench_function(format!("fifo_keyed_queue/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut queue: FifoKeyedQueue<K, u64, SipBuild> =
                        FifoKeyedQueue::with_hasher(size, DuplicateKeyPolicy::Replace, SipBuild);
                    for (i, key) in keys.into_iter().enumerate() {
                        black_box(queue.enqueue(key, i as u64).ok());
                        if queue.len() >= size {
                            black_box(queue.dequeue().ok());
                        }
                    }
                    black_box(queue.drain_all())
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown+vecdeque/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut map = HashbrownMap::with_capacity_and_hasher(size, SipBuild);
                    let mut order = VecDeque::with_capacity(size);
                    for (i, key) in keys.into_iter().enumerate() {
                        if map.insert(key.clone(), i as u64).is_none() {
                            order.push_back(key);
                        }
                        if map.len() >= size {
                            if let Some(oldest) = order.pop_front() {
                                black_box(map.remove(&oldest));
                            }
                        }
                    }
                    black_box(
                        order
                            .drain(..)
                            .filter_map(|key| map.remove(&key))
                            .collect::<Vec<_>>(),
                    )
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<u64, 4>,
    bench_insert_random::<String, 3>,
    bench_find_hit_miss::<u64, 4>,
    bench_find_hit_miss::<String, 3>,
    bench_remove::<u64, 4>,
    bench_remove::<String, 3>,
    bench_mixed_zipf::<u64, 4>,
    bench_mixed_zipf::<String, 3>,
    bench_fifo_churn::<u64, 4>,
    bench_fifo_churn::<String, 3>,
);

criterion_main!(benches);
