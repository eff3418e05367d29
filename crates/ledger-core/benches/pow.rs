use criterion::{criterion_group, criterion_main, Criterion};
use ledger_core::{mine, Block, Transaction};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn candidate() -> Block {
    let mut rng = StdRng::seed_from_u64(42);
    let txs: Vec<Transaction> = (0..5)
        .map(|i| {
            Transaction::new(
                format!("alice-{i}"),
                "bob",
                rng.gen_range(1.0..10.0),
                1_600_000_000 + i,
            )
        })
        .collect();
    Block::candidate(txs, None)
}

fn bench_pow(c: &mut Criterion) {
    let block = candidate();

    c.bench_function("mine_sequential_difficulty_4", |b| {
        b.iter(|| mine::mine_sequential(&block, 4));
    });

    c.bench_function("mine_parallel_difficulty_4", |b| {
        b.iter(|| mine::mine_parallel(&block, 4));
    });
}

criterion_group!(benches, bench_pow);
criterion_main!(benches);
