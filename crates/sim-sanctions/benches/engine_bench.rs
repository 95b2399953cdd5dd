use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;
use sim_core::{Nation, NationId, SanctionCategory};
use std::collections::BTreeMap;

fn build_nations(n: usize) -> Vec<Nation> {
    (0..n)
        .map(|a| {
            let mut affinities = BTreeMap::new();
            for b in 0..n {
                if a != b {
                    // deterministic spread across the full affinity scale
                    let score = (((a * 37 + b * 17) % 201) as i32) - 100;
                    affinities.insert(NationId(format!("N{b}")), score);
                }
            }
            Nation {
                id: NationId(format!("N{a}")),
                gdp_usd: Decimal::new((a as i64 + 1) * 1_000, 0),
                affinities,
            }
        })
        .collect()
}

fn bench_simulate(c: &mut Criterion) {
    let nations = build_nations(30);
    let sanctioner = nations[0].id.clone();
    let target = nations[1].id.clone();
    let issued_at = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    c.bench_function("simulate 30 nations", |b| {
        b.iter(|| {
            let record = sim_sanctions::simulate_seeded(
                &sanctioner,
                &target,
                SanctionCategory::TradeBan,
                &nations,
                issued_at,
                42,
            )
            .unwrap();
            let _ = black_box(record);
        })
    });
}

criterion_group!(benches, bench_simulate);
criterion_main!(benches);
