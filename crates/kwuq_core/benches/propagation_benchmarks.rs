//! Criterion benchmarks for kwuq_core
//!
//! Run with: cargo bench -p kwuq_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kwuq_core::config::{ParameterEntry, UqConfig};
use kwuq_core::model::{PublishedParam, PublishedParams};
use kwuq_core::simulation::{SimulationConfig, Simulator};
use kwuq_core::simulators::LookaheadSimulator;
use kwuq_core::transform::{FixedParams, transform};

fn kw94_one() -> PublishedParams {
    PublishedParams::from_values(&[
        9.21, 0.038, 0.033, -0.0005, 0.0, 0.0, 8.48, 0.07, 0.067, -0.001, 0.022, -0.0005, 0.0,
        4000.0, 15000.0, 14500.0, 0.2, 0.0, 0.25, 0.0, 0.0, 1500.0, 0.0, 0.0, 0.0, 1500.0,
    ])
    .unwrap()
}

fn create_config(num_draws: usize) -> UqConfig {
    let mean = kw94_one();
    let mut config = UqConfig::new(
        mean.iter()
            .map(|(name, value)| ParameterEntry {
                name,
                mean: value,
                sd: value.abs() * 0.02,
            })
            .collect(),
    );
    config.simulation = SimulationConfig {
        num_agents: 200,
        num_periods: 20,
        seed: 132,
    };
    config.propagation.num_draws = num_draws;
    config
}

fn bench_transform(c: &mut Criterion) {
    let published = kw94_one();
    let fixed = FixedParams::default();

    c.bench_function("transform_kw94_one", |b| {
        b.iter(|| transform(black_box(&published), black_box(&fixed)))
    });
}

fn bench_simulate(c: &mut Criterion) {
    let params = transform(&kw94_one(), &FixedParams::default());
    let simulator = LookaheadSimulator::default();
    let config = create_config(1).simulation;

    c.bench_function("lookahead_200x20", |b| {
        b.iter(|| simulator.simulate(black_box(&params), black_box(&config)))
    });
}

fn bench_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagation");
    group.sample_size(10);

    for draws in [8, 32].iter() {
        let propagator = create_config(*draws)
            .propagator()
            .expect("benchmark config is valid");

        group.bench_with_input(BenchmarkId::new("parallel", draws), draws, |b, _| {
            b.iter(|| propagator.run())
        });
        group.bench_with_input(BenchmarkId::new("sequential", draws), draws, |b, _| {
            b.iter(|| propagator.run_sequential())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_transform, bench_simulate, bench_propagation);
criterion_main!(benches);
