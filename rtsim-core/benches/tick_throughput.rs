use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rtsim_core::{Simulation, SimulationConfig, TaskSpec};

fn bench_reference_run(c: &mut Criterion) {
    c.bench_function("reference_run_20_ticks", |b| {
        b.iter(|| {
            let mut sim = Simulation::new(black_box(SimulationConfig::reference())).unwrap();
            black_box(sim.run_to_completion().unwrap())
        });
    });
}

fn bench_long_horizon(c: &mut Criterion) {
    let config = SimulationConfig {
        tasks: (0..32)
            .map(|i| TaskSpec::new(i % 8, 8 + i as u64, 1 + (i as u64 % 4), i % 3 == 0))
            .collect(),
        horizon: 10_000,
        display_window: 20,
    };

    c.bench_function("thirty_two_tasks_10k_ticks", |b| {
        b.iter(|| {
            let mut sim = Simulation::new(black_box(config.clone())).unwrap();
            black_box(sim.run_to_completion().unwrap())
        });
    });
}

criterion_group!(benches, bench_reference_run, bench_long_horizon);
criterion_main!(benches);
