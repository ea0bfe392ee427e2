//! Dynamic-programming sweep benchmarks
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use rlgpi_agent::StochasticMdpAgent;
use rlgpi_core::{MdpModel, TabularPolicy};
use rlgpi_env::Gridworld;
use rlgpi_eval::dp::{evaluate_q_pi, evaluate_v_pi};

fn setup(side: usize) -> (rlgpi_env::MdpEnvironment, StochasticMdpAgent) {
    let last = side * side - 1;
    let env = Gridworld::new(side, side, &[0, last], -1.0, StdRng::seed_from_u64(0)).unwrap();
    let agent = StochasticMdpAgent::with_rng(
        "bench",
        1.0,
        StdRng::seed_from_u64(0),
        TabularPolicy::equiprobable_over(env.states()),
    );
    (env, agent)
}

fn bench_v_pi(c: &mut Criterion) {
    let mut group = c.benchmark_group("V sweeps");

    for side in [4, 8, 16] {
        let (env, agent) = setup(side);
        for update_in_place in [true, false] {
            let discipline = if update_in_place { "in_place" } else { "synchronous" };
            let id = BenchmarkId::new(discipline, format!("{side}x{side}"));
            group.bench_with_input(id, &update_in_place, |b, &in_place| {
                b.iter(|| {
                    black_box(evaluate_v_pi(&agent, &env, None, Some(10), in_place).unwrap());
                });
            });
        }
    }
    group.finish();
}

fn bench_q_pi(c: &mut Criterion) {
    let mut group = c.benchmark_group("Q sweeps");

    for side in [4, 8] {
        let (env, agent) = setup(side);
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| {
                black_box(evaluate_q_pi(&agent, &env, None, Some(10), true).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_v_pi, bench_q_pi);
criterion_main!(benches);
