use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use lottery_wheel::config::WheelConfig;
use lottery_wheel::coverage_engine::incremental::IncrementalEngine;
use lottery_wheel::coverage_engine::pairwise::PairwiseEngine;
use lottery_wheel::coverage_engine::CoverageEngine;
use lottery_wheel::problem_graph::adjacency::TicketAdjacency;
use lottery_wheel::problem_graph::ProblemGraph;
use lottery_wheel::progress::NoProgress;

/// selections charged per iteration
const SELECTION_COUNT: usize = 20;

fn benchmark_charge_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("charge selection");

    for (range, ticket_size, match_size) in [(12, 6, 3), (14, 5, 3)] {
        let config = WheelConfig::new(range, ticket_size, match_size);
        let graph = ProblemGraph::build(&config, &mut NoProgress).unwrap();
        let adjacency = TicketAdjacency::pairwise(graph.tickets(), match_size);

        let mut rng = StdRng::seed_from_u64(0);
        let selections: Vec<usize> = (0..SELECTION_COUNT)
            .map(|_| rng.random_range(0..graph.ticket_count()))
            .collect();
        let parameter = format!("{}/{}/{}", range, ticket_size, match_size);

        group.bench_with_input(
            BenchmarkId::new("incremental", &parameter),
            &selections,
            |b, selections| {
                b.iter(|| {
                    let mut engine = IncrementalEngine::new(&graph);
                    for &selection in selections {
                        engine.charge_selection(selection);
                    }
                    engine.covered_count()
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("pairwise", &parameter),
            &selections,
            |b, selections| {
                b.iter(|| {
                    let mut engine = PairwiseEngine::new(graph.tickets(), match_size, &adjacency);
                    for &selection in selections {
                        engine.charge_selection(selection);
                    }
                    engine.covered_count()
                })
            },
        );
    }

    group.finish();
}

fn benchmark_graph_build(c: &mut Criterion) {
    let config = WheelConfig::new(20, 6, 3);
    c.bench_function("build problem graph 20/6/3", |b| {
        b.iter(|| ProblemGraph::build(&config, &mut NoProgress).unwrap().ticket_count())
    });
}

criterion_group!(
    charge_selection_benches,
    benchmark_charge_selection,
    benchmark_graph_build
);
criterion_main!(charge_selection_benches);
