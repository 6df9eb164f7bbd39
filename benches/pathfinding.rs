mod util;

use pprof::criterion::{Output, PProfProfiler};

use crate::util::create_walled_grid;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridcast::{EdgePolicy, GridMode, OccupancyGrid, PlanOptions};

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathfinding");
    group.sample_size(50);

    let size = 64;
    let grid = create_walled_grid(size, 2);
    let end = [size as i64 - 1, size as i64 - 1];

    group.bench_function("plan_path_any_front_cell", |b| {
        bench_plan(b, &grid, &end, EdgePolicy::AnyFrontCell);
    });

    group.bench_function("plan_path_clear_corridor", |b| {
        bench_plan(b, &grid, &end, EdgePolicy::ClearCorridor);
    });

    group.bench_function("cartograph", |b| {
        b.iter(|| {
            let result = grid
                .cartograph(black_box(&[0.5, 0.5]), black_box(&[1.5, 62.5]))
                .unwrap();
            black_box(result);
        });
    });

    group.finish();
}

fn bench_plan(
    b: &mut criterion::Bencher,
    grid: &OccupancyGrid,
    end: &[i64],
    edge_policy: EdgePolicy,
) {
    let options = PlanOptions {
        mode: GridMode::Cell,
        edge_policy,
        ..PlanOptions::default()
    };
    b.iter(|| {
        let result = grid
            .plan_path(black_box(&[0, 0]), black_box(end), &options)
            .unwrap();
        black_box(result);
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = criterion_benchmark
}
criterion_main!(benches);
