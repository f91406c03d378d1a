use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rutabus_core::model::{Direction, Route};
use rutabus_core::routing::Coordinate;
use rutabus_core::{InMemoryRepository, JourneyPlanner, NetworkSnapshot, PlanRequest, PlannerConfig};

const SIDE: i64 = 30;
/// Roughly 200 m between neighbouring grid nodes
const STEP: f64 = 0.0018;

fn node_id(row: i64, col: i64) -> i64 {
    row * SIDE + col
}

/// Street grid with one bus line along every fifth row and column
fn grid() -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    for row in 0..SIDE {
        for col in 0..SIDE {
            repo.add_node(node_id(row, col), row as f64 * STEP, col as f64 * STEP);
        }
    }

    let mut edge_id = 0;
    for row in 0..SIDE {
        for col in 0..SIDE {
            let here = node_id(row, col);
            if col + 1 < SIDE {
                repo.add_edge(edge_id, here, node_id(row, col + 1), 200.0);
                if row % 5 == 0 {
                    let route_id = row;
                    repo.add_route_edge(route_id, edge_id, Direction::Outbound, col as u32)
                        .add_route_node(route_id, here, Direction::Outbound, col as u32);
                }
                edge_id += 1;
            }
            if row + 1 < SIDE {
                repo.add_edge(edge_id, here, node_id(row + 1, col), 200.0);
                if col % 5 == 0 {
                    let route_id = 1000 + col;
                    repo.add_route_edge(route_id, edge_id, Direction::Outbound, row as u32)
                        .add_route_node(route_id, here, Direction::Outbound, row as u32);
                }
                edge_id += 1;
            }
        }
    }

    for line in (0..SIDE).step_by(5) {
        repo.add_route(Route::new(line, format!("Row {line}")))
            .add_route(Route::new(1000 + line, format!("Column {line}")))
            .add_route_node(line, node_id(line, SIDE - 1), Direction::Outbound, SIDE as u32 - 1)
            .add_route_node(
                1000 + line,
                node_id(SIDE - 1, line),
                Direction::Outbound,
                SIDE as u32 - 1,
            );
    }
    repo
}

fn corner(row: i64, col: i64) -> Coordinate {
    Coordinate::new(row as f64 * STEP, col as f64 * STEP)
}

fn bench_build(c: &mut Criterion) {
    let repo = grid();
    let config = PlannerConfig::default();
    c.bench_function("snapshot_build", |b| {
        b.iter(|| NetworkSnapshot::build(black_box(&repo), &config, 1))
    });
}

fn bench_plan(c: &mut Criterion) {
    let config = PlannerConfig::default();
    let Ok(snapshot) = NetworkSnapshot::build(&grid(), &config, 1) else {
        panic!("grid network failed to build");
    };
    let planner = JourneyPlanner::new(&snapshot, &config);

    let mut group = c.benchmark_group("plan");
    group.bench_function("direct", |b| {
        let request = PlanRequest::new(corner(0, 1), corner(0, SIDE - 2));
        b.iter(|| planner.plan(black_box(&request)))
    });
    group.bench_function("multimodal", |b| {
        let request = PlanRequest::new(corner(2, 2), corner(SIDE - 3, SIDE - 3));
        b.iter(|| planner.plan(black_box(&request)))
    });
    group.bench_function("transfer_routes", |b| {
        let request = PlanRequest::new(corner(0, 0), corner(SIDE - 1, SIDE - 1));
        b.iter(|| planner.transfer_routes(black_box(&request)))
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_plan);
criterion_main!(benches);
