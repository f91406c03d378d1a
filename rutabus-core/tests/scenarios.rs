//! End-to-end planning scenarios over small hand-made networks.

use std::sync::Arc;

use approx::assert_relative_eq;
use rutabus_core::model::{Direction, Route};
use rutabus_core::routing::itinerary::{describe, transfer_count};
use rutabus_core::routing::{Coordinate, CostModel, DirectRouteFinder, find_best};
use rutabus_core::routing::dijkstra::shortest_path;
use rutabus_core::{
    Endpoint, Error, GraphService, InMemoryRepository, JourneyPlanner, NetworkSnapshot,
    PlanRequest, PlannerConfig, SearchLimits, TRANSFER_PENALTY, WALK_PENALTY,
};

/// Longitude step of roughly one kilometre on the equator
const KM: f64 = 0.009;

fn snapshot(repo: InMemoryRepository) -> Arc<NetworkSnapshot> {
    GraphService::new(repo, PlannerConfig::default())
        .unwrap()
        .snapshot()
        .unwrap()
}

fn at(km: f64) -> Coordinate {
    Coordinate::new(0.0, km * KM)
}

/// Stops 1, 2 and 3 a kilometre apart. Line 10 runs 1 -> 2 and line 20
/// runs 2 -> 3; node 4 lies far north with no connections.
fn two_lines() -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    repo.add_node(1, 0.0, 0.0)
        .add_node(2, 0.0, KM)
        .add_node(3, 0.0, 2.0 * KM)
        .add_node(4, 1.0, 0.0)
        .add_edge(1, 1, 2, 1000.0)
        .add_edge(2, 2, 3, 1000.0)
        .add_route(Route::new(10, "Line 10"))
        .add_route(Route::new(20, "Line 20"))
        .add_route_edge(10, 1, Direction::Outbound, 0)
        .add_route_edge(20, 2, Direction::Outbound, 0)
        .add_route_node(10, 1, Direction::Outbound, 0)
        .add_route_node(10, 2, Direction::Outbound, 1)
        .add_route_node(20, 2, Direction::Outbound, 0)
        .add_route_node(20, 3, Direction::Outbound, 1);
    repo
}

/// Line 10 serving 1 -> 2 -> 3 in the outbound direction only
fn one_line() -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    repo.add_node(1, 0.0, 0.0)
        .add_node(2, 0.0, KM)
        .add_node(3, 0.0, 2.0 * KM)
        .add_edge(1, 1, 2, 1000.0)
        .add_edge(2, 2, 3, 1000.0)
        .add_route(Route::new(10, "Line 10"))
        .add_route_edge(10, 1, Direction::Outbound, 0)
        .add_route_edge(10, 2, Direction::Outbound, 1)
        .add_route_node(10, 1, Direction::Outbound, 0)
        .add_route_node(10, 2, Direction::Outbound, 1)
        .add_route_node(10, 3, Direction::Outbound, 2);
    repo
}

#[test]
fn walking_costs_the_same_both_ways() {
    let repo = InMemoryRepository::new();
    repo.add_node(1, 0.0, 0.0)
        .add_node(2, 0.0, 0.001)
        .add_edge(1, 1, 2, 111.0);
    let snap = snapshot(repo);
    let graph = &snap.graph;
    let a = graph.node_index(1).unwrap();
    let b = graph.node_index(2).unwrap();

    for (from, to) in [(a, b), (b, a)] {
        let mut budget = SearchLimits::unbounded().budget();
        let path = shortest_path(graph, from, to, &mut budget).unwrap().unwrap();
        assert_eq!(path.len(), 1);
        assert_relative_eq!(path.weight, 111.0 * WALK_PENALTY);
    }
}

#[test]
fn bus_arcs_are_not_reversed() {
    let snap = snapshot(one_line());
    let graph = &snap.graph;
    let one = graph.node_index(1).unwrap();
    let two = graph.node_index(2).unwrap();

    let bus_between = |from, to| {
        graph.graph.edge_indices().any(|idx| {
            graph.arc_endpoints(idx) == Some((from, to)) && !graph.arc(idx).kind.is_walk()
        })
    };
    assert!(bus_between(one, two));
    assert!(!bus_between(two, one));
    assert_eq!(graph.bus_arc_count(), 2);
}

#[test]
fn direct_ride_follows_stop_order() {
    let config = PlannerConfig::default();
    let snap = snapshot(one_line());
    let graph = &snap.graph;
    let finder = DirectRouteFinder::from_config(graph, &snap.stops, &config);
    let one = graph.node_index(1).unwrap();
    let three = graph.node_index(3).unwrap();

    let forward = finder.find_direct(one, three).unwrap();
    assert_eq!(forward.route_id, 10);
    assert!(forward.boarding_order < forward.alighting_order);
    assert_relative_eq!(forward.score, 2000.0);

    assert!(finder.find_direct(three, one).is_none());
}

#[test]
fn direct_journey_has_no_penalty() {
    let snap = snapshot(one_line());
    let config = PlannerConfig::default();
    let plan = JourneyPlanner::new(&snap, &config)
        .plan(&PlanRequest::new(at(0.0), at(2.0)))
        .unwrap();

    assert!(plan.direct_route);
    assert_eq!((plan.start_node, plan.end_node), (1, 3));
    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.summary.total_transfers, 0);
    assert_relative_eq!(plan.summary.total_bus_m, 2000.0);
    assert_relative_eq!(plan.cost, 2000.0);
}

#[test]
fn one_transfer_between_two_lines() {
    let snap = snapshot(two_lines());
    let config = PlannerConfig::default();
    let graph = &snap.graph;
    let one = graph.node_index(1).unwrap();
    let three = graph.node_index(3).unwrap();

    let direct = DirectRouteFinder::from_config(graph, &snap.stops, &config);
    assert!(direct.find_direct(one, three).is_none());

    let best = find_best(
        graph,
        &CostModel::from_config(&config),
        one,
        three,
        config.max_candidates,
        &config.limits(),
    )
    .unwrap();
    assert_eq!(best.transfers, 1);
    assert_relative_eq!(best.cost, best.path.raw_weight(graph) + TRANSFER_PENALTY);
    assert_relative_eq!(best.cost, 2500.0);

    let plan = JourneyPlanner::new(&snap, &config)
        .plan(&PlanRequest::new(at(0.0), at(2.0)))
        .unwrap();
    assert!(!plan.direct_route);
    assert_eq!(plan.summary.total_transfers, 1);
    let routes: Vec<_> = plan.steps.iter().map(|s| s.route_id).collect();
    assert_eq!(routes, vec![Some(10), Some(20)]);
}

#[test]
fn single_candidate_is_the_raw_shortest_path() {
    // Buses are shorter on raw weight but two of them cost a transfer
    // penalty that walking avoids
    let repo = InMemoryRepository::new();
    repo.add_node(1, 0.0, 0.0)
        .add_node(2, 0.0, 0.0009)
        .add_node(3, 0.0, 0.0018)
        .add_edge(1, 1, 2, 100.0)
        .add_edge(2, 2, 3, 100.0)
        .add_route(Route::new(10, "Line 10"))
        .add_route(Route::new(20, "Line 20"))
        .add_route_edge(10, 1, Direction::Outbound, 0)
        .add_route_edge(20, 2, Direction::Outbound, 0);
    let snap = snapshot(repo);
    let graph = &snap.graph;
    let model = CostModel::new(TRANSFER_PENALTY);
    let limits = SearchLimits::unbounded();
    let one = graph.node_index(1).unwrap();
    let three = graph.node_index(3).unwrap();

    let mut budget = limits.budget();
    let raw = shortest_path(graph, one, three, &mut budget).unwrap().unwrap();
    let single = find_best(graph, &model, one, three, 1, &limits).unwrap();
    assert_eq!(single.path.arcs, raw.arcs);
    assert_relative_eq!(single.cost, 200.0 + TRANSFER_PENALTY);

    let ranked = find_best(graph, &model, one, three, 8, &limits).unwrap();
    assert_eq!(ranked.transfers, 0);
    assert!(ranked.path.arcs(graph).all(|arc| arc.kind.is_walk()));
    assert_relative_eq!(ranked.cost, 200.0 * WALK_PENALTY);
}

#[test]
fn segments_split_at_every_transfer() {
    let snap = snapshot(two_lines());
    let config = PlannerConfig::default();
    let graph = &snap.graph;
    let best = find_best(
        graph,
        &CostModel::from_config(&config),
        graph.node_index(1).unwrap(),
        graph.node_index(3).unwrap(),
        config.max_candidates,
        &config.limits(),
    )
    .unwrap();

    let segments = describe(graph, &best.path);
    assert_eq!(segments.len(), 1 + best.transfers);
    assert_eq!(transfer_count(&segments), best.transfers);
}

#[test]
fn same_node_is_a_zero_itinerary() {
    let snap = snapshot(two_lines());
    let config = PlannerConfig::default();
    let plan = JourneyPlanner::new(&snap, &config)
        .plan(&PlanRequest::new(at(1.0), Coordinate::new(0.0001, KM)))
        .unwrap();

    assert!(plan.is_stationary());
    assert_eq!((plan.start_node, plan.end_node), (2, 2));
    assert_eq!(plan.summary.total_transfers, 0);
    assert_relative_eq!(plan.summary.total_walk_m + plan.summary.total_bus_m, 0.0);
}

#[test]
fn missing_node_and_missing_path_differ() {
    let snap = snapshot(two_lines());
    let config = PlannerConfig::default();
    let planner = JourneyPlanner::new(&snap, &config);
    let nowhere = Coordinate::new(5.0, 5.0);
    let isolated = Coordinate::new(1.0, 0.0);

    let err = planner.plan(&PlanRequest::new(nowhere, at(0.0))).unwrap_err();
    assert!(matches!(err, Error::NoNearbyNode { endpoint: Endpoint::Origin }));

    let err = planner.plan(&PlanRequest::new(at(0.0), nowhere)).unwrap_err();
    assert!(matches!(err, Error::NoNearbyNode { endpoint: Endpoint::Destination }));

    let err = planner.plan(&PlanRequest::new(at(0.0), isolated)).unwrap_err();
    assert!(matches!(err, Error::NoPathFound));
}

#[test]
fn cyclic_route_search_terminates() {
    let repo = InMemoryRepository::new();
    repo.add_node(1, 0.0, 0.0)
        .add_node(2, 0.0, KM)
        .add_node(3, KM, KM)
        .add_node(4, 1.0, 0.0)
        .add_edge(1, 1, 2, 1000.0)
        .add_edge(2, 2, 3, 1000.0)
        .add_edge(3, 3, 1, 1400.0)
        .add_route(Route::new(30, "Circle"))
        .add_route_edge(30, 1, Direction::Outbound, 0)
        .add_route_edge(30, 2, Direction::Outbound, 1)
        .add_route_edge(30, 3, Direction::Outbound, 2);
    let snap = snapshot(repo);
    let network = &snap.route_network;

    let mut budget = SearchLimits::unbounded().budget();
    let found = network.find_routes_with_transfers(1, 3, 5, 2, &mut budget);
    assert!(!found.is_empty());
    let stops: Vec<_> = found[0].stops.iter().map(|v| v.node_id).collect();
    assert_eq!(stops, vec![1, 2, 3]);
    assert_eq!(found[0].transfers, 0);
    assert_relative_eq!(found[0].total_distance, 2000.0);

    let mut budget = SearchLimits::unbounded().budget();
    assert!(network.find_routes_with_transfers(1, 4, 5, 2, &mut budget).is_empty());
    assert!(!budget.is_exhausted());
}

#[test]
fn rebuild_picks_up_new_records() {
    let repo = Arc::new(one_line());
    let service = GraphService::new(Arc::clone(&repo), PlannerConfig::default()).unwrap();
    let first = service.snapshot().unwrap();
    assert_eq!(first.generation, 1);
    assert_eq!(first.graph.node_count(), 3);

    repo.add_node(4, 0.0, 3.0 * KM).add_edge(3, 3, 4, 1000.0);
    assert_eq!(service.snapshot().unwrap().graph.node_count(), 3);

    let second = service.rebuild().unwrap();
    assert_eq!(second.generation, 2);
    assert_eq!(second.graph.node_count(), 4);
    assert_eq!(first.graph.node_count(), 3);
}
