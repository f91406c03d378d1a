//! Transfer-limited search over the bus routes alone.
//!
//! States are `(node, route)` pairs. The search prefers fewer route
//! changes first and shorter distance second, either riding on along the
//! current route or switching to another route serving the same node.
//! Walking is not modelled.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

use hashbrown::{HashMap, HashSet};
use log::{debug, warn};
use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::config::SearchBudget;
use crate::model::{ArcKind, PlanningGraph};
use crate::{Meters, NodeId, RouteId};

/// One node of a transfer route and the route it is reached on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteVisit {
    pub node_id: NodeId,
    pub route_id: RouteId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferRoute {
    pub stops: Vec<RouteVisit>,
    pub transfers: usize,
    pub total_distance: Meters,
}

/// Per-route adjacency lists keyed by repository node ids
#[derive(Debug, Clone, Default)]
pub struct RouteNetwork {
    route_graphs: HashMap<RouteId, HashMap<NodeId, Vec<(NodeId, Meters)>>>,
    node_routes: HashMap<NodeId, BTreeSet<RouteId>>,
}

impl RouteNetwork {
    /// Collects the bus arcs of the planning graph. Both directions of a
    /// route share one adjacency list.
    pub fn from_graph(graph: &PlanningGraph) -> Self {
        let mut network = Self::default();
        for edge in graph.graph.edge_references() {
            let ArcKind::Bus { route_id, .. } = &edge.weight().kind else {
                continue;
            };
            let source = graph.node(edge.source()).id;
            let target = graph.node(edge.target()).id;

            network
                .route_graphs
                .entry(*route_id)
                .or_default()
                .entry(source)
                .or_default()
                .push((target, edge.weight().distance));
            network.node_routes.entry(source).or_default().insert(*route_id);
            network.node_routes.entry(target).or_default().insert(*route_id);
        }
        network
    }

    pub fn route_count(&self) -> usize {
        self.route_graphs.len()
    }

    /// Routes touching a node, in ascending id order
    pub fn routes_at(&self, node: NodeId) -> impl Iterator<Item = RouteId> + '_ {
        self.node_routes.get(&node).into_iter().flatten().copied()
    }

    /// Up to `max_paths` ways from `origin` to `destination` using at most
    /// `max_transfers` route changes, fewest transfers first.
    ///
    /// Each `(node, route)` state is expanded once, so cyclic routes
    /// terminate. If the budget runs out the routes found so far are
    /// returned.
    pub fn find_routes_with_transfers(
        &self,
        origin: NodeId,
        destination: NodeId,
        max_paths: usize,
        max_transfers: usize,
        budget: &mut SearchBudget,
    ) -> Vec<TransferRoute> {
        let mut results = Vec::new();
        let mut visited: HashSet<(NodeId, RouteId)> = HashSet::new();
        // Visits with the index of their predecessor
        let mut trail: Vec<(RouteVisit, Option<usize>)> = Vec::new();
        let mut queue = BinaryHeap::new();

        for route_id in self.routes_at(origin) {
            trail.push((
                RouteVisit {
                    node_id: origin,
                    route_id,
                },
                None,
            ));
            queue.push(QueueEntry {
                transfers: 0,
                cost: 0.0,
                node: origin,
                route: route_id,
                tail: trail.len() - 1,
            });
        }

        while results.len() < max_paths {
            let Some(entry) = queue.pop() else {
                break;
            };
            if budget.tick().is_err() {
                warn!(
                    "Search budget exhausted after {} transfer routes",
                    results.len()
                );
                break;
            }
            if !visited.insert((entry.node, entry.route)) {
                continue;
            }

            if entry.node == destination {
                results.push(TransferRoute {
                    stops: unwind(&trail, entry.tail),
                    transfers: entry.transfers,
                    total_distance: entry.cost,
                });
                continue;
            }

            let neighbours = self
                .route_graphs
                .get(&entry.route)
                .and_then(|adjacency| adjacency.get(&entry.node));
            for &(next, distance) in neighbours.into_iter().flatten() {
                trail.push((
                    RouteVisit {
                        node_id: next,
                        route_id: entry.route,
                    },
                    Some(entry.tail),
                ));
                queue.push(QueueEntry {
                    transfers: entry.transfers,
                    cost: entry.cost + distance,
                    node: next,
                    route: entry.route,
                    tail: trail.len() - 1,
                });
            }

            if entry.transfers < max_transfers {
                for alternative in self.routes_at(entry.node).filter(|&r| r != entry.route) {
                    queue.push(QueueEntry {
                        transfers: entry.transfers + 1,
                        route: alternative,
                        ..entry
                    });
                }
            }
        }

        debug!(
            "Transfer search {origin} -> {destination}: {} routes, {} states visited",
            results.len(),
            visited.len()
        );
        results
    }
}

fn unwind(trail: &[(RouteVisit, Option<usize>)], tail: usize) -> Vec<RouteVisit> {
    let mut stops = Vec::new();
    let mut current = Some(tail);
    while let Some(index) = current {
        let (visit, parent) = trail[index];
        stops.push(visit);
        current = parent;
    }
    stops.reverse();
    stops
}

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    transfers: usize,
    cost: Meters,
    node: NodeId,
    route: RouteId,
    tail: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on (transfers, cost, node, route)
        other
            .transfers
            .cmp(&self.transfers)
            .then_with(|| other.cost.total_cmp(&self.cost))
            .then_with(|| other.node.cmp(&self.node))
            .then_with(|| other.route.cmp(&self.route))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
