//! Per-node index of route stop sequences and the route catalog

use hashbrown::{HashMap, HashSet};
use log::warn;
use petgraph::graph::NodeIndex;

use super::graph::PlanningGraph;
use super::network::{Direction, Route, RouteNode, RouteStop};
use crate::{RecordError, RouteId};

/// Routes stopping at each graph node, with their order in the sequence
#[derive(Debug, Clone, Default)]
pub struct RouteStopIndex {
    by_node: HashMap<NodeIndex, Vec<RouteStop>>,
    len: usize,
}

impl RouteStopIndex {
    /// Indexes route stops against the graph.
    ///
    /// Stops at unknown nodes and repeated orders within one
    /// (route, direction) are skipped and returned as record errors.
    pub fn build(graph: &PlanningGraph, route_nodes: &[RouteNode]) -> (Self, Vec<RecordError>) {
        let mut by_node: HashMap<NodeIndex, Vec<RouteStop>> = HashMap::new();
        let mut seen: HashSet<(RouteId, Direction, u32)> =
            HashSet::with_capacity(route_nodes.len());
        let mut skipped = Vec::new();
        let mut len = 0;

        for route_node in route_nodes {
            let Some(node) = graph.node_index(route_node.node_id) else {
                skipped.push(RecordError::MissingStopNode {
                    route_id: route_node.route_id,
                    node_id: route_node.node_id,
                });
                continue;
            };
            if !seen.insert((route_node.route_id, route_node.direction, route_node.order)) {
                skipped.push(RecordError::DuplicateStopOrder {
                    route_id: route_node.route_id,
                    order: route_node.order,
                });
                continue;
            }
            by_node.entry(node).or_default().push(route_node.stop());
            len += 1;
        }

        for stops in by_node.values_mut() {
            stops.sort_unstable();
        }

        if !skipped.is_empty() {
            warn!("Skipped {} malformed route stop records", skipped.len());
        }

        (Self { by_node, len }, skipped)
    }

    /// Route stops at a node, ordered by (route, direction, order)
    pub fn stops_at(&self, node: NodeIndex) -> &[RouteStop] {
        self.by_node.get(&node).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Route metadata by id
#[derive(Debug, Clone, Default)]
pub struct RouteCatalog {
    routes: HashMap<RouteId, Route>,
}

impl RouteCatalog {
    pub fn get(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl FromIterator<Route> for RouteCatalog {
    fn from_iter<T: IntoIterator<Item = Route>>(iter: T) -> Self {
        Self {
            routes: iter.into_iter().map(|route| (route.id, route)).collect(),
        }
    }
}
