//! In-memory planning graph combining walk and bus arcs

use std::sync::Arc;

use geo::LineString;
use hashbrown::HashMap;
use petgraph::{
    Directed, Direction as GraphDirection,
    graph::{DiGraph, EdgeIndex, EdgeReference, Edges, NodeIndex},
};

use super::network::{Direction, Node};
use crate::{EdgeId, Meters, NodeId, RouteId};

/// What kind of movement an arc represents
#[derive(Debug, Clone, PartialEq)]
pub enum ArcKind {
    Walk,
    Bus {
        route_id: RouteId,
        route_name: Arc<str>,
        direction: Direction,
        order: u32,
    },
}

impl ArcKind {
    pub fn is_walk(&self) -> bool {
        matches!(self, ArcKind::Walk)
    }

    pub fn route_id(&self) -> Option<RouteId> {
        match self {
            ArcKind::Walk => None,
            ArcKind::Bus { route_id, .. } => Some(*route_id),
        }
    }

    /// Same mode and, for buses, same route. Moving between arcs that
    /// differ here is a transfer.
    pub fn same_service(&self, other: &ArcKind) -> bool {
        match (self, other) {
            (ArcKind::Walk, ArcKind::Walk) => true,
            (ArcKind::Bus { route_id: a, .. }, ArcKind::Bus { route_id: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Same mode, route and direction
    pub fn same_run(&self, other: &ArcKind) -> bool {
        match (self, other) {
            (ArcKind::Walk, ArcKind::Walk) => true,
            (
                ArcKind::Bus {
                    route_id: a,
                    direction: da,
                    ..
                },
                ArcKind::Bus {
                    route_id: b,
                    direction: db,
                    ..
                },
            ) => a == b && da == db,
            _ => false,
        }
    }
}

/// Directed, weighted arc of the planning graph
#[derive(Debug, Clone)]
pub struct TransitArc {
    /// Street edge the arc was derived from
    pub edge_id: EdgeId,
    /// Traversal cost; walk arcs carry the walk penalty
    pub weight: f64,
    /// Ground length in meters
    pub distance: Meters,
    pub kind: ArcKind,
    /// Drawn in travel direction
    pub geometry: LineString<f64>,
}

/// Directed multigraph over repository nodes
#[derive(Debug, Clone, Default)]
pub struct PlanningGraph {
    pub graph: DiGraph<Node, TransitArc>,
    index: HashMap<NodeId, NodeIndex>,
}

impl PlanningGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, arcs: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, arcs),
            index: HashMap::with_capacity(nodes),
        }
    }

    /// Inserts a node, or returns the existing index for its id.
    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node.id) {
            return idx;
        }
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        idx
    }

    pub fn add_arc(&mut self, source: NodeIndex, target: NodeIndex, arc: TransitArc) -> EdgeIndex {
        self.graph.add_edge(source, target, arc)
    }

    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.index.get(&id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.graph[idx]
    }

    pub fn arc(&self, idx: EdgeIndex) -> &TransitArc {
        &self.graph[idx]
    }

    pub fn arc_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    /// Outgoing arcs of a node
    pub fn edges(&self, node: NodeIndex) -> Edges<'_, TransitArc, Directed> {
        self.graph.edges(node)
    }

    /// Arcs of a node in the given direction
    pub fn edges_directed(
        &self,
        node: NodeIndex,
        direction: GraphDirection,
    ) -> impl Iterator<Item = EdgeReference<'_, TransitArc>> {
        self.graph.edges_directed(node, direction)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn arc_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn walk_arc_count(&self) -> usize {
        self.graph
            .edge_weights()
            .filter(|arc| arc.kind.is_walk())
            .count()
    }

    pub fn bus_arc_count(&self) -> usize {
        self.arc_count() - self.walk_arc_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
