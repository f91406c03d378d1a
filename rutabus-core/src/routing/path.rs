use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::model::{PlanningGraph, TransitArc};

/// Sequence of arcs through the planning graph.
///
/// `nodes` always has one more element than `arcs`; a path that does not
/// move holds a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub nodes: Vec<NodeIndex>,
    pub arcs: Vec<EdgeIndex>,
    /// Cost under the weighting the path was searched with
    pub weight: f64,
}

impl Path {
    pub fn trivial(node: NodeIndex) -> Self {
        Self {
            nodes: vec![node],
            arcs: Vec::new(),
            weight: 0.0,
        }
    }

    pub fn source(&self) -> NodeIndex {
        self.nodes[0]
    }

    pub fn target(&self) -> NodeIndex {
        self.nodes[self.nodes.len() - 1]
    }

    /// Number of arcs
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Appends `other`, which must start where `self` ends.
    pub fn concat(mut self, other: &Path) -> Self {
        debug_assert_eq!(self.target(), other.source());
        self.nodes.extend_from_slice(&other.nodes[1..]);
        self.arcs.extend_from_slice(&other.arcs);
        self.weight += other.weight;
        self
    }

    pub fn arcs<'g>(&self, graph: &'g PlanningGraph) -> impl Iterator<Item = &'g TransitArc> {
        self.arcs.iter().map(move |&e| graph.arc(e))
    }

    /// Sum of raw arc weights
    pub fn raw_weight(&self, graph: &PlanningGraph) -> f64 {
        self.arcs(graph).map(|arc| arc.weight).sum()
    }
}
