//! Yen's algorithm: the `k` cheapest simple paths by raw arc weight.
//!
//! Paths are told apart by their arc sequence, so two routes over the same
//! nodes (walking one block versus riding it) are distinct candidates.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::HashSet;
use log::{debug, warn};
use petgraph::{
    Direction as GraphDirection,
    graph::{EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use super::Path;
use super::dijkstra::{shortest_path, shortest_path_tree};
use crate::config::SearchBudget;
use crate::model::PlanningGraph;

struct Candidate(Path);

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by weight, then by arc sequence for a stable order
        other
            .0
            .weight
            .total_cmp(&self.0.weight)
            .then_with(|| other.0.arcs.cmp(&self.0.arcs))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Up to `k` distinct simple paths from `source` to `target`, cheapest
/// first.
///
/// If the budget runs out the paths found so far are returned.
pub fn k_shortest_paths(
    graph: &PlanningGraph,
    source: NodeIndex,
    target: NodeIndex,
    k: usize,
    budget: &mut SearchBudget,
) -> Vec<Path> {
    if k == 0 {
        return Vec::new();
    }
    if source == target {
        return vec![Path::trivial(source)];
    }

    let first = match shortest_path(graph, source, target, budget) {
        Ok(Some(path)) => path,
        Ok(None) => return Vec::new(),
        Err(_) => {
            warn!("Search budget exhausted before the first path was found");
            return Vec::new();
        }
    };

    let mut seen: HashSet<Vec<EdgeIndex>> = HashSet::new();
    seen.insert(first.arcs.clone());
    let mut accepted = vec![first];
    let mut candidates = BinaryHeap::new();

    'rounds: while accepted.len() < k {
        let previous = accepted[accepted.len() - 1].clone();

        for i in 0..previous.arcs.len() {
            let spur = previous.nodes[i];
            let root_arcs = &previous.arcs[..i];

            // Arcs leaving the spur node on any accepted path sharing this root
            let banned_arcs: HashSet<EdgeIndex> = accepted
                .iter()
                .filter(|p| p.arcs.len() > i && p.arcs[..i] == *root_arcs)
                .map(|p| p.arcs[i])
                .collect();
            let banned_nodes: HashSet<NodeIndex> = previous.nodes[..i].iter().copied().collect();

            let tree = match shortest_path_tree(
                graph,
                spur,
                Some(target),
                GraphDirection::Outgoing,
                None,
                |e| !banned_arcs.contains(&e.id()) && !banned_nodes.contains(&e.target()),
                |arc| arc.weight,
                budget,
            ) {
                Ok(tree) => tree,
                Err(_) => {
                    warn!(
                        "Search budget exhausted after {} of {k} candidate paths",
                        accepted.len()
                    );
                    break 'rounds;
                }
            };

            if let Some(spur_path) = tree.path_to(graph, target) {
                let root = Path {
                    nodes: previous.nodes[..=i].to_vec(),
                    arcs: root_arcs.to_vec(),
                    weight: root_arcs.iter().map(|&e| graph.arc(e).weight).sum(),
                };
                let total = root.concat(&spur_path);
                if seen.insert(total.arcs.clone()) {
                    candidates.push(Candidate(total));
                }
            }
        }

        match candidates.pop() {
            Some(Candidate(path)) => accepted.push(path),
            None => break,
        }
    }

    debug!("Generated {} candidate paths (requested {k})", accepted.len());
    accepted
}
