//! Single-source shortest paths over the planning graph.
//!
//! All arc weights are non-negative, so a binary-heap Dijkstra is enough.
//! Callers restrict the search with an arc filter (bus-only sub-graphs,
//! Yen's banned arcs and nodes) and choose the weighting (penalized weight
//! for graph traversal, raw meters for itinerary legs).

mod state;

use std::collections::BinaryHeap;

use hashbrown::HashMap;
use petgraph::{
    Direction as GraphDirection,
    graph::{EdgeIndex, EdgeReference, NodeIndex},
    visit::EdgeRef,
};

use self::state::State;
use super::Path;
use crate::config::{SearchBudget, SearchExhausted};
use crate::model::{PlanningGraph, TransitArc};

/// Best known cost and incoming arc for every settled or reached node
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    start: NodeIndex,
    direction: GraphDirection,
    entries: HashMap<NodeIndex, (f64, Option<EdgeIndex>)>,
}

impl ShortestPathTree {
    pub fn cost(&self, node: NodeIndex) -> Option<f64> {
        self.entries.get(&node).map(|&(cost, _)| cost)
    }

    /// Reached nodes with their costs
    pub fn reached(&self) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        self.entries.iter().map(|(&node, &(cost, _))| (node, cost))
    }

    /// Path between the start and `node`.
    ///
    /// For a forward search the path runs start → node, for a backward
    /// search it runs node → start.
    pub fn path_to(&self, graph: &PlanningGraph, node: NodeIndex) -> Option<Path> {
        let &(weight, _) = self.entries.get(&node)?;
        let mut nodes = vec![node];
        let mut arcs = Vec::new();
        let mut current = node;

        while current != self.start {
            let (_, via) = self.entries.get(&current)?;
            let arc = (*via)?;
            let (source, target) = graph.arc_endpoints(arc)?;
            current = match self.direction {
                GraphDirection::Outgoing => source,
                GraphDirection::Incoming => target,
            };
            arcs.push(arc);
            nodes.push(current);
        }

        if self.direction == GraphDirection::Outgoing {
            nodes.reverse();
            arcs.reverse();
        }
        Some(Path {
            nodes,
            arcs,
            weight,
        })
    }
}

/// Runs Dijkstra from `start`.
///
/// `direction` selects outgoing arcs (paths leaving `start`) or incoming
/// arcs (paths arriving at `start`). The search stops early once `target`
/// is settled or costs exceed `max_cost`. Arcs rejected by `admit` are
/// invisible, and `weight` maps an arc to its traversal cost.
#[allow(clippy::too_many_arguments)]
pub fn shortest_path_tree<A, W>(
    graph: &PlanningGraph,
    start: NodeIndex,
    target: Option<NodeIndex>,
    direction: GraphDirection,
    max_cost: Option<f64>,
    admit: A,
    weight: W,
    budget: &mut SearchBudget,
) -> Result<ShortestPathTree, SearchExhausted>
where
    A: Fn(EdgeReference<'_, TransitArc>) -> bool,
    W: Fn(&TransitArc) -> f64,
{
    let mut entries: HashMap<NodeIndex, (f64, Option<EdgeIndex>)> = HashMap::new();
    let mut heap = BinaryHeap::new();

    // Start node has distance 0
    heap.push(State {
        cost: 0.0,
        node: start,
    });
    entries.insert(start, (0.0, None));

    while let Some(State { cost, node }) = heap.pop() {
        budget.tick()?;

        // Skip if we've found a better path
        if let Some(&(best, _)) = entries.get(&node)
            && cost > best
        {
            continue;
        }

        // Check if we've reached the target
        if target == Some(node) {
            break;
        }

        if max_cost.is_some_and(|max| cost > max) {
            break;
        }

        for edge in graph.edges_directed(node, direction) {
            if !admit(edge) {
                continue;
            }
            let next = match direction {
                GraphDirection::Outgoing => edge.target(),
                GraphDirection::Incoming => edge.source(),
            };
            let next_cost = cost + weight(edge.weight());
            if max_cost.is_some_and(|max| next_cost > max) {
                continue;
            }

            match entries.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert((next_cost, Some(edge.id())));
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < entry.get().0 {
                        *entry.get_mut() = (next_cost, Some(edge.id()));
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    Ok(ShortestPathTree {
        start,
        direction,
        entries,
    })
}

/// Shortest path between two nodes under penalized arc weights
pub fn shortest_path(
    graph: &PlanningGraph,
    source: NodeIndex,
    target: NodeIndex,
    budget: &mut SearchBudget,
) -> Result<Option<Path>, SearchExhausted> {
    let tree = shortest_path_tree(
        graph,
        source,
        Some(target),
        GraphDirection::Outgoing,
        None,
        |_| true,
        |arc| arc.weight,
        budget,
    )?;
    Ok(tree.path_to(graph, target))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::SearchLimits;
    use crate::loading::build_planning_graph;
    use crate::model::{Direction, Edge, Node, Route, RouteEdge};

    fn line_graph() -> PlanningGraph {
        // 1 - 2 - 3 on foot, plus a bus 1 -> 3 that is longer than walking
        let nodes = vec![
            Node::new(1, "1", 0.0, 0.0),
            Node::new(2, "2", 0.0, 0.001),
            Node::new(3, "3", 0.0, 0.002),
        ];
        let edge = |id, source, target, distance| Edge {
            id,
            source,
            target,
            distance,
            geometry: geo::LineString::new(vec![]),
        };
        let edges = vec![edge(10, 1, 2, 100.0), edge(11, 2, 3, 100.0), edge(12, 1, 3, 350.0)];
        let bus = vec![(
            RouteEdge {
                route_id: 1,
                edge_id: 12,
                direction: Direction::Outbound,
                order: 0,
            },
            Route::new(1, "Express"),
        )];
        build_planning_graph(&nodes, &edges, &bus, 1.5).0
    }

    fn budget() -> SearchBudget {
        SearchLimits::unbounded().budget()
    }

    #[test]
    fn single_edge_path_equals_walk_weight_both_ways() {
        let graph = line_graph();
        let a = graph.node_index(1).unwrap();
        let b = graph.node_index(2).unwrap();

        let forward = shortest_path(&graph, a, b, &mut budget()).unwrap().unwrap();
        let backward = shortest_path(&graph, b, a, &mut budget()).unwrap().unwrap();
        assert_relative_eq!(forward.weight, 150.0);
        assert_relative_eq!(backward.weight, 150.0);
        assert_eq!(forward.len(), 1);
    }

    #[test]
    fn picks_lower_weight_between_walk_and_bus() {
        let graph = line_graph();
        let a = graph.node_index(1).unwrap();
        let c = graph.node_index(3).unwrap();
        // walking 200 m costs 300; the bus costs 350 raw, walking 350 m costs 525
        let path = shortest_path(&graph, a, c, &mut budget()).unwrap().unwrap();
        assert_relative_eq!(path.weight, 300.0);
        assert_eq!(path.nodes.len(), 3);
    }

    #[test]
    fn bus_arcs_are_not_reversed() {
        let graph = line_graph();
        let a = graph.node_index(1).unwrap();
        let c = graph.node_index(3).unwrap();
        let bus_only = |e: EdgeReference<'_, TransitArc>| !e.weight().kind.is_walk();

        let forward = shortest_path_tree(
            &graph,
            a,
            Some(c),
            GraphDirection::Outgoing,
            None,
            bus_only,
            |arc| arc.distance,
            &mut budget(),
        )
        .unwrap();
        assert_relative_eq!(forward.cost(c).unwrap(), 350.0);

        let backward = shortest_path_tree(
            &graph,
            c,
            Some(a),
            GraphDirection::Outgoing,
            None,
            bus_only,
            |arc| arc.distance,
            &mut budget(),
        )
        .unwrap();
        assert!(backward.cost(a).is_none());
    }

    #[test]
    fn backward_search_yields_paths_into_start() {
        let graph = line_graph();
        let a = graph.node_index(1).unwrap();
        let c = graph.node_index(3).unwrap();

        let tree = shortest_path_tree(
            &graph,
            c,
            None,
            GraphDirection::Incoming,
            Some(250.0),
            |_| true,
            |arc| arc.distance,
            &mut budget(),
        )
        .unwrap();
        let path = tree.path_to(&graph, a).unwrap();
        assert_eq!(path.source(), a);
        assert_eq!(path.target(), c);
        assert_relative_eq!(path.weight, 200.0);
    }

    #[test]
    fn max_cost_bounds_reach() {
        let graph = line_graph();
        let a = graph.node_index(1).unwrap();
        let tree = shortest_path_tree(
            &graph,
            a,
            None,
            GraphDirection::Outgoing,
            Some(120.0),
            |e| e.weight().kind.is_walk(),
            |arc| arc.distance,
            &mut budget(),
        )
        .unwrap();
        assert_eq!(tree.reached().count(), 2);
    }

    #[test]
    fn exhausted_budget_is_reported() {
        let graph = line_graph();
        let a = graph.node_index(1).unwrap();
        let c = graph.node_index(3).unwrap();
        let mut tiny = SearchLimits {
            max_steps: 1,
            timeout: None,
        }
        .budget();
        assert_eq!(shortest_path(&graph, a, c, &mut tiny), Err(SearchExhausted));
    }
}
