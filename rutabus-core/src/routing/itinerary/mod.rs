//! Turning a graph path into readable itinerary segments

mod journey;
mod to_geojson;

pub use journey::{Coordinate, JourneyPlan, Step, StepKind, Summary};

use geo::{Coord, LineString};
use petgraph::graph::{EdgeIndex, NodeIndex};

use super::Path;
use crate::Meters;
use crate::model::{ArcKind, PlanningGraph};

/// Consecutive arcs sharing mode, route and direction
#[derive(Debug, Clone)]
pub struct Segment {
    /// Kind of the segment's first arc
    pub kind: ArcKind,
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub arcs: Vec<EdgeIndex>,
    /// Ground meters; walking is not penalized here
    pub distance: Meters,
    pub instructions: String,
}

/// Splits a path into segments.
///
/// A new segment starts whenever the mode, the bus route or its direction
/// changes, so the number of segments is one more than the number of
/// such boundaries. An empty path has no segments.
pub fn describe(graph: &PlanningGraph, path: &Path) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();

    for (i, &arc_idx) in path.arcs.iter().enumerate() {
        let arc = graph.arc(arc_idx);
        let to = path.nodes[i + 1];

        match segments.last_mut() {
            Some(segment) if segment.kind.same_run(&arc.kind) => {
                segment.to = to;
                segment.arcs.push(arc_idx);
                segment.distance += arc.distance;
            }
            _ => segments.push(Segment {
                kind: arc.kind.clone(),
                from: path.nodes[i],
                to,
                arcs: vec![arc_idx],
                distance: arc.distance,
                instructions: String::new(),
            }),
        }
    }

    for segment in &mut segments {
        segment.instructions = instructions(graph, segment);
    }
    segments
}

/// Boundaries between segments where the mode or the bus route changes
pub fn transfer_count(segments: &[Segment]) -> usize {
    segments
        .windows(2)
        .filter(|pair| !pair[0].kind.same_service(&pair[1].kind))
        .count()
}

fn instructions(graph: &PlanningGraph, segment: &Segment) -> String {
    let from = &graph.node(segment.from).external_id;
    let to = &graph.node(segment.to).external_id;
    match &segment.kind {
        ArcKind::Walk => format!(
            "Walk {:.0} m from node {from} to node {to}",
            segment.distance
        ),
        ArcKind::Bus {
            route_name,
            direction,
            ..
        } => format!("Take {route_name} ({direction}) from node {from} to node {to}"),
    }
}

/// Arc geometries joined end to end
pub fn geometry(graph: &PlanningGraph, arcs: &[EdgeIndex]) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = Vec::new();
    for &arc in arcs {
        for &coord in &graph.arc(arc).geometry.0 {
            if coords.last() != Some(&coord) {
                coords.push(coord);
            }
        }
    }
    LineString::new(coords)
}

/// Path drawn as coordinates; a path that does not move is its single node
pub fn polyline(graph: &PlanningGraph, path: &Path) -> Vec<Coordinate> {
    if path.is_empty() {
        return vec![graph.node(path.source()).geometry.into()];
    }
    geometry(graph, &path.arcs)
        .points()
        .map(Coordinate::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::loading::build_planning_graph;
    use crate::model::{Direction, Edge, Node, Route, RouteEdge};
    use crate::routing::cost::CostModel;
    use crate::{NodeId, RouteId};

    fn edge(id: i64, source: NodeId, target: NodeId, distance: f64) -> Edge {
        Edge {
            id,
            source,
            target,
            distance,
            geometry: LineString::new(vec![]),
        }
    }

    fn ride(
        route_id: RouteId,
        edge_id: i64,
        direction: Direction,
        order: u32,
    ) -> (RouteEdge, Route) {
        (
            RouteEdge {
                route_id,
                edge_id,
                direction,
                order,
            },
            Route::new(route_id, format!("Line {route_id}")),
        )
    }

    fn graph() -> PlanningGraph {
        let nodes: Vec<Node> = (1..=6)
            .map(|i| Node::new(i, format!("n{i}"), 0.0, i as f64 * 0.001))
            .collect();
        let edges = vec![
            edge(1, 1, 2, 100.0),
            edge(2, 2, 3, 100.0),
            edge(3, 3, 4, 100.0),
            edge(4, 4, 5, 100.0),
            edge(5, 5, 6, 100.0),
        ];
        let rides = vec![
            ride(1, 2, Direction::Outbound, 0),
            ride(1, 3, Direction::Outbound, 1),
            ride(1, 4, Direction::Return, 0),
            ride(2, 5, Direction::Outbound, 0),
        ];
        build_planning_graph(&nodes, &edges, &rides, 1.5).0
    }

    /// Picks the arc between two nodes matching a predicate
    fn arc(
        graph: &PlanningGraph,
        from: NodeId,
        to: NodeId,
        bus: Option<(RouteId, Direction)>,
    ) -> EdgeIndex {
        use petgraph::visit::EdgeRef;
        let source = graph.node_index(from).unwrap();
        let target = graph.node_index(to).unwrap();
        graph
            .edges(source)
            .find(|e| {
                e.target() == target
                    && match (&e.weight().kind, bus) {
                        (ArcKind::Walk, None) => true,
                        (
                            ArcKind::Bus {
                                route_id,
                                direction,
                                ..
                            },
                            Some((r, d)),
                        ) => *route_id == r && *direction == d,
                        _ => false,
                    }
            })
            .unwrap()
            .id()
    }

    fn path(graph: &PlanningGraph, nodes: &[NodeId], arcs: Vec<EdgeIndex>) -> Path {
        let path = Path {
            nodes: nodes.iter().map(|&id| graph.node_index(id).unwrap()).collect(),
            arcs,
            weight: 0.0,
        };
        Path {
            weight: path.raw_weight(graph),
            ..path
        }
    }

    #[test]
    fn groups_runs_and_counts_boundaries() {
        let graph = graph();
        let arcs = vec![
            arc(&graph, 1, 2, None),
            arc(&graph, 2, 3, Some((1, Direction::Outbound))),
            arc(&graph, 3, 4, Some((1, Direction::Outbound))),
            arc(&graph, 4, 5, Some((1, Direction::Return))),
            arc(&graph, 5, 6, Some((2, Direction::Outbound))),
        ];
        let p = path(&graph, &[1, 2, 3, 4, 5, 6], arcs);

        let segments = describe(&graph, &p);
        assert_eq!(segments.len(), 4);
        assert_relative_eq!(segments[0].distance, 100.0);
        assert_relative_eq!(segments[1].distance, 200.0);
        assert_eq!(segments[1].arcs.len(), 2);
        // direction change on route 1 splits the segment but is not a transfer
        assert_eq!(transfer_count(&segments), 2);
        assert_eq!(
            transfer_count(&segments),
            CostModel::transfers(p.arcs(&graph))
        );
    }

    #[test]
    fn instructions_name_route_and_nodes() {
        let graph = graph();
        let arcs = vec![
            arc(&graph, 1, 2, None),
            arc(&graph, 2, 3, Some((1, Direction::Outbound))),
        ];
        let segments = describe(&graph, &path(&graph, &[1, 2, 3], arcs));
        assert_eq!(segments[0].instructions, "Walk 100 m from node n1 to node n2");
        assert_eq!(
            segments[1].instructions,
            "Take Line 1 (outbound) from node n2 to node n3"
        );
    }

    #[test]
    fn walk_distance_is_shown_without_penalty() {
        let graph = graph();
        let arcs = vec![arc(&graph, 2, 1, None)];
        let p = path(&graph, &[2, 1], arcs);
        assert_relative_eq!(p.weight, 150.0);
        assert_relative_eq!(describe(&graph, &p)[0].distance, 100.0);
    }

    #[test]
    fn polyline_joins_geometries_without_repeats() {
        let graph = graph();
        let arcs = vec![arc(&graph, 1, 2, None), arc(&graph, 2, 3, None)];
        let line = polyline(&graph, &path(&graph, &[1, 2, 3], arcs));
        assert_eq!(line.len(), 3);
        assert_relative_eq!(line[2].lng, 0.003);

        let still = polyline(&graph, &Path::trivial(graph.node_index(4).unwrap()));
        assert_eq!(still.len(), 1);
    }
}
