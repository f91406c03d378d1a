use std::sync::Arc;

use geo::{Coord, LineString};
use hashbrown::HashMap;
use log::{info, warn};
use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::model::{ArcKind, Edge, Node, PlanningGraph, Route, RouteEdge, TransitArc};
use crate::{EdgeId, NodeId, RecordError, RouteId};

/// Outcome of a graph build: what went in and what had to be skipped
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub nodes: usize,
    pub walk_arcs: usize,
    pub bus_arcs: usize,
    pub route_stops: usize,
    pub skipped_edges: usize,
    pub skipped_route_edges: usize,
    pub skipped_route_nodes: usize,
    pub skipped: Vec<RecordError>,
}

impl BuildReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub(crate) fn record_route_node_errors(&mut self, errors: Vec<RecordError>) {
        self.skipped_route_nodes += errors.len();
        self.skipped.extend(errors);
    }
}

/// Builds the planning multigraph.
///
/// Every node is inserted even when isolated. Each street edge yields a
/// forward and a backward walk arc weighted `distance * walk_penalty`; each
/// route edge yields one bus arc in the edge's stored orientation weighted
/// by raw distance. Records pointing at missing nodes or edges, or carrying
/// an unusable distance, are skipped and listed in the report.
pub fn build_planning_graph(
    nodes: &[Node],
    edges: &[Edge],
    route_edges: &[(RouteEdge, Route)],
    walk_penalty: f64,
) -> (PlanningGraph, BuildReport) {
    let mut graph =
        PlanningGraph::with_capacity(nodes.len(), edges.len() * 2 + route_edges.len());
    let mut report = BuildReport::default();

    for node in nodes {
        graph.add_node(node.clone());
    }
    report.nodes = graph.node_count();

    let edges_by_id: HashMap<EdgeId, &Edge> = edges.iter().map(|e| (e.id, e)).collect();

    for edge in edges {
        match walk_arcs(&graph, edge, walk_penalty) {
            Ok(((source, target), [forward, backward])) => {
                graph.add_arc(source, target, forward);
                graph.add_arc(target, source, backward);
                report.walk_arcs += 2;
            }
            Err(err) => {
                report.skipped_edges += 1;
                report.skipped.push(err);
            }
        }
    }

    let mut route_names: HashMap<RouteId, Arc<str>> = HashMap::new();
    for (route_edge, route) in route_edges {
        let name = route_names
            .entry(route.id)
            .or_insert_with(|| Arc::from(route.name.as_str()))
            .clone();
        match bus_arc(&graph, &edges_by_id, route_edge, name) {
            Ok(((source, target), arc)) => {
                graph.add_arc(source, target, arc);
                report.bus_arcs += 1;
            }
            Err(err) => {
                report.skipped_route_edges += 1;
                report.skipped.push(err);
            }
        }
    }

    if report.skipped_count() > 0 {
        warn!(
            "Skipped {} street edges and {} route edges while building the planning graph",
            report.skipped_edges, report.skipped_route_edges
        );
    }
    info!(
        "Planning graph built: {} nodes, {} walk arcs, {} bus arcs",
        report.nodes, report.walk_arcs, report.bus_arcs
    );

    (graph, report)
}

type Endpoints = (NodeIndex, NodeIndex);

fn endpoints(graph: &PlanningGraph, edge: &Edge) -> Result<Endpoints, RecordError> {
    let lookup = |node_id: NodeId| {
        graph.node_index(node_id).ok_or(RecordError::MissingNode {
            edge_id: edge.id,
            node_id,
        })
    };
    Ok((lookup(edge.source)?, lookup(edge.target)?))
}

fn checked_distance(edge: &Edge) -> Result<f64, RecordError> {
    if edge.distance.is_finite() && edge.distance >= 0.0 {
        Ok(edge.distance)
    } else {
        Err(RecordError::InvalidDistance {
            edge_id: edge.id,
            distance: edge.distance,
        })
    }
}

/// Geometry of an edge, or the straight segment between its nodes
fn edge_geometry(
    graph: &PlanningGraph,
    edge: &Edge,
    (source, target): Endpoints,
) -> LineString<f64> {
    if edge.geometry.0.len() >= 2 {
        edge.geometry.clone()
    } else {
        let a: Coord<f64> = graph.node(source).geometry.into();
        let b: Coord<f64> = graph.node(target).geometry.into();
        LineString::new(vec![a, b])
    }
}

fn walk_arcs(
    graph: &PlanningGraph,
    edge: &Edge,
    walk_penalty: f64,
) -> Result<(Endpoints, [TransitArc; 2]), RecordError> {
    let ends = endpoints(graph, edge)?;
    let distance = checked_distance(edge)?;
    let geometry = edge_geometry(graph, edge, ends);

    let mut reversed = geometry.clone();
    reversed.0.reverse();

    let arc = |geometry| TransitArc {
        edge_id: edge.id,
        weight: distance * walk_penalty,
        distance,
        kind: ArcKind::Walk,
        geometry,
    };
    Ok((ends, [arc(geometry), arc(reversed)]))
}

fn bus_arc(
    graph: &PlanningGraph,
    edges_by_id: &HashMap<EdgeId, &Edge>,
    route_edge: &RouteEdge,
    route_name: Arc<str>,
) -> Result<(Endpoints, TransitArc), RecordError> {
    let edge = edges_by_id
        .get(&route_edge.edge_id)
        .ok_or(RecordError::MissingEdge {
            route_id: route_edge.route_id,
            edge_id: route_edge.edge_id,
        })?;
    let ends = endpoints(graph, edge)?;
    let distance = checked_distance(edge)?;

    Ok((
        ends,
        TransitArc {
            edge_id: edge.id,
            weight: distance,
            distance,
            kind: ArcKind::Bus {
                route_id: route_edge.route_id,
                route_name,
                direction: route_edge.direction,
                order: route_edge.order,
            },
            geometry: edge_geometry(graph, edge, ends),
        },
    ))
}
