//! Loading a network export from a directory of CSV files
//!
//! | file              | columns                                                     |
//! |-------------------|-------------------------------------------------------------|
//! | `nodes.csv`       | `id, external_id, lat, lon`                                 |
//! | `edges.csv`       | `id, source, target, distance, geometry` (WKT LINESTRING)   |
//! | `routes.csv`      | `id, name, company, forward_description, return_description`|
//! | `route_edges.csv` | `route_id, edge_id, direction, order`                       |
//! | `route_nodes.csv` | `route_id, node_id, direction, order`                       |
//!
//! Direction is `I`/`V` or `outbound`/`return`. The route files are optional.
//!
//! [`load_csv_repository`] reads a snapshot of the files once;
//! [`CsvRepository`] reads them again before every graph build.

mod parser;
mod raw_types;
mod repository;

pub use parser::{Numbered, deserialize_csv_file, deserialize_optional_csv_file};
pub use raw_types::{CsvEdge, CsvNode, CsvRoute, CsvRouteEdge, CsvRouteNode};
pub use repository::CsvRepository;

use std::path::Path;

use geo::{Distance, Haversine, LineString, Point};
use hashbrown::HashMap;
use itertools::Itertools;
use log::info;
use wkt::TryFromWkt;

use crate::model::{Edge, Node, Route, RouteEdge, RouteNode};
use crate::repository::InMemoryRepository;
use crate::{Error, Meters, NodeId, RecordError};

/// Reads a CSV export into an in-memory repository.
///
/// Returns the repository together with the rows that had to be skipped.
///
/// # Errors
///
/// Fails if the directory, `nodes.csv` or `edges.csv` cannot be read.
pub fn load_csv_repository(dir: &Path) -> Result<(InMemoryRepository, Vec<RecordError>), Error> {
    if !dir.is_dir() {
        return Err(Error::InvalidData(format!(
            "Network directory not found: {}",
            dir.display()
        )));
    }
    info!("Loading network export from {}", dir.display());

    let mut skipped = Vec::new();
    let raw_nodes: Vec<Numbered<CsvNode>> =
        deserialize_csv_file(&dir.join("nodes.csv"), "nodes.csv", &mut skipped)?;
    let raw_edges: Vec<Numbered<CsvEdge>> =
        deserialize_csv_file(&dir.join("edges.csv"), "edges.csv", &mut skipped)?;
    let raw_routes: Vec<Numbered<CsvRoute>> =
        deserialize_optional_csv_file(&dir.join("routes.csv"), "routes.csv", &mut skipped)?;
    let raw_route_edges: Vec<Numbered<CsvRouteEdge>> = deserialize_optional_csv_file(
        &dir.join("route_edges.csv"),
        "route_edges.csv",
        &mut skipped,
    )?;
    let raw_route_nodes: Vec<Numbered<CsvRouteNode>> = deserialize_optional_csv_file(
        &dir.join("route_nodes.csv"),
        "route_nodes.csv",
        &mut skipped,
    )?;

    let nodes: Vec<Node> = raw_nodes
        .into_iter()
        .map(|Numbered { row: n, .. }| {
            let external_id = n.external_id.unwrap_or_else(|| n.id.to_string());
            Node::new(n.id, external_id, n.lat, n.lon)
        })
        .collect();

    let positions: HashMap<NodeId, Point<f64>> =
        nodes.iter().map(|n| (n.id, n.geometry)).collect();
    let (edges, bad_edges): (Vec<Edge>, Vec<RecordError>) = raw_edges
        .into_iter()
        .map(|raw| convert_edge(raw, &positions))
        .partition_result();
    skipped.extend(bad_edges);

    let routes = raw_routes
        .into_iter()
        .map(|Numbered { row: r, .. }| Route {
            id: r.id,
            name: r.name,
            company: r.company,
            forward_description: r.forward_description,
            return_description: r.return_description,
        })
        .collect();

    let route_edges = raw_route_edges
        .into_iter()
        .map(|Numbered { row: re, .. }| RouteEdge {
            route_id: re.route_id,
            edge_id: re.edge_id,
            direction: re.direction,
            order: re.order,
        })
        .collect();

    let route_nodes = raw_route_nodes
        .into_iter()
        .map(|Numbered { row: rn, .. }| RouteNode {
            route_id: rn.route_id,
            node_id: rn.node_id,
            direction: rn.direction,
            order: rn.order,
        })
        .collect();

    info!(
        "Loaded {} nodes and {} edges ({} rows skipped)",
        nodes.len(),
        edges.len(),
        skipped.len()
    );

    Ok((
        InMemoryRepository::from_parts(nodes, edges, routes, route_edges, route_nodes),
        skipped,
    ))
}

fn convert_edge(
    Numbered { line, row: raw }: Numbered<CsvEdge>,
    positions: &HashMap<NodeId, Point<f64>>,
) -> Result<Edge, RecordError> {
    let malformed = |reason: String| RecordError::MalformedRow {
        file: "edges.csv",
        line,
        reason: format!("edge {}: {reason}", raw.id),
    };

    let geometry = match raw.geometry.as_deref().map(str::trim) {
        Some(wkt) if !wkt.is_empty() => {
            LineString::<f64>::try_from_wkt_str(wkt).map_err(|e| malformed(e.to_string()))?
        }
        _ => match (positions.get(&raw.source), positions.get(&raw.target)) {
            (Some(a), Some(b)) => LineString::new(vec![a.0, b.0]),
            _ => LineString::new(vec![]),
        },
    };

    let distance = match raw.distance {
        Some(distance) => distance,
        None if geometry.0.len() >= 2 => geodesic_length(&geometry),
        None => return Err(malformed("no distance and no geometry".into())),
    };

    Ok(Edge {
        id: raw.id,
        source: raw.source,
        target: raw.target,
        distance,
        geometry,
    })
}

/// Ground length of a line string in meters
pub(crate) fn geodesic_length(line: &LineString<f64>) -> Meters {
    line.lines()
        .map(|segment| {
            Haversine.distance(Point::from(segment.start), Point::from(segment.end))
        })
        .sum()
}
