use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::{EdgeId, NodeId, RouteId};

/// Which end of a planning request an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Origin,
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Origin => f.write_str("origin"),
            Endpoint::Destination => f.write_str("destination"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No nearby node found for {endpoint}")]
    NoNearbyNode { endpoint: Endpoint },
    #[error("No path found")]
    NoPathFound,
    #[error("Repository error: {0}")]
    Repository(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("Unrecoverable error: {0}")]
    UnrecoverableError(&'static str),
}

/// A single malformed record skipped while building the planning graph
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordError {
    #[error("edge {edge_id} references missing node {node_id}")]
    MissingNode { edge_id: EdgeId, node_id: NodeId },
    #[error("route {route_id} references missing edge {edge_id}")]
    MissingEdge { route_id: RouteId, edge_id: EdgeId },
    #[error("route {route_id} stop references missing node {node_id}")]
    MissingStopNode { route_id: RouteId, node_id: NodeId },
    #[error("edge {edge_id} has invalid distance {distance}")]
    InvalidDistance { edge_id: EdgeId, distance: f64 },
    #[error("route {route_id} repeats stop order {order} in one direction")]
    DuplicateStopOrder { route_id: RouteId, order: u32 },
    #[error("malformed row {line} in {file}: {reason}")]
    MalformedRow {
        file: &'static str,
        line: u64,
        reason: String,
    },
}
