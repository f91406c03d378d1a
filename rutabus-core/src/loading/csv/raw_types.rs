use serde::Deserialize;

use crate::model::Direction;
use crate::{EdgeId, NodeId, RouteId};

#[derive(Debug, Deserialize)]
pub struct CsvNode {
    pub id: NodeId,
    #[serde(default)]
    pub external_id: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct CsvEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Recomputed from the geometry when absent
    #[serde(default)]
    pub distance: Option<f64>,
    /// WKT `LINESTRING`
    #[serde(default)]
    pub geometry: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CsvRoute {
    pub id: RouteId,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub forward_description: Option<String>,
    #[serde(default)]
    pub return_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CsvRouteEdge {
    pub route_id: RouteId,
    pub edge_id: EdgeId,
    pub direction: Direction,
    pub order: u32,
}

#[derive(Debug, Deserialize)]
pub struct CsvRouteNode {
    pub route_id: RouteId,
    pub node_id: NodeId,
    pub direction: Direction,
    pub order: u32,
}
