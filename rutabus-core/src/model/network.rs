//! Repository records: street nodes and edges, routes and their ordered
//! edge and stop sequences.

use std::fmt;

use geo::{LineString, Point};
use serde::{Deserialize, Serialize};

use crate::{EdgeId, Meters, NodeId, RouteId};

/// Travel direction of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "outbound", alias = "I", alias = "i")]
    Outbound,
    #[serde(rename = "return", alias = "V", alias = "v")]
    Return,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Outbound => "outbound",
            Direction::Return => "return",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Street network node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Internal identifier assigned by the repository
    pub id: NodeId,
    /// Stable identifier from the source map data
    pub external_id: String,
    /// Node coordinates (x = longitude, y = latitude)
    pub geometry: Point<f64>,
}

impl Node {
    pub fn new(id: NodeId, external_id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id,
            external_id: external_id.into(),
            geometry: Point::new(lon, lat),
        }
    }

    pub fn lat(&self) -> f64 {
        self.geometry.y()
    }

    pub fn lon(&self) -> f64 {
        self.geometry.x()
    }
}

/// Undirected street segment
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Length in meters
    pub distance: Meters,
    /// Drawn from `source` to `target`
    pub geometry: LineString<f64>,
}

/// Service line run by an operator
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub company: Option<String>,
    pub forward_description: Option<String>,
    pub return_description: Option<String>,
}

impl Route {
    pub fn new(id: RouteId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Published description of the given direction, if any
    pub fn description(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::Outbound => self.forward_description.as_deref(),
            Direction::Return => self.return_description.as_deref(),
        }
        .filter(|d| !d.trim().is_empty())
    }
}

/// Edge ridden by a route in one direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteEdge {
    pub route_id: RouteId,
    pub edge_id: EdgeId,
    pub direction: Direction,
    /// Position within the direction's edge sequence
    pub order: u32,
}

/// Stop served by a route in one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteNode {
    pub route_id: RouteId,
    pub node_id: NodeId,
    pub direction: Direction,
    /// Position within the direction's stop sequence
    pub order: u32,
}

impl RouteNode {
    pub fn stop(&self) -> RouteStop {
        RouteStop {
            route_id: self.route_id,
            direction: self.direction,
            order: self.order,
        }
    }
}

/// A route passing through a given node, as seen from that node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteStop {
    pub route_id: RouteId,
    pub direction: Direction,
    pub order: u32,
}

impl RouteStop {
    /// A rider boarding here can alight at `other`
    pub fn precedes(&self, other: &RouteStop) -> bool {
        self.route_id == other.route_id
            && self.direction == other.direction
            && self.order < other.order
    }
}
