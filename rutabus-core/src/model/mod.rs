//! Data model for journey planning
//!
//! Contains the repository records and the planning graph derived from them.

pub mod graph;
pub mod network;
pub mod stops;

pub use graph::{ArcKind, PlanningGraph, TransitArc};
pub use network::{Direction, Edge, Node, Route, RouteEdge, RouteNode, RouteStop};
pub use stops::{RouteCatalog, RouteStopIndex};
