//! Journey planning over a city network that combines pedestrian street
//! segments and scheduled bus routes in a single weighted graph.
//!
//! The crate is organised the same way a planning request flows:
//!
//! - [`repository`] yields the raw nodes, edges and route sequences;
//! - [`loading`] turns them into a [`PlanningGraph`] (and reads CSV exports);
//! - [`service`] caches the built network as a generation-counted snapshot;
//! - [`spatial`] snaps coordinates to graph nodes;
//! - [`routing`] holds the cost model, the searches and the itinerary composer.

mod config;
pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod repository;
pub mod routing;
pub mod service;
pub mod spatial;

pub use config::{PlannerConfig, SearchBudget, SearchExhausted, SearchLimits};
pub use error::{Endpoint, Error, RecordError};
pub use loading::{BuildReport, CsvRepository, build_planning_graph, load_csv_repository};
pub use model::{ArcKind, Direction, PlanningGraph, RouteStopIndex, TransitArc};
pub use repository::{InMemoryRepository, Repository};
pub use routing::planner::{JourneyPlanner, PlanRequest};
pub use service::{GraphService, NetworkSnapshot};
pub use spatial::SpatialIndex;

/// Repository identifier of a node
pub type NodeId = i64;
/// Repository identifier of a street edge
pub type EdgeId = i64;
/// Repository identifier of a bus route
pub type RouteId = i64;
/// Ground distance in meters
pub type Meters = f64;

/// Multiplier applied to walking distance when weighting walk arcs
pub const WALK_PENALTY: f64 = 1.5;
/// Fixed cost added at every change of mode or bus route (meters-equivalent)
pub const TRANSFER_PENALTY: f64 = 500.0;
/// Default snapping radius for origin and destination coordinates
pub const DEFAULT_SEARCH_RADIUS: Meters = 400.0;
