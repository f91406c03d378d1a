pub use crate::{DEFAULT_SEARCH_RADIUS, TRANSFER_PENALTY, WALK_PENALTY};

// Re-export key components
pub use crate::loading::{BuildReport, CsvRepository, build_planning_graph, load_csv_repository};
pub use crate::model::{
    ArcKind, Direction, Edge, Node, PlanningGraph, Route, RouteEdge, RouteNode,
};
pub use crate::repository::{InMemoryRepository, Repository};
pub use crate::routing::planner::{JourneyPlanner, PlanRequest};
pub use crate::routing::{Coordinate, JourneyPlan, Step, Summary, TransferRoute};
pub use crate::service::{GraphService, NetworkSnapshot};
pub use crate::{Error, PlannerConfig};

// Identifier and distance types
pub use crate::EdgeId;
pub use crate::Meters;
pub use crate::NodeId;
pub use crate::RouteId;
