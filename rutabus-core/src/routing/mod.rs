pub mod cost;
pub mod dijkstra;
pub mod direct;
pub mod itinerary;
pub mod multimodal;
mod path;
pub mod planner;
pub mod transfer_search;
pub mod yen;

pub use cost::CostModel;
pub use direct::{DirectItinerary, DirectRouteFinder};
pub use itinerary::{Coordinate, JourneyPlan, Segment, Step, StepKind, Summary};
pub use multimodal::{ScoredPath, find_best};
pub use path::Path;
pub use transfer_search::{RouteNetwork, RouteVisit, TransferRoute};
pub use yen::k_shortest_paths;
