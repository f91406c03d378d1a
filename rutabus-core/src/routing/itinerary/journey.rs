use geo::{LineString, Point};
use serde::{Deserialize, Serialize};

use super::{Segment, describe, geometry, polyline, transfer_count};
use crate::model::{ArcKind, Direction, PlanningGraph, RouteCatalog};
use crate::routing::Path;
use crate::{Meters, NodeId, RouteId};

/// WGS84 position as exchanged with clients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(point: Point<f64>) -> Self {
        Self {
            lat: point.y(),
            lng: point.x(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Walk,
    Bus,
}

/// One itinerary segment as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<RouteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Published description of the direction ridden
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub from: NodeId,
    pub to: NodeId,
    pub distance: Meters,
    pub instructions: String,
    #[serde(skip)]
    pub geometry: LineString<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_walk_m: Meters,
    pub total_bus_m: Meters,
    pub total_transfers: usize,
}

/// Planned journey between two resolved nodes
#[derive(Debug, Clone, Serialize)]
pub struct JourneyPlan {
    pub direct_route: bool,
    pub start_node: NodeId,
    pub end_node: NodeId,
    pub polyline: Vec<Coordinate>,
    pub steps: Vec<Step>,
    pub summary: Summary,
    /// Cost-model score of the chosen path
    pub cost: f64,
}

impl JourneyPlan {
    pub fn compose(
        graph: &PlanningGraph,
        routes: &RouteCatalog,
        path: &Path,
        direct_route: bool,
        cost: f64,
    ) -> Self {
        let segments = describe(graph, path);
        let mut summary = Summary {
            total_transfers: transfer_count(&segments),
            ..Summary::default()
        };

        let steps: Vec<Step> = segments
            .iter()
            .map(|segment| {
                match segment.kind {
                    ArcKind::Walk => summary.total_walk_m += segment.distance,
                    ArcKind::Bus { .. } => summary.total_bus_m += segment.distance,
                }
                step(graph, routes, segment)
            })
            .collect();

        Self {
            direct_route,
            start_node: graph.node(path.source()).id,
            end_node: graph.node(path.target()).id,
            polyline: polyline(graph, path),
            steps,
            summary,
            cost,
        }
    }

    pub fn is_stationary(&self) -> bool {
        self.steps.is_empty()
    }
}

fn step(graph: &PlanningGraph, routes: &RouteCatalog, segment: &Segment) -> Step {
    let mut step = Step {
        kind: StepKind::Walk,
        route_id: None,
        route_name: None,
        direction: None,
        description: None,
        from: graph.node(segment.from).id,
        to: graph.node(segment.to).id,
        distance: segment.distance,
        instructions: segment.instructions.clone(),
        geometry: geometry(graph, &segment.arcs),
    };

    if let ArcKind::Bus {
        route_id,
        route_name,
        direction,
        ..
    } = &segment.kind
    {
        step.kind = StepKind::Bus;
        step.route_id = Some(*route_id);
        step.route_name = Some(route_name.to_string());
        step.direction = Some(*direction);
        step.description = routes
            .get(*route_id)
            .and_then(|route| route.description(*direction))
            .map(str::to_owned);
    }
    step
}
